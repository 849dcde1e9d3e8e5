use bytes::Bytes;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum number of evidence photos attached to one notice.
pub const MAX_PHOTOS: usize = 5;

/// Image encoding declared at upload time. Only PNG and JPEG are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoFormat {
    Png,
    Jpeg,
    Other(String),
}

impl PhotoFormat {
    /// Classifies a MIME type by substring, e.g. `image/png`, `image/jpg`, `image/jpeg`.
    pub fn from_mime(mime: &str) -> Self {
        let lower = mime.to_ascii_lowercase();
        if lower.contains("png") {
            PhotoFormat::Png
        } else if lower.contains("jpg") || lower.contains("jpeg") {
            PhotoFormat::Jpeg
        } else {
            PhotoFormat::Other(mime.to_string())
        }
    }

    /// Uses the declared content type when present, otherwise the file extension.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Self {
        match (content_type, file_name) {
            (Some(mime), _) if !mime.is_empty() && mime != "application/octet-stream" => {
                Self::from_mime(mime)
            }
            (_, Some(name)) => {
                let ext = name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
                Self::from_mime(ext)
            }
            (Some(mime), None) => Self::from_mime(mime),
            (None, None) => PhotoFormat::Other(String::new()),
        }
    }
}

/// One uploaded site photo. `captured_at` is the upload time, not EXIF capture time.
#[derive(Debug, Clone)]
pub struct EvidencePhoto {
    pub id: Uuid,
    pub file_name: String,
    pub format: PhotoFormat,
    pub bytes: Bytes,
    pub captured_at: NaiveDateTime,
}

impl EvidencePhoto {
    pub fn new(
        file_name: impl Into<String>,
        format: PhotoFormat,
        bytes: Bytes,
        captured_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            format,
            bytes,
            captured_at,
        }
    }
}

/// Client-facing view of a photo (no image bytes).
#[derive(Debug, Clone, Serialize)]
pub struct PhotoSummary {
    pub index: usize,
    pub id: Uuid,
    pub file_name: String,
    pub format: PhotoFormat,
    pub size_bytes: usize,
    pub captured_at: NaiveDateTime,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("photo limit of 5 reached")]
pub struct PhotoLimitReached;

/// Ordered photo list capped at `MAX_PHOTOS`. Removal never reorders the rest.
#[derive(Debug, Clone, Default)]
pub struct PhotoSet {
    photos: Vec<EvidencePhoto>,
}

impl PhotoSet {
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn remaining_capacity(&self) -> usize {
        MAX_PHOTOS - self.photos.len()
    }

    pub fn push(&mut self, photo: EvidencePhoto) -> Result<(), PhotoLimitReached> {
        if self.photos.len() >= MAX_PHOTOS {
            return Err(PhotoLimitReached);
        }
        self.photos.push(photo);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<EvidencePhoto> {
        (index < self.photos.len()).then(|| self.photos.remove(index))
    }

    pub fn as_slice(&self) -> &[EvidencePhoto] {
        &self.photos
    }

    pub fn summaries(&self) -> Vec<PhotoSummary> {
        self.photos
            .iter()
            .enumerate()
            .map(|(index, p)| PhotoSummary {
                index,
                id: p.id,
                file_name: p.file_name.clone(),
                format: p.format.clone(),
                size_bytes: p.bytes.len(),
                captured_at: p.captured_at,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn photo(name: &str) -> EvidencePhoto {
        let at = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap();
        EvidencePhoto::new(name, PhotoFormat::Jpeg, Bytes::from_static(b"img"), at)
    }

    #[test]
    fn test_format_from_mime() {
        assert_eq!(PhotoFormat::from_mime("image/png"), PhotoFormat::Png);
        assert_eq!(PhotoFormat::from_mime("image/jpeg"), PhotoFormat::Jpeg);
        assert_eq!(PhotoFormat::from_mime("IMAGE/JPG"), PhotoFormat::Jpeg);
        assert_eq!(
            PhotoFormat::from_mime("image/heic"),
            PhotoFormat::Other("image/heic".to_string())
        );
    }

    #[test]
    fn test_format_detect_falls_back_to_extension() {
        assert_eq!(
            PhotoFormat::detect(Some("application/octet-stream"), Some("IMG_0042.JPG")),
            PhotoFormat::Jpeg
        );
        assert_eq!(PhotoFormat::detect(None, Some("panel.png")), PhotoFormat::Png);
        assert_eq!(
            PhotoFormat::detect(Some("image/png"), Some("mislabeled.jpg")),
            PhotoFormat::Png
        );
    }

    #[test]
    fn test_photo_set_rejects_sixth_photo() {
        let mut set = PhotoSet::default();
        for i in 0..MAX_PHOTOS {
            set.push(photo(&format!("{i}.jpg"))).unwrap();
        }
        assert_eq!(set.remaining_capacity(), 0);
        assert_eq!(set.push(photo("6.jpg")), Err(PhotoLimitReached));
        assert_eq!(set.len(), MAX_PHOTOS);
    }

    #[test]
    fn test_photo_set_remove_preserves_order() {
        let mut set = PhotoSet::default();
        for name in ["a.jpg", "b.jpg", "c.jpg", "d.jpg"] {
            set.push(photo(name)).unwrap();
        }
        let removed = set.remove(1).unwrap();
        assert_eq!(removed.file_name, "b.jpg");

        let names: Vec<&str> = set.as_slice().iter().map(|p| p.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "c.jpg", "d.jpg"]);
        assert_eq!(set.summaries()[2].index, 2);
    }

    #[test]
    fn test_photo_set_remove_out_of_range_is_none() {
        let mut set = PhotoSet::default();
        set.push(photo("a.jpg")).unwrap();
        assert!(set.remove(1).is_none());
        assert_eq!(set.len(), 1);
    }
}
