use std::io::Cursor;

use image::codecs::jpeg::JpegDecoder;
use image::{ColorType, DynamicImage, ImageDecoder, ImageFormat};
use lopdf::{
    content::{Content, Operation},
    dictionary, Dictionary, Document, Object, ObjectId, Stream,
};
use thiserror::Error;
use tracing::{debug, warn};

use super::font_metrics::{encode_win_ansi, Font};
use super::layout::{TextPage, MARGIN, PAGE_HEIGHT, PAGE_WIDTH};
use super::RenderError;
use crate::models::photo::{EvidencePhoto, PhotoFormat};

/// Vertical room reserved for the caption band on photo pages.
const CAPTION_BAND: f32 = 100.0;
const CAPTION_SIZE: f32 = 10.0;
const CAPTION_DATE_FORMAT: &str = "%b %-d, %Y %-I:%M:%S %p";

/// Why a single photo was left out of the document.
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("unsupported image format '{0}'")]
    Unsupported(String),

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image has zero size")]
    Empty,

    #[error("content encoding failed: {0}")]
    Content(#[from] lopdf::Error),
}

/// Accumulates pages into a single lopdf document.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    fonts: Dictionary,
    kids: Vec<Object>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in [Font::Regular, Font::Bold] {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), font_id);
        }

        Self {
            doc,
            pages_id,
            fonts,
            kids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    pub fn add_text_page(&mut self, page: &TextPage) -> Result<(), RenderError> {
        let mut operations = Vec::with_capacity(page.lines.len() * 5);
        for line in &page.lines {
            push_text(&mut operations, line.font, line.size_pt, line.x, line.y, &line.text);
        }
        let resources = dictionary! { "Font" => self.fonts.clone() };
        self.push_page(operations, resources)?;
        Ok(())
    }

    /// Adds one page holding `photo` scaled into the image area, with its caption.
    /// `number` is the 1-based position of the photo in the upload order.
    pub fn add_photo_page(&mut self, number: usize, photo: &EvidencePhoto) -> Result<(), PhotoError> {
        let image = match &photo.format {
            PhotoFormat::Png => ImageXObject::from_png(&photo.bytes)?,
            PhotoFormat::Jpeg => ImageXObject::from_jpeg(&photo.bytes)?,
            PhotoFormat::Other(mime) => return Err(PhotoError::Unsupported(mime.clone())),
        };
        let (width_px, height_px) = (image.width_px, image.height_px);
        let image_id = self.add_image(image)?;

        let (draw_w, draw_h) = fit_within(
            width_px as f32,
            height_px as f32,
            PAGE_WIDTH - 2.0 * MARGIN,
            PAGE_HEIGHT - 2.0 * MARGIN - CAPTION_BAND,
        );
        let x = (PAGE_WIDTH - draw_w) / 2.0;
        let y = (PAGE_HEIGHT - draw_h) / 2.0;

        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    draw_w.into(),
                    0.into(),
                    0.into(),
                    draw_h.into(),
                    x.into(),
                    y.into(),
                ],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ];
        let caption = format!(
            "Photo {number}: Field Evidence - {}",
            photo.captured_at.format(CAPTION_DATE_FORMAT)
        );
        push_text(
            &mut operations,
            Font::Regular,
            CAPTION_SIZE,
            MARGIN,
            MARGIN,
            &encode_win_ansi(&caption),
        );

        let resources = dictionary! {
            "Font" => self.fonts.clone(),
            "XObject" => dictionary! { "Im0" => image_id },
        };
        self.push_page(operations, resources)?;
        debug!(number, width_px, height_px, "photo page added");
        Ok(())
    }

    fn add_image(&mut self, image: ImageXObject) -> Result<ObjectId, PhotoError> {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width_px as i64,
            "Height" => image.height_px as i64,
            "ColorSpace" => image.color_space,
            "BitsPerComponent" => 8,
        };
        if let Some(alpha) = image.alpha {
            let mut smask = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => image.width_px as i64,
                    "Height" => image.height_px as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                alpha,
            );
            smask.compress()?;
            dict.set("SMask", self.doc.add_object(smask));
        }

        let stream = match image.filter {
            Some(filter) => {
                dict.set("Filter", filter);
                Stream::new(dict, image.data).with_compression(false)
            }
            None => {
                let mut stream = Stream::new(dict, image.data);
                stream.compress()?;
                stream
            }
        };
        Ok(self.doc.add_object(stream))
    }

    fn push_page(
        &mut self,
        operations: Vec<Operation>,
        resources: Dictionary,
    ) -> Result<ObjectId, lopdf::Error> {
        let encoded = Content { operations }.encode()?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), encoded));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Resources" => resources,
            "Contents" => content_id,
        });
        self.kids.push(page_id.into());
        Ok(page_id)
    }

    /// Writes the page tree and catalog, compresses streams and serializes.
    pub fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut out = Vec::new();
        self.doc.save_to(&mut out)?;
        Ok(out)
    }
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pixel data for one image XObject, plus an optional soft mask.
struct ImageXObject {
    width_px: u32,
    height_px: u32,
    color_space: &'static str,
    /// Set when `data` is already encoded (JPEG passthrough).
    filter: Option<&'static str>,
    data: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

impl ImageXObject {
    /// The original bytes are embedded under DCTDecode after a full decode
    /// rejects corrupt data.
    fn from_jpeg(bytes: &[u8]) -> Result<Self, PhotoError> {
        let decoder = JpegDecoder::new(Cursor::new(bytes))?;
        let (width_px, height_px) = decoder.dimensions();
        if width_px == 0 || height_px == 0 {
            return Err(PhotoError::Empty);
        }
        let color_space = match decoder.color_type() {
            ColorType::L8 => "DeviceGray",
            _ => "DeviceRGB",
        };
        DynamicImage::from_decoder(decoder)?;

        Ok(Self {
            width_px,
            height_px,
            color_space,
            filter: Some("DCTDecode"),
            data: bytes.to_vec(),
            alpha: None,
        })
    }

    /// Decodes to RGB samples; any alpha channel becomes a separate soft mask.
    fn from_png(bytes: &[u8]) -> Result<Self, PhotoError> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        let (width_px, height_px) = (img.width(), img.height());
        if width_px == 0 || height_px == 0 {
            return Err(PhotoError::Empty);
        }

        let (data, alpha) = if img.color().has_alpha() {
            let rgba = img.into_rgba8();
            let pixels = width_px as usize * height_px as usize;
            let mut rgb = Vec::with_capacity(pixels * 3);
            let mut alpha = Vec::with_capacity(pixels);
            for px in rgba.pixels() {
                rgb.extend_from_slice(&px.0[..3]);
                alpha.push(px.0[3]);
            }
            (rgb, Some(alpha))
        } else {
            (img.into_rgb8().into_raw(), None)
        };

        Ok(Self {
            width_px,
            height_px,
            color_space: "DeviceRGB",
            filter: None,
            data,
            alpha,
        })
    }
}

/// Adds every renderable photo, one page each. Failures are logged and skipped;
/// numbering follows the upload order so a skipped photo leaves a gap.
pub fn add_photo_pages(builder: &mut PdfBuilder, photos: &[EvidencePhoto]) -> usize {
    let mut added = 0;
    for (i, photo) in photos.iter().enumerate() {
        match builder.add_photo_page(i + 1, photo) {
            Ok(()) => added += 1,
            Err(e) => warn!("Skipping photo {} ({}): {e}", i + 1, photo.file_name),
        }
    }
    added
}

fn push_text(operations: &mut Vec<Operation>, font: Font, size: f32, x: f32, y: f32, text: &[u8]) {
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new(
        "Tf",
        vec![font.resource_name().into(), size.into()],
    ));
    operations.push(Operation::new("Td", vec![x.into(), y.into()]));
    operations.push(Operation::new("Tj", vec![Object::string_literal(text.to_vec())]));
    operations.push(Operation::new("ET", vec![]));
}

/// Shrinks (never enlarges) `w × h` to fit the box, preserving aspect ratio.
pub fn fit_within(w: f32, h: f32, max_w: f32, max_h: f32) -> (f32, f32) {
    let (mut out_w, mut out_h) = (w, h);
    if out_w > max_w {
        out_w = max_w;
        out_h = h * max_w / w;
    }
    if out_h > max_h {
        out_h = max_h;
        out_w = w * max_h / h;
    }
    (out_w, out_h)
}
