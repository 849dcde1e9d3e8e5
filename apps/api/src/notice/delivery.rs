// Hand-off helpers: download filename and the mail-client link.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const MAIL_BODY_CLOSING: &str = "This notice is submitted in accordance with the contract requirements.\n\nBest regards";

/// `Change-Notice-<project with whitespace runs as hyphens>-<YYYY-MM-DD>.pdf`.
/// Control characters in the project name are dropped.
pub fn download_filename(project_name: &str, date: NaiveDate) -> String {
    let project: String = WHITESPACE_RUN
        .replace_all(project_name, "-")
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    format!("Change-Notice-{project}-{}.pdf", date.format("%Y-%m-%d"))
}

/// `Content-Disposition` value for a download: an ASCII-only `filename`
/// fallback plus the exact name as an RFC 5987 `filename*`.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}

/// `mailto:` link with no recipient, a subject naming the project and a short
/// covering message. The PDF itself must be attached by the user.
pub fn mailto_href(project_name: &str) -> String {
    let subject = format!("Change Order Notice - {project_name}");
    let body = format!(
        "Please find attached the Change Order Notice for {project_name}.\n\n{MAIL_BODY_CLOSING}"
    );
    format!(
        "mailto:?subject={}&body={}",
        urlencoding::encode(&subject),
        urlencoding::encode(&body)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    #[test]
    fn test_download_filename_hyphenates_whitespace() {
        assert_eq!(
            download_filename("Acme Tower", date()),
            "Change-Notice-Acme-Tower-2024-03-14.pdf"
        );
        assert_eq!(
            download_filename("Acme   Tower\tPhase 2", date()),
            "Change-Notice-Acme-Tower-Phase-2-2024-03-14.pdf"
        );
    }

    #[test]
    fn test_download_filename_single_word() {
        assert_eq!(
            download_filename("Acme", date()),
            "Change-Notice-Acme-2024-03-14.pdf"
        );
    }

    #[test]
    fn test_download_filename_drops_control_characters() {
        assert_eq!(
            download_filename("Acme\u{1}Tower\u{7f}", date()),
            "Change-Notice-AcmeTower-2024-03-14.pdf"
        );
    }

    #[test]
    fn test_content_disposition_ascii_name() {
        assert_eq!(
            content_disposition("Change-Notice-Acme-Tower-2024-03-14.pdf"),
            "attachment; filename=\"Change-Notice-Acme-Tower-2024-03-14.pdf\"; \
             filename*=UTF-8''Change-Notice-Acme-Tower-2024-03-14.pdf"
        );
    }

    #[test]
    fn test_content_disposition_non_ascii_and_quotes() {
        let value = content_disposition("Change-Notice-Caf\u{e9}-\"A\"-2024-03-14.pdf");
        assert_eq!(
            value,
            "attachment; filename=\"Change-Notice-Caf_-_A_-2024-03-14.pdf\"; \
             filename*=UTF-8''Change-Notice-Caf%C3%A9-%22A%22-2024-03-14.pdf"
        );
        assert!(value.chars().all(|c| c.is_ascii_graphic() || c == ' '));
    }

    #[test]
    fn test_mailto_encodes_subject_and_body() {
        let href = mailto_href("Acme Tower");
        assert!(href.starts_with("mailto:?subject=Change%20Order%20Notice%20-%20Acme%20Tower&body="));
        assert!(href.contains("Please%20find%20attached%20the%20Change%20Order%20Notice%20for%20Acme%20Tower."));
        assert!(href.contains("%0A%0AThis%20notice%20is%20submitted"));
        assert!(href.ends_with("Best%20regards"));
    }

    #[test]
    fn test_mailto_escapes_reserved_characters() {
        let href = mailto_href("A&B Tower?");
        assert!(href.contains("A%26B%20Tower%3F"));
        assert_eq!(href.matches('&').count(), 1);
    }
}
