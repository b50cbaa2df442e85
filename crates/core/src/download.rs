//! Download helpers: filename derivation and progress calculation.
//!
//! Pure functions only; the streaming itself lives in the app layer.

use serde::Serialize;

/// Filename used when a title sanitizes to nothing.
pub const FALLBACK_FILENAME: &str = "download";

/// Longest file stem we produce (before the extension).
pub const MAX_STEM_LEN: usize = 120;

// ---------------------------------------------------------------------------
// Media type
// ---------------------------------------------------------------------------

/// Media types the platform serves as downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Mp3,
    Wav,
    Ogg,
    Flac,
    Aac,
    Mp4,
    Pdf,
    Zip,
    Other,
}

impl MediaKind {
    /// Classify a `Content-Type` header value, ignoring parameters
    /// such as `; charset=...`.
    pub fn from_content_type(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "audio/mpeg" | "audio/mp3" => MediaKind::Mp3,
            "audio/wav" | "audio/x-wav" | "audio/wave" => MediaKind::Wav,
            "audio/ogg" => MediaKind::Ogg,
            "audio/flac" | "audio/x-flac" => MediaKind::Flac,
            "audio/aac" | "audio/mp4" | "audio/x-m4a" => MediaKind::Aac,
            "video/mp4" => MediaKind::Mp4,
            "application/pdf" => MediaKind::Pdf,
            "application/zip" | "application/x-zip-compressed" => MediaKind::Zip,
            _ => MediaKind::Other,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Mp3 => "mp3",
            MediaKind::Wav => "wav",
            MediaKind::Ogg => "ogg",
            MediaKind::Flac => "flac",
            MediaKind::Aac => "m4a",
            MediaKind::Mp4 => "mp4",
            MediaKind::Pdf => "pdf",
            MediaKind::Zip => "zip",
            MediaKind::Other => "bin",
        }
    }
}

// ---------------------------------------------------------------------------
// Filenames
// ---------------------------------------------------------------------------

/// Turn a resource title into a filesystem-safe file stem.
///
/// - Path separators, reserved characters (`<>:"/\|?*`) and control
///   characters become `_`.
/// - Runs of whitespace/underscores collapse to a single `_`.
/// - Leading/trailing dots, underscores and spaces are trimmed.
/// - The result is capped at [`MAX_STEM_LEN`] characters and falls back to
///   [`FALLBACK_FILENAME`] when empty.
pub fn sanitize_filename(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut last_was_sep = false;

    for c in title.chars() {
        let unsafe_char = c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*');
        if unsafe_char || c.is_whitespace() || c == '_' {
            if !last_was_sep {
                out.push('_');
                last_was_sep = true;
            }
        } else {
            out.push(c);
            last_was_sep = false;
        }
    }

    let trimmed: String = out
        .trim_matches(|c: char| c == '.' || c == '_' || c == ' ')
        .chars()
        .take(MAX_STEM_LEN)
        .collect();
    let trimmed = trimmed.trim_end_matches(['.', '_']).to_string();

    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed
    }
}

/// Build the saved filename: sanitized title plus the media extension.
pub fn download_filename(title: &str, kind: MediaKind) -> String {
    format!("{}.{}", sanitize_filename(title), kind.extension())
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Calculate download progress as a percentage (0.0–100.0).
///
/// Returns `None` if the total size is unknown or zero.
pub fn download_progress_percent(received: u64, total: Option<u64>) -> Option<f64> {
    match total {
        Some(t) if t > 0 => {
            let pct = (received as f64 / t as f64) * 100.0;
            Some(pct.min(100.0))
        }
        _ => None,
    }
}

/// Progress snapshot of one in-flight download.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DownloadProgress {
    /// No `Content-Length`: only the byte count is known.
    Indeterminate { received: u64 },
    /// Known size; `percent` stays below 100 until the stream ends.
    Determinate { received: u64, total: u64, percent: f64 },
}

impl DownloadProgress {
    /// Snapshot after `received` bytes.
    ///
    /// `finished` marks the end of the stream; before that the percentage is
    /// capped just under 100 so "complete" is never reported early even if
    /// the server under-declared its length.
    pub fn at(received: u64, total: Option<u64>, finished: bool) -> Self {
        match download_progress_percent(received, total) {
            Some(pct) => {
                let percent = if finished { 100.0 } else { pct.min(99.9) };
                DownloadProgress::Determinate {
                    received,
                    total: total.unwrap_or(received),
                    percent,
                }
            }
            None => DownloadProgress::Indeterminate { received },
        }
    }

    pub fn received(&self) -> u64 {
        match self {
            DownloadProgress::Indeterminate { received }
            | DownloadProgress::Determinate { received, .. } => *received,
        }
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            DownloadProgress::Indeterminate { .. } => None,
            DownloadProgress::Determinate { percent, .. } => Some(*percent),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_reserved_characters() {
        assert_eq!(sanitize_filename("AC/DC: Back?"), "AC_DC_Back");
        assert_eq!(sanitize_filename("a<b>c|d*e\"f"), "a_b_c_d_e_f");
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize_filename("  Mon   Son  "), "Mon_Son");
        assert_eq!(sanitize_filename("tab\tand\nnewline"), "tab_and_newline");
    }

    #[test]
    fn sanitize_keeps_unicode_letters() {
        assert_eq!(sanitize_filename("Éwondo été"), "Éwondo_été");
    }

    #[test]
    fn sanitize_strips_dot_prefixes() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("..."), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename(""), FALLBACK_FILENAME);
    }

    #[test]
    fn sanitize_caps_length() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_filename(&long).chars().count(), MAX_STEM_LEN);
    }

    #[test]
    fn media_kind_from_content_type() {
        assert_eq!(MediaKind::from_content_type("audio/mpeg"), MediaKind::Mp3);
        assert_eq!(MediaKind::from_content_type("Audio/WAV"), MediaKind::Wav);
        assert_eq!(
            MediaKind::from_content_type("application/pdf; charset=binary"),
            MediaKind::Pdf
        );
        assert_eq!(MediaKind::from_content_type("text/html"), MediaKind::Other);
    }

    #[test]
    fn filename_has_extension() {
        assert_eq!(download_filename("Mon Son", MediaKind::Mp3), "Mon_Son.mp3");
        assert_eq!(download_filename("", MediaKind::Pdf), "download.pdf");
    }

    #[test]
    fn progress_known_total() {
        let pct = download_progress_percent(50, Some(100));
        assert!((pct.unwrap() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn progress_unknown_or_zero_total() {
        assert!(download_progress_percent(50, None).is_none());
        assert!(download_progress_percent(50, Some(0)).is_none());
    }

    #[test]
    fn snapshot_never_reports_100_before_finish() {
        let p = DownloadProgress::at(100, Some(100), false);
        assert!(p.percent().unwrap() < 100.0);
        let p = DownloadProgress::at(100, Some(100), true);
        assert_eq!(p.percent(), Some(100.0));
    }

    #[test]
    fn snapshot_without_length_is_indeterminate() {
        let p = DownloadProgress::at(4096, None, false);
        assert_eq!(p, DownloadProgress::Indeterminate { received: 4096 });
        assert_eq!(p.percent(), None);
        assert_eq!(p.received(), 4096);
    }
}
