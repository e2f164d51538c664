//! Uploaded document text extraction (resume / job description).
//!
//! Failures never abort the interview: any upload that cannot be read becomes `None`
//! and the prompt falls back to its "not provided" placeholder.

use bytes::Bytes;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
enum DocumentKind {
    Pdf,
    PlainText,
}

fn detect_kind(filename: Option<&str>, content_type: Option<&str>) -> Option<DocumentKind> {
    let content_type = content_type.map(|c| c.to_ascii_lowercase());
    let extension = filename
        .and_then(|f| f.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match (content_type.as_deref(), extension.as_deref()) {
        (Some("application/pdf"), _) | (_, Some("pdf")) => Some(DocumentKind::Pdf),
        (Some(ct), _) if ct.starts_with("text/") => Some(DocumentKind::PlainText),
        (_, Some("txt" | "md")) => Some(DocumentKind::PlainText),
        _ => None,
    }
}

/// Extracts readable text from an upload. `label` only names the field in logs.
pub async fn extract_document_text(
    label: &str,
    filename: Option<&str>,
    content_type: Option<&str>,
    bytes: Bytes,
) -> Option<String> {
    if bytes.is_empty() {
        debug!("{label}: empty upload ignored");
        return None;
    }

    let Some(kind) = detect_kind(filename, content_type) else {
        warn!("{label}: unsupported document type (filename={filename:?}, content_type={content_type:?})");
        return None;
    };

    let raw = match kind {
        DocumentKind::Pdf => {
            // pdf-extract is CPU-bound and may panic on malformed input.
            match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                .await
            {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    warn!("{label}: PDF extraction failed: {e}");
                    return None;
                }
                Err(e) => {
                    warn!("{label}: PDF extraction aborted: {e}");
                    return None;
                }
            }
        }
        DocumentKind::PlainText => String::from_utf8_lossy(&bytes).into_owned(),
    };

    let text = normalize_whitespace(&raw);
    if text.is_empty() {
        warn!("{label}: no readable text found");
        return None;
    }

    debug!("{label}: extracted {} characters", text.chars().count());
    Some(text)
}

/// Collapses runs of spaces inside lines and drops blank lines.
fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
