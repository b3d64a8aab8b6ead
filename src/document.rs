//! Document-to-text adapter for uploaded resumes (PDF, DOCX, plain text).
//!
//! Parsing runs on the blocking pool: PDF decoding is CPU bound and the
//! underlying parser can panic on malformed input, which we turn into a
//! `ParseError` instead of taking the worker down.

use std::io::{Cursor, Read};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported document format: {0}")]
    Unsupported(String),

    #[error("corrupt {format} document: {reason}")]
    Corrupt { format: &'static str, reason: String },

    #[error("document contains no text")]
    Empty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    /// Resolve the format from the declared content type, falling back to the file extension.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Result<Self, ParseError> {
        let by_mime = content_type.and_then(|ct| match ct.split(';').next().unwrap_or("").trim() {
            "application/pdf" => Some(DocumentFormat::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(DocumentFormat::Docx)
            }
            "text/plain" => Some(DocumentFormat::PlainText),
            _ => None,
        });
        if let Some(f) = by_mime {
            return Ok(f);
        }

        let ext = file_name
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => Ok(DocumentFormat::Pdf),
            Some("docx") => Ok(DocumentFormat::Docx),
            Some("txt") => Ok(DocumentFormat::PlainText),
            _ => Err(ParseError::Unsupported(
                content_type
                    .or(file_name)
                    .unwrap_or("unknown")
                    .to_string(),
            )),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::PlainText => "text",
        }
    }
}

/// Extract raw text from document bytes.
#[instrument(level = "info", skip(bytes), fields(format = format.as_str(), size = bytes.len()))]
pub async fn extract_text(bytes: Vec<u8>, format: DocumentFormat) -> Result<String, ParseError> {
    let text = tokio::task::spawn_blocking(move || extract_text_blocking(&bytes, format))
        .await
        .map_err(|e| ParseError::Corrupt {
            format: format.as_str(),
            reason: format!("parser aborted: {e}"),
        })??;

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    debug!(target: "resume", chars = text.chars().count(), "Document text extracted");
    Ok(text)
}

fn extract_text_blocking(bytes: &[u8], format: DocumentFormat) -> Result<String, ParseError> {
    match format {
        DocumentFormat::Pdf => pdf_extract::extract_text_from_mem(bytes).map_err(|e| ParseError::Corrupt {
            format: "pdf",
            reason: format!("{e:?}"),
        }),
        DocumentFormat::Docx => docx_text(bytes),
        DocumentFormat::PlainText => String::from_utf8(bytes.to_vec()).map_err(|e| ParseError::Corrupt {
            format: "text",
            reason: e.to_string(),
        }),
    }
}

static XML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("xml tag pattern"));
static XML_ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|lt|gt|quot|apos|amp);").expect("xml entity pattern")
});

/// DOCX is a zip archive; the body lives in `word/document.xml`.
/// Paragraph ends become newlines, tabs become tabs, every other tag is dropped.
fn docx_text(bytes: &[u8]) -> Result<String, ParseError> {
    let corrupt = |reason: String| ParseError::Corrupt { format: "docx", reason };

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| corrupt(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| corrupt(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| corrupt(e.to_string()))?;

    Ok(docx_xml_to_text(&xml))
}

fn docx_xml_to_text(xml: &str) -> String {
    let xml = xml
        .replace("</w:p>", "\n")
        .replace("<w:tab/>", "\t")
        .replace("<w:br/>", "\n");
    let stripped = XML_TAG_RE.replace_all(&xml, "");
    decode_entities(&stripped)
}

/// Named and numeric character references, decoded in a single pass so that
/// `&amp;#38;` stays `&#38;`. Invalid code points are left as written.
fn decode_entities(text: &str) -> String {
    XML_ENTITY_RE
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => {
                    let num = &entity[1..];
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_prefers_content_type_then_extension() {
        assert_eq!(
            DocumentFormat::detect(Some("application/pdf"), Some("cv.docx")).unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::detect(Some("application/octet-stream"), Some("CV.DOCX")).unwrap(),
            DocumentFormat::Docx
        );
        assert_eq!(
            DocumentFormat::detect(Some("text/plain; charset=utf-8"), None).unwrap(),
            DocumentFormat::PlainText
        );
        assert!(matches!(
            DocumentFormat::detect(Some("image/png"), Some("photo.png")),
            Err(ParseError::Unsupported(_))
        ));
    }

    #[test]
    fn docx_xml_keeps_paragraph_breaks() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>JANE DOE</w:t></w:r></w:p><w:p><w:r><w:t>R&amp;D</w:t><w:tab/><w:t>jane@doe.io</w:t></w:r></w:p></w:body></w:document>"#;
        assert_eq!(docx_xml_to_text(xml), "JANE DOE\nR&D\tjane@doe.io\n");
    }

    #[test]
    fn docx_numeric_references_are_decoded() {
        let xml = r#"<w:p><w:r><w:t>Mary O&#8217;Neil</w:t></w:r></w:p><w:p><w:t>Caf&#xE9; &amp;#38; Bar &#xD800;</w:t></w:p>"#;
        let text = docx_xml_to_text(xml);
        assert_eq!(text, "Mary O\u{2019}Neil\nCaf\u{e9} &#38; Bar &#xD800;\n");
        assert_eq!(
            crate::extractor::extract_fields(&text).name.as_deref(),
            Some("Mary O\u{2019}neil")
        );
    }

    #[tokio::test]
    async fn plain_text_is_trimmed() {
        let text = extract_text(b"  Name: Ada Lovelace \n".to_vec(), DocumentFormat::PlainText)
            .await
            .unwrap();
        assert_eq!(text, "Name: Ada Lovelace");
    }

    #[tokio::test]
    async fn garbage_is_a_parse_error() {
        assert!(extract_text(b"not a zip".to_vec(), DocumentFormat::Docx).await.is_err());
        assert!(extract_text(vec![0xff, 0xfe], DocumentFormat::PlainText).await.is_err());
        assert!(matches!(
            extract_text(b"   ".to_vec(), DocumentFormat::PlainText).await,
            Err(ParseError::Empty)
        ));
    }
}
