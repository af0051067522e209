use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tracing::debug;

use crate::error::{RagError, Result};

/// Decode a base64-encoded PDF payload into its full text, page by page in
/// document order. Fails when the payload is not valid base64, not a
/// parseable PDF, or yields no extractable text (e.g. a scanned image with
/// no text layer).
pub fn decode_pdf(payload_b64: &str) -> Result<String> {
    let bytes = BASE64
        .decode(payload_b64.trim())
        .map_err(|e| RagError::Decode(format!("payload is not valid base64: {}", e)))?;

    let document = lopdf::Document::load_mem(&bytes)
        .map_err(|e| RagError::Decode(format!("failed to parse PDF: {}", e)))?;

    let pages = document.get_pages();
    let mut text = String::new();
    for page_number in pages.keys() {
        // Pages that fail extraction individually are skipped rather than
        // failing the whole document; the empty-text check below still
        // catches a document with nothing readable.
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => debug!(page = *page_number, error = %e, "Skipping unextractable page"),
        }
    }

    if text.trim().is_empty() {
        return Err(RagError::Decode(
            "document contains no extractable text".to_string(),
        ));
    }

    debug!(pages = pages.len(), chars = text.len(), "Extracted PDF text");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base64() {
        let result = decode_pdf("not!!valid//base64@@");
        assert!(matches!(result, Err(RagError::Decode(_))));
    }

    #[test]
    fn test_rejects_non_pdf_bytes() {
        let payload = BASE64.encode(b"just some plain bytes, not a pdf");
        let result = decode_pdf(&payload);
        assert!(matches!(result, Err(RagError::Decode(_))));
    }

    #[test]
    fn test_extracts_text_in_page_order() {
        let pdf = two_page_pdf("first page words", "second page words");
        let payload = BASE64.encode(&pdf);

        let text = decode_pdf(&payload).unwrap();
        let first = text.find("first page words").unwrap();
        let second = text.find("second page words").unwrap();
        assert!(first < second);
    }

    /// Build a minimal two-page PDF in memory.
    fn two_page_pdf(page1: &str, page2: &str) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids = Vec::new();
        for text in [page1, page2] {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![50.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id.into());
        }

        let page_count = page_ids.len() as i32;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}
