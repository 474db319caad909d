//! PDF decoding via `pdf-extract`.
//!
//! `pdf-extract` walks a page's content stream and reports every glyph with
//! its text-rendering matrix. Consecutive glyphs on one baseline become one
//! [`Fragment`], positioned at the translation of its first glyph.

use pdf_extract::{Document, MediaBox, OutputDev, OutputError, Transform};

use crate::document::{DecodedDocument, DocumentDecoder};
use crate::error::{IngestError, Result};
use crate::types::Fragment;

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfDecoder;

pub struct PdfDocument {
    doc: Document,
    /// PDF page numbers (1-based) in page-tree order.
    page_numbers: Vec<u32>,
}

impl DocumentDecoder for PdfDecoder {
    type Document = PdfDocument;

    fn decode(&self, bytes: &[u8]) -> Result<PdfDocument> {
        let doc = Document::load_mem(bytes).map_err(|e| IngestError::Decode(e.to_string()))?;
        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        log::debug!("decoded PDF with {} pages", page_numbers.len());
        Ok(PdfDocument { doc, page_numbers })
    }
}

impl DecodedDocument for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_fragments(&self, index: usize) -> Result<Vec<Fragment>> {
        let page_num = *self.page_numbers.get(index).ok_or(IngestError::PageRead {
            page: index + 1,
            message: "page out of range".to_string(),
        })?;

        let mut collector = FragmentCollector::default();
        pdf_extract::output_doc_page(&self.doc, &mut collector, page_num).map_err(|e| {
            IngestError::PageRead {
                page: index + 1,
                message: format!("{e:?}"),
            }
        })?;
        Ok(collector.fragments)
    }
}

/// Largest horizontal gap, in ems, still treated as part of the same text
/// item. Kerning inside a `TJ` array stays well below this; the gutter
/// between statement columns is several ems wide.
const MAX_ITEM_GAP_EM: f64 = 1.0;
/// Gaps wider than this (in ems) are rendered as a single space.
const SPACE_GAP_EM: f64 = 0.1;

/// Glyph scale of a text-rendering matrix (font size in user space).
fn glyph_scale(trm: &Transform) -> f64 {
    (trm.m11 * trm.m22 - trm.m12 * trm.m21).abs().sqrt()
}

struct OpenFragment {
    frag: Fragment,
    /// x where the last glyph's advance ends.
    end_x: f64,
    scale: f64,
}

/// Collects glyphs into text items. pdf-extract reports every string element
/// of a `TJ` array as its own word, so glyphs on the same baseline continue
/// the open item until a jump larger than [`MAX_ITEM_GAP_EM`].
#[derive(Default)]
struct FragmentCollector {
    fragments: Vec<Fragment>,
    current: Option<OpenFragment>,
}

impl FragmentCollector {
    fn flush(&mut self) {
        if let Some(open) = self.current.take() {
            if !open.frag.text.is_empty() {
                self.fragments.push(open.frag);
            }
        }
    }
}

impl OutputDev for FragmentCollector {
    fn begin_page(
        &mut self,
        _page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.fragments.clear();
        self.current = None;
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        _font_size: f64,
        text: &str,
    ) -> std::result::Result<(), OutputError> {
        let (x, y) = (trm.m31, trm.m32);
        let scale = glyph_scale(trm);

        if let Some(open) = &self.current {
            let same_line = (y - open.frag.y).abs() <= open.scale * 0.5;
            let gap = x - open.end_x;
            let close = gap >= -open.scale && gap <= open.scale * MAX_ITEM_GAP_EM;
            if !(same_line && close) {
                self.flush();
            }
        }

        let open = self.current.get_or_insert_with(|| OpenFragment {
            frag: Fragment::new(String::new(), x, y),
            end_x: x,
            scale,
        });
        if x - open.end_x > open.scale * SPACE_GAP_EM
            && !open.frag.text.ends_with(char::is_whitespace)
        {
            open.frag.text.push(' ');
        }
        open.frag.text.push_str(text);
        open.end_x = x + width * scale;
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::reconstruct_rows;
    use crate::parsers::apple_card::{RowKind, classify_row};

    fn at(x: f64, y: f64) -> Transform {
        Transform::row_major(10.0, 0.0, 0.0, 10.0, x, y)
    }

    /// Emit `text` as one show-text operation, each glyph half an em wide.
    fn show(c: &mut FragmentCollector, text: &str, x: f64, y: f64) -> f64 {
        c.begin_word().unwrap();
        let mut x = x;
        for ch in text.chars() {
            c.output_character(&at(x, y), 0.5, 0.0, 1.0, &ch.to_string())
                .unwrap();
            x += 5.0;
        }
        c.end_word().unwrap();
        x
    }

    #[test]
    fn test_collector_groups_glyphs_per_text_item() {
        let mut c = FragmentCollector::default();
        show(&mut c, "4.50", 550.0, 670.0);
        show(&mut c, "X", 36.0, 690.0);
        c.end_page().unwrap();

        assert_eq!(
            c.fragments,
            vec![
                Fragment::new("4.50", 550.0, 670.0),
                Fragment::new("X", 36.0, 690.0),
            ]
        );
    }

    #[test]
    fn test_kerned_tj_elements_form_one_item() {
        // [(STORE) -250 (#1234)] TJ: the second string starts a quarter em
        // after the first one's advance.
        let mut c = FragmentCollector::default();
        let end = show(&mut c, "STORE", 105.0, 606.0);
        show(&mut c, "#1234", end + 2.5, 606.0);
        c.end_page().unwrap();

        assert_eq!(c.fragments, vec![Fragment::new("STORE #1234", 105.0, 606.0)]);

        let rows = reconstruct_rows(&c.fragments);
        assert_eq!(classify_row(&rows[0]), RowKind::Continuation("STORE #1234"));
    }

    #[test]
    fn test_tight_kerning_adds_no_space() {
        let mut c = FragmentCollector::default();
        let end = show(&mut c, "AV", 105.0, 606.0);
        show(&mut c, "OCADO", end - 0.5, 606.0);
        c.end_page().unwrap();
        assert_eq!(c.fragments, vec![Fragment::new("AVOCADO", 105.0, 606.0)]);
    }

    #[test]
    fn test_column_gutter_splits_items_on_same_baseline() {
        let mut c = FragmentCollector::default();
        show(&mut c, "03/01/2024", 36.0, 620.0);
        show(&mut c, "Coffee Shop", 105.0, 620.0);
        c.end_page().unwrap();

        let texts: Vec<_> = c.fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["03/01/2024", "Coffee Shop"]);
    }

    #[test]
    fn test_empty_show_operation_is_dropped() {
        let mut c = FragmentCollector::default();
        c.begin_word().unwrap();
        c.end_word().unwrap();
        c.end_page().unwrap();
        assert!(c.fragments.is_empty());
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = PdfDecoder.decode(b"not a pdf").err().unwrap();
        assert!(matches!(err, IngestError::Decode(_)));
    }
}
