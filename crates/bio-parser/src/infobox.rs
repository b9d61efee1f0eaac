//! Raw infobox table extraction

use bio_core::RawInfobox;
use bio_normalizer::TextNormalizer;
use scraper::ElementRef;

use crate::document::{collect_text, selector};
use crate::WikiPage;

/// Rows of `table` itself, leaving out rows of tables nested in its cells
fn direct_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    table
        .children()
        .filter_map(ElementRef::wrap)
        .flat_map(|child| match child.value().name() {
            "tr" => vec![child],
            "thead" | "tbody" | "tfoot" => child
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|row| row.value().name() == "tr")
                .collect(),
            _ => Vec::new(),
        })
        .collect()
}

fn direct_cell<'a>(row: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .find(|cell| cell.value().name() == tag)
}

fn cell_text(cell: ElementRef<'_>, normalizer: &TextNormalizer) -> String {
    let mut out = String::new();
    collect_text(cell, &mut out);
    normalizer.normalize(&out)
}

/// Read the first `table.infobox` of the page.
///
/// The first row's header cell names the subject; later rows with both a
/// header and a data cell become key/value pairs. Without an infobox the
/// subject is the page title and there are no pairs.
pub fn extract_infobox(page: &WikiPage) -> RawInfobox {
    let normalizer = TextNormalizer::new();
    let Some(table) = page.document().select(&selector("table.infobox")).next() else {
        tracing::debug!("No infobox on page {}", page.title());
        return RawInfobox::new(page.title());
    };

    let mut rows = direct_rows(table).into_iter().peekable();

    let mut subject = None;
    if let Some(&first) = rows.peek() {
        if direct_cell(first, "td").is_none() {
            subject = direct_cell(first, "th")
                .map(|cell| cell_text(cell, &normalizer))
                .filter(|text| !text.is_empty());
            rows.next();
        }
    }

    let mut raw = RawInfobox::new(subject.unwrap_or_else(|| page.title().to_string()));
    for row in rows {
        let (Some(key), Some(value)) = (direct_cell(row, "th"), direct_cell(row, "td")) else {
            continue;
        };
        let key = cell_text(key, &normalizer);
        let value = cell_text(value, &normalizer);
        if !key.is_empty() {
            raw = raw.with_pair(key, value);
        }
    }

    tracing::debug!("Infobox of {}: {} rows", raw.subject, raw.pairs.len());
    raw
}
