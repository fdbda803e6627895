//! HTML parser for SNPedia variant pages
//!
//! This module extracts from a variant page:
//! - The stabilized strand orientation
//! - The short description from the summary box
//! - The genotype table rows
//!
//! Every step is independent; markup missing any of these pieces degrades the matching
//! field instead of failing the whole page.

use crate::model::{AnnotationRecord, Orientation, VariationRow};
use scraper::{ElementRef, Html, Selector};

/// Text of the table cell labelling the orientation row
const ORIENTATION_LABEL: &str = "Rs_StabilizedOrientation";

/// Inline style of the summary box holding the description
const SUMMARY_TABLE_STYLE: &str =
    "border: 1px; background-color: #FFFFC0; border-style: solid; margin:1em; width:90%;";

/// Parses a variant page into an annotation record for `rsid`
///
/// # Extraction Rules
///
/// | Field | Source |
/// |-------|--------|
/// | Orientation | Row of the `Rs_StabilizedOrientation` cell, else the row of the `StabilizedOrientation` link |
/// | Description | First non-empty cell of the yellow summary table |
/// | Variations | Rows after the header of the `sortable smwtable` table |
///
/// When a row carries both `plus` and `minus` cells, `minus` wins.
///
/// # Example
///
/// ```
/// use osgenome::crawler::parse_snp_page;
///
/// let record = parse_snp_page("Rs1", "<html><body><p>No tables here</p></body></html>");
/// assert_eq!(record.rsid, "rs1");
/// assert!(record.variations.is_empty());
/// ```
pub fn parse_snp_page(rsid: &str, html: &str) -> AnnotationRecord {
    let document = Html::parse_document(html);

    let orientation = extract_orientation(&document);
    let description = extract_description(&document).unwrap_or_default();
    let variations = extract_variations(&document);

    tracing::debug!(
        "{}: orientation '{}', {} variation rows",
        rsid,
        orientation.label(),
        variations.len()
    );

    AnnotationRecord::new(rsid, description, variations, orientation)
}

fn extract_orientation(document: &Html) -> Orientation {
    let Ok(cell_selector) = Selector::parse("td") else {
        return Orientation::Unknown;
    };

    let labelled_row = document
        .select(&cell_selector)
        .find(|cell| cell_text(cell) == ORIENTATION_LABEL)
        .and_then(parent_element);

    if let Some(row) = labelled_row {
        let found = orientation_in_row(row, &cell_selector);
        if found.is_known() {
            return found;
        }
    }

    // Some page revisions only link the property name: link -> cell -> row
    let linked_row = Selector::parse(r#"a[title="StabilizedOrientation"]"#)
        .ok()
        .and_then(|link_selector| document.select(&link_selector).next())
        .and_then(parent_element)
        .and_then(parent_element);

    linked_row
        .map(|row| orientation_in_row(row, &cell_selector))
        .unwrap_or(Orientation::Unknown)
}

fn orientation_in_row(row: ElementRef<'_>, cell_selector: &Selector) -> Orientation {
    let mut found = Orientation::Unknown;
    for cell in row.select(cell_selector) {
        match cell_text(&cell).as_str() {
            "minus" => return Orientation::Minus,
            "plus" => found = Orientation::Plus,
            _ => {}
        }
    }
    found
}

fn extract_description(document: &Html) -> Option<String> {
    let table_selector = Selector::parse(&format!(r#"table[style="{}"]"#, SUMMARY_TABLE_STYLE)).ok()?;
    let cell_selector = Selector::parse("td").ok()?;

    let table = document.select(&table_selector).next()?;
    table
        .select(&cell_selector)
        .map(|cell| cell_text(&cell))
        .find(|text| !text.is_empty())
}

fn extract_variations(document: &Html) -> Vec<VariationRow> {
    let (Ok(table_selector), Ok(row_selector), Ok(cell_selector)) = (
        Selector::parse("table.sortable.smwtable"),
        Selector::parse("tr"),
        Selector::parse("td"),
    ) else {
        return Vec::new();
    };

    let Some(table) = document.select(&table_selector).next() else {
        return Vec::new();
    };

    table
        .select(&row_selector)
        .skip(1) // header row
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&cell_selector).map(|c| cell_text(&c)).collect();
            VariationRow::from_cells(cells)
        })
        .collect()
}

fn cell_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}
