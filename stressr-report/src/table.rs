use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RowKind {
    Header,
    Data,
    Mixed,
    Empty,
}

/// One `<tr>` of the report, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub index: usize,
    /// Raw text of the `<th>` cells.
    pub labels: Vec<String>,
    /// Raw text of the `<td>` cells.
    pub cells: Vec<String>,
}

impl TableRow {
    #[must_use]
    pub fn kind(&self) -> RowKind {
        match (self.labels.is_empty(), self.cells.is_empty()) {
            (false, true) => RowKind::Header,
            (true, false) => RowKind::Data,
            (false, false) => RowKind::Mixed,
            (true, true) => RowKind::Empty,
        }
    }
}

/// Collects every table row of an HTML document.
///
/// Cell text is the concatenation of all descendant text nodes, untrimmed.
///
/// The document goes through an HTML5 tree builder, which discards `<tr>`,
/// `<th>` and `<td>` tags outside a `<table>`. Rows must sit inside a table
/// to be seen at all.
pub fn extract_rows(html: &str) -> Result<Vec<TableRow>> {
    let document = Html::parse_document(html);
    let tr = selector("tr")?;
    let th = selector("th")?;
    let td = selector("td")?;

    let rows = document
        .select(&tr)
        .enumerate()
        .map(|(index, row)| TableRow {
            index,
            labels: cell_texts(row, &th),
            cells: cell_texts(row, &td),
        })
        .collect::<Vec<_>>();

    if rows.is_empty() {
        return Err(Error::Malformed("no table rows found".to_string()));
    }
    Ok(rows)
}

fn cell_texts(row: ElementRef<'_>, cell: &Selector) -> Vec<String> {
    row.select(cell)
        .map(|c| c.text().collect::<String>())
        .collect()
}

fn selector(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| Error::Malformed(format!("invalid selector `{css}`: {err:?}")))
}
