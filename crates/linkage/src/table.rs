use crate::normalize::normalize_header;

/// Cell values treated as missing, matched exactly.
///
/// These are the tokens tabular exporters conventionally write for "no value";
/// a store literally named "NA" is indistinguishable from a blank cell.
pub const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_null_marker(value: &str) -> bool {
    NULL_MARKERS.contains(&value)
}

/// A source table with normalized headers and text cells.
///
/// Every row has exactly `headers.len()` cells: short rows are padded with
/// empty cells and long rows are truncated at construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column with this (normalized) header.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn record(&self, row: usize) -> Option<RawRecord<'_>> {
        self.rows.get(row).map(|cells| RawRecord { cells })
    }

    pub fn records(&self) -> impl Iterator<Item = RawRecord<'_>> + '_ {
        self.rows.iter().map(|cells| RawRecord { cells })
    }

    /// Raw cells of a row in header order.
    pub fn row_cells(&self, row: usize) -> Option<&[String]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    /// Return the index of `header`, appending an empty column if absent.
    pub fn ensure_column(&mut self, header: &str) -> usize {
        let header = normalize_header(header);
        if let Some(idx) = self.column_index(&header) {
            return idx;
        }
        self.headers.push(header);
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Overwrite one cell. Out-of-range coordinates are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value.into();
        }
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    cells: &'a [String],
}

impl<'a> RawRecord<'a> {
    /// Cell value, or `None` when the cell is blank or a null marker.
    pub fn value(&self, col: usize) -> Option<&'a str> {
        self.cells
            .get(col)
            .map(|s| s.as_str())
            .filter(|s| !is_null_marker(s))
    }

    pub fn cells(&self) -> &'a [String] {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RawTable {
        RawTable::new(
            vec!["Store\nName".into(), " Zip ".into()],
            vec![
                vec!["Fresh Mart".into(), "10001".into()],
                vec!["NA".into()],
                vec!["Deli".into(), "11201".into(), "extra".into()],
            ],
        )
    }

    #[test]
    fn headers_are_normalized() {
        let t = table();
        assert_eq!(t.headers(), &["Store Name", "Zip"]);
        assert_eq!(t.column_index("Store Name"), Some(0));
        assert_eq!(t.column_index("Store\nName"), None);
    }

    #[test]
    fn rows_are_padded_and_truncated() {
        let t = table();
        assert_eq!(t.row_cells(1).unwrap(), &["NA", ""]);
        assert_eq!(t.row_cells(2).unwrap(), &["Deli", "11201"]);
    }

    #[test]
    fn null_markers_read_as_absent() {
        let t = table();
        let r = t.record(1).unwrap();
        assert_eq!(r.value(0), None);
        assert_eq!(r.value(1), None);
        assert_eq!(t.record(0).unwrap().value(0), Some("Fresh Mart"));
        assert_eq!(r.value(7), None);
    }

    #[test]
    fn ensure_column_appends_once() {
        let mut t = table();
        let idx = t.ensure_column("Score");
        assert_eq!(idx, 2);
        assert_eq!(t.ensure_column("Score"), 2);
        assert_eq!(t.headers().len(), 3);
        t.set(0, idx, "7");
        assert_eq!(t.record(0).unwrap().value(idx), Some("7"));
        assert_eq!(t.record(1).unwrap().value(idx), None);
    }
}
