use std::collections::HashMap;

/// A column as the crawler names it, with older or alternate header names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub names: &'static [&'static str],
}

impl Column {
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    /// Primary header name, used in warnings.
    pub fn name(&self) -> &'static str {
        self.names.first().copied().unwrap_or("")
    }
}

pub const ADDRESS: Column = Column::new(&["Address"]);
pub const STATUS_CODE: Column = Column::new(&["Status Code"]);
pub const CONTENT_TYPE: Column = Column::new(&["Content Type"]);

/// One crawler export held in memory.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers: Vec<String> = headers
            .into_iter()
            .enumerate()
            .map(|(i, h)| {
                let h = if i == 0 {
                    h.trim_start_matches('\u{feff}')
                } else {
                    h.as_str()
                };
                h.trim().to_string()
            })
            .collect();

        let mut index = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            // first occurrence wins for repeated headers
            index.entry(header.clone()).or_insert(i);
        }

        Self {
            headers,
            index,
            rows,
        }
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

    pub fn has_column(&self, column: &Column) -> bool {
        self.resolve(column).is_some()
    }

    /// Index of the first of the column's names present in this table.
    pub fn resolve(&self, column: &Column) -> Option<usize> {
        column
            .names
            .iter()
            .find_map(|name| self.index.get(*name).copied())
    }

    pub fn row(&self, position: usize) -> Option<Row<'_>> {
        self.rows.get(position).map(|cells| Row {
            table: self,
            position,
            cells,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(move |(position, cells)| Row {
            table: self,
            position,
            cells,
        })
    }
}

/// Borrowed view of one crawled page (or resource) in an export.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    position: usize,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Zero-based position of the row in its export.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Trimmed cell value; `None` for a missing column or a blank cell.
    pub fn get(&self, column: &Column) -> Option<&'a str> {
        let idx = self.table.resolve(column)?;
        let value = self.cells.get(idx)?.trim();
        if value.is_empty() { None } else { Some(value) }
    }

    pub fn address(&self) -> Option<&'a str> {
        self.get(&ADDRESS)
    }

    /// Parse a numeric cell.
    ///
    /// `None` when blank, `Some(Err(raw))` when the value is not a finite,
    /// non-negative number. Every numeric column the crawler writes (counts,
    /// seconds, ratios, status codes) is non-negative. A trailing `%` is
    /// accepted so ratio columns parse as plain numbers.
    pub fn number(&self, column: &Column) -> Option<Result<f64, &'a str>> {
        let raw = self.get(column)?;
        let cleaned = raw.trim_end_matches('%').trim();
        let parsed = match cleaned.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
            _ => Err(raw),
        };
        Some(parsed)
    }

    /// True for HTML pages that answered 2xx.
    ///
    /// Missing `Content Type` or `Status Code` columns are treated as
    /// satisfied, since several tabs only carry the columns they report on.
    pub fn is_content_page(&self) -> bool {
        let html = if self.table.has_column(&CONTENT_TYPE) {
            self.get(&CONTENT_TYPE)
                .map(|ct| ct.to_lowercase().contains("html"))
                .unwrap_or(false)
        } else {
            true
        };

        let ok = if self.table.has_column(&STATUS_CODE) {
            matches!(self.number(&STATUS_CODE), Some(Ok(code)) if (200.0..300.0).contains(&code))
        } else {
            true
        };

        html && ok
    }
}
