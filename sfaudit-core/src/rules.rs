// Rule predicates over crawler export rows

use crate::config::Thresholds;
use sfaudit_exports::table::{ADDRESS, STATUS_CODE};
use sfaudit_exports::{Column, ExportKind, Row, Table};
use std::collections::HashMap;

pub const TITLE: Column = Column::new(&["Title 1"]);
pub const META_DESCRIPTION: Column = Column::new(&["Meta Description 1"]);
pub const META_KEYWORDS: Column = Column::new(&["Meta Keywords 1"]);
pub const H1_FIRST: Column = Column::new(&["H1-1"]);
pub const H1_SECOND: Column = Column::new(&["H1-2"]);
pub const WORD_COUNT: Column = Column::new(&["Word Count"]);
pub const TEXT_RATIO: Column = Column::new(&["Text Ratio"]);
pub const OUTLINKS: Column = Column::new(&["Outlinks", "Unique Outlinks"]);
pub const CONTENT_HASH: Column = Column::new(&["Hash"]);
pub const ALT_TEXT: Column = Column::new(&["Alt Text"]);
pub const REDIRECT_HOPS: Column = Column::new(&["Number of Redirects", "Redirect Chain"]);
pub const LOAD_TIME: Column = Column::new(&["Page Load Time (Seconds)", "Response Time"]);
pub const INLINK_SOURCE: Column = Column::new(&["Source"]);
pub const INLINK_DESTINATION: Column = Column::new(&["Destination"]);

/// Result of checking one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Pass,
    Flag(String),
    /// The value the rule needs could not be parsed; carries the raw text.
    Unparseable(String),
}

/// A page flagged by a whole-table rule, by row position.
#[derive(Debug, Clone, PartialEq)]
pub struct TableHit {
    pub position: usize,
    pub detail: String,
}

pub type RowCheck = fn(&Row<'_>, &Thresholds) -> RowOutcome;
pub type TableCheck = fn(&Table, &Thresholds) -> Vec<TableHit>;

#[derive(Clone, Copy)]
pub enum Predicate {
    Row(RowCheck),
    /// For checks that compare rows with each other, like duplicates.
    Table(TableCheck),
}

/// A catalog issue bound to the data it reads and the check it runs.
#[derive(Clone)]
pub struct Rule {
    pub issue_id: &'static str,
    /// Exports in order of preference; the first one loaded is used.
    pub sources: &'static [ExportKind],
    pub columns: &'static [Column],
    pub predicate: Predicate,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("issue_id", &self.issue_id)
            .field("sources", &self.sources)
            .finish()
    }
}

const STATUS_SOURCES: &[ExportKind] = &[ExportKind::ResponseCodes, ExportKind::InternalAll];
const TITLE_SOURCES: &[ExportKind] = &[ExportKind::PageTitles, ExportKind::InternalAll];
const DESCRIPTION_SOURCES: &[ExportKind] = &[ExportKind::MetaDescription, ExportKind::InternalAll];
const H1_SOURCES: &[ExportKind] = &[ExportKind::H1, ExportKind::InternalAll];
const PAGE_SOURCES: &[ExportKind] = &[ExportKind::InternalAll, ExportKind::InternalHtml];

/// One rule per issue in [`Catalog::standard`](crate::data::Catalog::standard).
pub fn standard_rules() -> Vec<Rule> {
    vec![
        Rule {
            issue_id: "broken_links",
            sources: STATUS_SOURCES,
            columns: &[ADDRESS, STATUS_CODE],
            predicate: Predicate::Row(check_client_error),
        },
        Rule {
            issue_id: "server_errors",
            sources: STATUS_SOURCES,
            columns: &[ADDRESS, STATUS_CODE],
            predicate: Predicate::Row(check_server_error),
        },
        Rule {
            issue_id: "redirect_chains",
            sources: &[ExportKind::RedirectChains],
            columns: &[ADDRESS, REDIRECT_HOPS],
            predicate: Predicate::Row(check_redirect_chain),
        },
        Rule {
            issue_id: "duplicate_titles",
            sources: TITLE_SOURCES,
            columns: &[ADDRESS, TITLE],
            predicate: Predicate::Table(find_duplicate_titles),
        },
        Rule {
            issue_id: "missing_meta_descriptions",
            sources: DESCRIPTION_SOURCES,
            columns: &[ADDRESS, META_DESCRIPTION],
            predicate: Predicate::Row(check_missing_meta_description),
        },
        Rule {
            issue_id: "missing_h1",
            sources: H1_SOURCES,
            columns: &[ADDRESS, H1_FIRST],
            predicate: Predicate::Row(check_missing_h1),
        },
        Rule {
            issue_id: "duplicate_content",
            sources: PAGE_SOURCES,
            columns: &[ADDRESS, CONTENT_HASH],
            predicate: Predicate::Table(find_duplicate_content),
        },
        Rule {
            issue_id: "slow_pages",
            sources: &[ExportKind::PageSpeed, ExportKind::InternalAll],
            columns: &[ADDRESS, LOAD_TIME],
            predicate: Predicate::Row(check_slow_page),
        },
        Rule {
            issue_id: "title_too_long",
            sources: TITLE_SOURCES,
            columns: &[ADDRESS, TITLE],
            predicate: Predicate::Row(check_title_length),
        },
        Rule {
            issue_id: "description_too_long",
            sources: DESCRIPTION_SOURCES,
            columns: &[ADDRESS, META_DESCRIPTION],
            predicate: Predicate::Row(check_description_length),
        },
        Rule {
            issue_id: "low_word_count",
            sources: &[ExportKind::InternalHtml, ExportKind::InternalAll],
            columns: &[ADDRESS, WORD_COUNT],
            predicate: Predicate::Row(check_word_count),
        },
        Rule {
            issue_id: "missing_alt_text",
            sources: &[ExportKind::Images],
            columns: &[ADDRESS, ALT_TEXT],
            predicate: Predicate::Row(check_missing_alt_text),
        },
        Rule {
            issue_id: "multiple_h1",
            sources: H1_SOURCES,
            columns: &[ADDRESS, H1_SECOND],
            predicate: Predicate::Row(check_multiple_h1),
        },
        Rule {
            issue_id: "missing_meta_keywords",
            sources: PAGE_SOURCES,
            columns: &[ADDRESS, META_KEYWORDS],
            predicate: Predicate::Row(check_missing_meta_keywords),
        },
        Rule {
            issue_id: "excessive_outlinks",
            sources: PAGE_SOURCES,
            columns: &[ADDRESS, OUTLINKS],
            predicate: Predicate::Row(check_outlinks),
        },
        Rule {
            issue_id: "low_text_html_ratio",
            sources: PAGE_SOURCES,
            columns: &[ADDRESS, TEXT_RATIO],
            predicate: Predicate::Row(check_text_ratio),
        },
    ]
}

// ============================================================================
// Status codes
// ============================================================================

fn status_in(row: &Row<'_>, range: std::ops::RangeInclusive<u16>) -> RowOutcome {
    match row.number(&STATUS_CODE) {
        Some(Ok(code)) if code.fract() == 0.0 && code >= 0.0 && code <= f64::from(u16::MAX) => {
            let code = code as u16;
            if range.contains(&code) {
                RowOutcome::Flag(format!("Status code {}", code))
            } else {
                RowOutcome::Pass
            }
        }
        Some(Ok(_)) => RowOutcome::Unparseable(row.get(&STATUS_CODE).unwrap_or_default().to_string()),
        Some(Err(raw)) => RowOutcome::Unparseable(raw.to_string()),
        None => RowOutcome::Unparseable(String::new()),
    }
}

pub fn check_client_error(row: &Row<'_>, _: &Thresholds) -> RowOutcome {
    status_in(row, 400..=499)
}

pub fn check_server_error(row: &Row<'_>, _: &Thresholds) -> RowOutcome {
    status_in(row, 500..=599)
}

pub fn check_redirect_chain(row: &Row<'_>, t: &Thresholds) -> RowOutcome {
    match row.number(&REDIRECT_HOPS) {
        Some(Ok(hops)) if hops > f64::from(t.max_redirect_hops) => {
            RowOutcome::Flag(format!("{} redirects before the final URL", hops))
        }
        Some(Ok(_)) => RowOutcome::Pass,
        Some(Err(raw)) => RowOutcome::Unparseable(raw.to_string()),
        None => RowOutcome::Pass,
    }
}

// ============================================================================
// Titles, descriptions and headings
// ============================================================================

fn missing(row: &Row<'_>, column: &Column, detail: &str) -> RowOutcome {
    if !row.is_content_page() {
        return RowOutcome::Pass;
    }
    match row.get(column) {
        Some(_) => RowOutcome::Pass,
        None => RowOutcome::Flag(detail.to_string()),
    }
}

fn too_long(row: &Row<'_>, column: &Column, limit: usize, what: &str) -> RowOutcome {
    if !row.is_content_page() {
        return RowOutcome::Pass;
    }
    match row.get(column) {
        Some(text) => {
            let length = text.chars().count();
            if length > limit {
                RowOutcome::Flag(format!("{} is {} characters (limit {})", what, length, limit))
            } else {
                RowOutcome::Pass
            }
        }
        None => RowOutcome::Pass,
    }
}

pub fn check_missing_meta_description(row: &Row<'_>, _: &Thresholds) -> RowOutcome {
    missing(row, &META_DESCRIPTION, "No meta description")
}

pub fn check_missing_h1(row: &Row<'_>, _: &Thresholds) -> RowOutcome {
    missing(row, &H1_FIRST, "No H1 heading")
}

pub fn check_missing_meta_keywords(row: &Row<'_>, _: &Thresholds) -> RowOutcome {
    missing(row, &META_KEYWORDS, "No meta keywords")
}

pub fn check_title_length(row: &Row<'_>, t: &Thresholds) -> RowOutcome {
    too_long(row, &TITLE, t.title_max_length, "Title")
}

pub fn check_description_length(row: &Row<'_>, t: &Thresholds) -> RowOutcome {
    too_long(row, &META_DESCRIPTION, t.description_max_length, "Meta description")
}

pub fn check_multiple_h1(row: &Row<'_>, _: &Thresholds) -> RowOutcome {
    if !row.is_content_page() {
        return RowOutcome::Pass;
    }
    match row.get(&H1_SECOND) {
        Some(second) => RowOutcome::Flag(format!("Second H1: {}", second)),
        None => RowOutcome::Pass,
    }
}

pub fn check_missing_alt_text(row: &Row<'_>, _: &Thresholds) -> RowOutcome {
    match row.get(&ALT_TEXT) {
        Some(_) => RowOutcome::Pass,
        None => RowOutcome::Flag("Image has no alt text".to_string()),
    }
}

// ============================================================================
// Content and performance
// ============================================================================

pub fn check_slow_page(row: &Row<'_>, t: &Thresholds) -> RowOutcome {
    match row.number(&LOAD_TIME) {
        Some(Ok(seconds)) if seconds > t.slow_page_seconds => RowOutcome::Flag(format!(
            "Loaded in {:.2}s (limit {}s)",
            seconds, t.slow_page_seconds
        )),
        Some(Ok(_)) | None => RowOutcome::Pass,
        Some(Err(raw)) => RowOutcome::Unparseable(raw.to_string()),
    }
}

pub fn check_word_count(row: &Row<'_>, t: &Thresholds) -> RowOutcome {
    if !row.is_content_page() {
        return RowOutcome::Pass;
    }
    match row.number(&WORD_COUNT) {
        Some(Ok(words)) if words < f64::from(t.min_word_count) => RowOutcome::Flag(format!(
            "{} words (minimum {})",
            words, t.min_word_count
        )),
        Some(Ok(_)) | None => RowOutcome::Pass,
        Some(Err(raw)) => RowOutcome::Unparseable(raw.to_string()),
    }
}

pub fn check_outlinks(row: &Row<'_>, t: &Thresholds) -> RowOutcome {
    match row.number(&OUTLINKS) {
        Some(Ok(links)) if links > f64::from(t.max_outlinks) => RowOutcome::Flag(format!(
            "{} outlinks (limit {})",
            links, t.max_outlinks
        )),
        Some(Ok(_)) | None => RowOutcome::Pass,
        Some(Err(raw)) => RowOutcome::Unparseable(raw.to_string()),
    }
}

pub fn check_text_ratio(row: &Row<'_>, t: &Thresholds) -> RowOutcome {
    if !row.is_content_page() {
        return RowOutcome::Pass;
    }
    match row.number(&TEXT_RATIO) {
        Some(Ok(ratio)) if ratio < t.min_text_ratio => RowOutcome::Flag(format!(
            "Text ratio {:.1}% (minimum {}%)",
            ratio, t.min_text_ratio
        )),
        Some(Ok(_)) | None => RowOutcome::Pass,
        Some(Err(raw)) => RowOutcome::Unparseable(raw.to_string()),
    }
}

// ============================================================================
// Duplicates
// ============================================================================

/// Flag every content page whose `column` value is shared with another page.
fn find_duplicates(table: &Table, column: &Column, what: &str) -> Vec<TableHit> {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();

    for row in table.rows() {
        if row.address().is_none() || !row.is_content_page() {
            continue;
        }
        if let Some(value) = row.get(column) {
            groups.entry(value).or_default().push(row.position());
        }
    }

    let mut hits: Vec<TableHit> = groups
        .values()
        .filter(|positions| positions.len() > 1)
        .flat_map(|positions| {
            let shared = positions.len();
            positions.iter().map(move |&position| TableHit {
                position,
                detail: format!("{} shared by {} pages", what, shared),
            })
        })
        .collect();

    // HashMap order is arbitrary; report in export order
    hits.sort_by_key(|hit| hit.position);
    hits
}

pub fn find_duplicate_titles(table: &Table, _: &Thresholds) -> Vec<TableHit> {
    find_duplicates(table, &TITLE, "Title")
}

pub fn find_duplicate_content(table: &Table, _: &Thresholds) -> Vec<TableHit> {
    find_duplicates(table, &CONTENT_HASH, "Content hash")
}
