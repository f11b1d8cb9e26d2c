//! Issue detection and scoring.
//!
//! Applies rule predicates to the loaded exports and turns every flagged
//! (issue, page) pair into a [`Finding`] scored from the [`Catalog`].

use crate::config::Thresholds;
use crate::data::{Catalog, Finding};
use crate::rules::{INLINK_DESTINATION, INLINK_SOURCE, Predicate, RowOutcome, Rule, standard_rules};
use serde::Serialize;
use sfaudit_exports::{ExportKind, ExportSet, Table};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info, warn};

/// Something that kept a rule, or part of its input, from being evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditWarning {
    /// None of the exports the rule reads were loaded.
    MissingExport {
        issue_id: String,
        exports: Vec<String>,
    },
    MissingColumn {
        issue_id: String,
        export: String,
        column: String,
    },
    UnknownIssue {
        issue_id: String,
    },
    /// Rows a rule's predicate could not read a value from.
    MalformedRows {
        issue_id: String,
        export: String,
        rows: usize,
    },
    /// Rows with a blank `Address`, counted once per export.
    MissingAddress {
        export: String,
        rows: usize,
    },
    /// Carried over from the loader.
    UnreadableExport {
        message: String,
    },
}

impl fmt::Display for AuditWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditWarning::MissingExport { issue_id, exports } => write!(
                f,
                "{}: skipped, no {} export loaded",
                issue_id,
                exports.join(" / ")
            ),
            AuditWarning::MissingColumn {
                issue_id,
                export,
                column,
            } => write!(
                f,
                "{}: skipped, {} export has no '{}' column",
                issue_id, export, column
            ),
            AuditWarning::UnknownIssue { issue_id } => {
                write!(f, "{}: skipped, not in the issue catalog", issue_id)
            }
            AuditWarning::MalformedRows {
                issue_id,
                export,
                rows,
            } => write!(
                f,
                "{}: ignored {} row(s) in {} with unusable values",
                issue_id, rows, export
            ),
            AuditWarning::MissingAddress { export, rows } => {
                write!(f, "{}: ignored {} row(s) without an address", export, rows)
            }
            AuditWarning::UnreadableExport { message } => f.write_str(message),
        }
    }
}

/// Issues whose findings list the pages linking to them.
const REFERRED_ISSUES: &[&str] = &["broken_links", "server_errors"];
const REFERRER_LIMIT: usize = 3;

/// Everything one audit run produced.
#[derive(Debug, Clone, Default)]
pub struct AuditOutcome {
    /// Sorted with [`sort_findings`].
    pub findings: Vec<Finding>,
    pub warnings: Vec<AuditWarning>,
    /// Distinct addresses across the tables the rules read.
    pub pages_analyzed: usize,
    /// Rows without an address (once per export) plus rows each rule
    /// could not read a value from.
    pub skipped_rows: usize,
    /// Rules that actually ran.
    pub rules_evaluated: usize,
}

/// Run the standard rule set.
pub fn run_audit(exports: &ExportSet, catalog: &Catalog, thresholds: &Thresholds) -> AuditOutcome {
    run_audit_with_rules(exports, catalog, thresholds, &standard_rules())
}

pub fn run_audit_with_rules(
    exports: &ExportSet,
    catalog: &Catalog,
    thresholds: &Thresholds,
    rules: &[Rule],
) -> AuditOutcome {
    let mut outcome = AuditOutcome::default();
    let mut addresses: HashSet<&str> = HashSet::new();
    let mut scanned: HashSet<ExportKind> = HashSet::new();

    for message in exports.warnings() {
        outcome.warnings.push(AuditWarning::UnreadableExport {
            message: message.clone(),
        });
    }

    for rule in rules {
        let Some(issue) = catalog.get(rule.issue_id) else {
            warn!("Rule {} has no catalog entry, skipping", rule.issue_id);
            outcome.warnings.push(AuditWarning::UnknownIssue {
                issue_id: rule.issue_id.to_string(),
            });
            continue;
        };

        let Some((kind, table)) = pick_source(exports, rule.sources) else {
            warn!("Rule {} skipped: no source export loaded", rule.issue_id);
            outcome.warnings.push(AuditWarning::MissingExport {
                issue_id: rule.issue_id.to_string(),
                exports: rule.sources.iter().map(|k| k.name().to_string()).collect(),
            });
            continue;
        };

        if let Some(column) = rule.columns.iter().find(|c| !table.has_column(c)) {
            warn!(
                "Rule {} skipped: {} has no '{}' column",
                rule.issue_id,
                kind,
                column.name()
            );
            outcome.warnings.push(AuditWarning::MissingColumn {
                issue_id: rule.issue_id.to_string(),
                export: kind.name().to_string(),
                column: column.name().to_string(),
            });
            continue;
        }

        outcome.rules_evaluated += 1;
        if scanned.insert(kind) {
            count_missing_addresses(kind, table, &mut outcome);
        }
        let mut malformed = 0;
        let before = outcome.findings.len();

        match rule.predicate {
            Predicate::Row(check) => {
                for row in table.rows() {
                    let Some(url) = row.address() else {
                        continue;
                    };
                    addresses.insert(url);

                    match check(&row, thresholds) {
                        RowOutcome::Pass => {}
                        RowOutcome::Flag(detail) => {
                            outcome.findings.push(Finding::new(issue, url, Some(detail)));
                        }
                        RowOutcome::Unparseable(raw) => {
                            debug!("{}: row {} unparseable value '{}'", rule.issue_id, row.position(), raw);
                            malformed += 1;
                        }
                    }
                }
            }
            Predicate::Table(check) => {
                addresses.extend(table.rows().filter_map(|row| row.address()));
                for hit in check(table, thresholds) {
                    let Some(url) = table.row(hit.position).and_then(|r| r.address()) else {
                        continue;
                    };
                    outcome.findings.push(Finding::new(issue, url, Some(hit.detail)));
                }
            }
        }

        if malformed > 0 {
            warn!("{}: ignored {} malformed row(s) in {}", rule.issue_id, malformed, kind);
            outcome.skipped_rows += malformed;
            outcome.warnings.push(AuditWarning::MalformedRows {
                issue_id: rule.issue_id.to_string(),
                export: kind.name().to_string(),
                rows: malformed,
            });
        }

        debug!(
            "{}: {} finding(s) from {}",
            rule.issue_id,
            outcome.findings.len() - before,
            kind
        );
    }

    annotate_referrers(&mut outcome.findings, exports);
    sort_findings(&mut outcome.findings, catalog);
    outcome.pages_analyzed = addresses.len();

    info!(
        "Audit complete: {} rule(s) evaluated, {} finding(s), {} warning(s)",
        outcome.rules_evaluated,
        outcome.findings.len(),
        outcome.warnings.len()
    );

    outcome
}

fn count_missing_addresses(kind: ExportKind, table: &Table, outcome: &mut AuditOutcome) {
    let rows = table.rows().filter(|row| row.address().is_none()).count();
    if rows == 0 {
        return;
    }
    warn!("{}: ignored {} row(s) without an address", kind, rows);
    outcome.skipped_rows += rows;
    outcome.warnings.push(AuditWarning::MissingAddress {
        export: kind.name().to_string(),
        rows,
    });
}

/// Append the pages linking to each broken or failing URL, taken from the
/// All Inlinks export when it was loaded.
fn annotate_referrers(findings: &mut [Finding], exports: &ExportSet) {
    let Some(inlinks) = exports.get(ExportKind::AllInlinks) else {
        return;
    };
    if !inlinks.has_column(&INLINK_SOURCE) || !inlinks.has_column(&INLINK_DESTINATION) {
        warn!("All Inlinks export has no Source/Destination columns, not listing referrers");
        return;
    }

    let mut referrers: HashMap<&str, Vec<&str>> = HashMap::new();
    for row in inlinks.rows() {
        let (Some(source), Some(destination)) = (row.get(&INLINK_SOURCE), row.get(&INLINK_DESTINATION))
        else {
            continue;
        };
        let sources = referrers.entry(destination).or_default();
        if !sources.contains(&source) {
            sources.push(source);
        }
    }

    for finding in findings
        .iter_mut()
        .filter(|f| REFERRED_ISSUES.contains(&f.issue_id))
    {
        let Some(sources) = referrers.get(finding.url.as_str()) else {
            continue;
        };
        let mut note = format!(
            "linked from {} page(s): {}",
            sources.len(),
            sources.iter().take(REFERRER_LIMIT).copied().collect::<Vec<_>>().join(", ")
        );
        if sources.len() > REFERRER_LIMIT {
            note.push_str(&format!(" and {} more", sources.len() - REFERRER_LIMIT));
        }
        finding.detail = Some(match finding.detail.take() {
            Some(detail) => format!("{}; {}", detail, note),
            None => note,
        });
    }
}

fn pick_source<'a>(exports: &'a ExportSet, sources: &[ExportKind]) -> Option<(ExportKind, &'a Table)> {
    sources
        .iter()
        .find_map(|&kind| exports.get(kind).map(|table| (kind, table)))
}

/// Category rank desc, impact desc, effort asc, then catalog order.
///
/// The sort is stable, so findings of the same issue keep the order they
/// were detected in (export row order).
pub fn sort_findings(findings: &mut [Finding], catalog: &Catalog) {
    findings.sort_by(|a, b| compare_findings(a, b, catalog));
}

pub fn compare_findings(a: &Finding, b: &Finding, catalog: &Catalog) -> Ordering {
    b.category
        .rank()
        .cmp(&a.category.rank())
        .then_with(|| b.impact.cmp(&a.impact))
        .then_with(|| a.effort.cmp(&b.effort))
        .then_with(|| {
            let pa = catalog.position(a.issue_id).unwrap_or(usize::MAX);
            let pb = catalog.position(b.issue_id).unwrap_or(usize::MAX);
            pa.cmp(&pb)
        })
}
