//! sfaudit core: the issue catalog, rule predicates, the detector/scorer and
//! the report renderers.

pub mod audit;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod rules;
pub mod workbook;

pub use audit::{AuditOutcome, AuditWarning, run_audit, run_audit_with_rules, sort_findings};
pub use config::{AuditConfig, Thresholds, load_config};
pub use data::{Catalog, Category, Finding, IssueDefinition};
pub use error::{AuditError, CatalogError, ConfigError, Result};
pub use report::{ReportData, ReportFormat, ReportMeta, ReportOptions, gather_report_data, write_reports};
