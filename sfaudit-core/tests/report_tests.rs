// Tests for report aggregation, rendering and writing

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use chrono::{TimeZone, Utc};
use sfaudit_core::audit::{AuditOutcome, AuditWarning};
use sfaudit_core::chart::render_chart_svg;
use sfaudit_core::data::{Catalog, Category, Finding};
use sfaudit_core::report::*;
use sfaudit_core::workbook::write_workbook;
use std::fs::File;
use std::io::BufReader;
use tempfile::TempDir;

fn meta() -> ReportMeta {
    ReportMeta {
        domain: "example.com".to_string(),
        export_dir: "exports".to_string(),
        generated_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap(),
    }
}

fn finding(catalog: &Catalog, id: &str, url: &str) -> Finding {
    Finding::new(catalog.get(id).unwrap(), url, Some(format!("detail for {}", url)))
}

fn sample_outcome(catalog: &Catalog) -> AuditOutcome {
    let mut findings = vec![
        finding(catalog, "broken_links", "https://example.com/a"),
        finding(catalog, "broken_links", "https://example.com/b"),
        finding(catalog, "missing_h1", "https://example.com/c"),
        finding(catalog, "title_too_long", "https://example.com/<script>"),
        finding(catalog, "missing_meta_keywords", "https://example.com/d"),
    ];
    sfaudit_core::sort_findings(&mut findings, catalog);

    AuditOutcome {
        findings,
        warnings: vec![AuditWarning::MissingColumn {
            issue_id: "slow_pages".to_string(),
            export: "Internal:All".to_string(),
            column: "Response Time".to_string(),
        }],
        pages_analyzed: 12,
        skipped_rows: 1,
        rules_evaluated: 15,
    }
}

fn sample_data() -> ReportData {
    let catalog = Catalog::standard();
    gather_report_data(&sample_outcome(&catalog), &catalog, &meta(), ReportOptions::default())
}

fn empty_data() -> ReportData {
    let catalog = Catalog::standard();
    gather_report_data(&AuditOutcome::default(), &catalog, &meta(), ReportOptions::default())
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("TXT"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("csv"), Some(ReportFormat::Csv));
    assert_eq!(ReportFormat::from_str("html"), Some(ReportFormat::Html));
    assert_eq!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown));
    assert_eq!(ReportFormat::from_str("excel"), Some(ReportFormat::Xlsx));
    assert_eq!(ReportFormat::from_str("svg"), Some(ReportFormat::Chart));
    assert_eq!(ReportFormat::from_str("pdf"), None);
}

#[test]
fn test_report_file_names() {
    let data = empty_data();
    assert_eq!(
        report_file_name(&data, ReportFormat::Json),
        "seo_audit_report_20240309_143005.json"
    );
    assert_eq!(
        report_file_name(&data, ReportFormat::Chart),
        "seo_audit_charts_20240309_143005.svg"
    );
    assert_eq!(
        report_file_name(&data, ReportFormat::Xlsx),
        "seo_audit_example.com_20240309_143005.xlsx"
    );
}

// ============================================================================
// Aggregation Tests
// ============================================================================

#[test]
fn test_gather_counts_findings_per_category() {
    let data = sample_data();

    assert_eq!(data.category_counts.critical, 2);
    assert_eq!(data.category_counts.high, 1);
    assert_eq!(data.category_counts.medium, 1);
    assert_eq!(data.category_counts.low, 1);
    assert_eq!(data.category_counts.total(), data.findings.len());
    assert_eq!(data.pages_analyzed, 12);
    assert_eq!(data.skipped_rows, 1);
}

#[test]
fn test_gather_rolls_up_issues_in_finding_order() {
    let data = sample_data();
    let ids: Vec<&str> = data.issues.iter().map(|i| i.issue_id.as_str()).collect();

    assert_eq!(
        ids,
        vec!["broken_links", "missing_h1", "title_too_long", "missing_meta_keywords"]
    );
    assert_eq!(data.issues[0].count, 2);
    assert_eq!(
        data.issues[0].examples,
        vec!["https://example.com/a", "https://example.com/b"]
    );
}

#[test]
fn test_gather_limits_examples() {
    let catalog = Catalog::standard();
    let mut outcome = AuditOutcome::default();
    for i in 0..10 {
        outcome
            .findings
            .push(finding(&catalog, "broken_links", &format!("https://example.com/{}", i)));
    }
    let options = ReportOptions {
        top_issues: 3,
        example_limit: 2,
    };
    let data = gather_report_data(&outcome, &catalog, &meta(), options);

    assert_eq!(data.issues[0].count, 10);
    assert_eq!(data.issues[0].examples.len(), 2);
    assert_eq!(data.findings.len(), 10);
}

#[test]
fn test_gather_highest_impact() {
    let data = sample_data();
    let ids: Vec<&str> = data
        .highest_impact
        .iter()
        .map(|i| i.issue_id.as_str())
        .collect();

    // impact 10, 7, 5
    assert_eq!(ids, vec!["broken_links", "missing_h1", "title_too_long"]);
}

#[test]
fn test_gather_carries_warnings_as_text() {
    let data = sample_data();
    assert_eq!(data.warnings.len(), 1);
    assert!(data.warnings[0].contains("slow_pages"));
    assert!(data.warnings[0].contains("Response Time"));
}

#[test]
fn test_findings_in_category() {
    let data = sample_data();
    assert_eq!(data.findings_in(Category::Critical).count(), 2);
    assert_eq!(data.issues_in(Category::Critical).count(), 1);
    assert_eq!(data.findings_in(Category::Low).count(), 1);
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_sections() {
    let report = generate_text_report(&sample_data());

    assert!(report.contains("TECHNICAL SEO AUDIT REPORT"));
    assert!(report.contains("Domain:         example.com"));
    assert!(report.contains("Pages Analyzed: 12"));
    assert!(report.contains("Total Findings: 5"));
    assert!(report.contains("[CRITICAL] 2"));
    assert!(report.contains("Highest impact issues:"));
    assert!(report.contains("[1] Broken Links (4xx)"));
    assert!(report.contains("https://example.com/a"));
    assert!(report.contains("WARNINGS"));
}

#[test]
fn test_text_report_empty() {
    let report = generate_text_report(&empty_data());

    assert!(report.contains("Total Findings: 0"));
    assert!(!report.contains("[CRITICAL]"));
    assert!(!report.contains("ISSUES\n"));
    assert!(!report.contains("WARNINGS"));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let json = generate_json_report(&sample_data()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let report = &value["report"];

    assert_eq!(report["metadata"]["generator"], "sfaudit");
    assert_eq!(report["audit"]["domain"], "example.com");
    assert_eq!(report["audit"]["date"], "2024-03-09");
    assert_eq!(report["summary"]["total_findings"], 5);
    assert_eq!(report["summary"]["category_breakdown"]["critical"], 2);
    assert_eq!(report["issues"].as_array().unwrap().len(), 4);
    assert_eq!(report["findings"].as_array().unwrap().len(), 5);
    assert_eq!(report["findings"][0]["category"], "critical");
    assert_eq!(report["findings"][0]["priority_score"], 2.0);
    assert_eq!(report["warnings"].as_array().unwrap().len(), 1);
}

// ============================================================================
// HTML Report Tests
// ============================================================================

#[test]
fn test_html_report_content() {
    let html = generate_html_report(&sample_data());

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>SEO Audit Report - example.com</title>"));
    assert!(html.contains("summary-item critical"));
    assert!(html.contains("<h2>Critical Issues</h2>"));
    assert!(html.contains("<h2>High Priority Issues</h2>"));
    assert!(html.contains("Broken Links (4xx) (2 instances)"));
    assert!(html.contains("<h2>Warnings</h2>"));
}

#[test]
fn test_html_report_escapes_urls() {
    let html = generate_html_report(&sample_data());

    assert!(html.contains("https://example.com/&lt;script&gt;"));
    assert!(!html.contains("/<script>"));
}

#[test]
fn test_html_report_skips_empty_categories() {
    let html = generate_html_report(&empty_data());

    assert!(!html.contains("<h2>Critical Issues</h2>"));
    assert!(!html.contains("<h2>Warnings</h2>"));
}

#[test]
fn test_escape_html() {
    assert_eq!(
        escape_html("<a href=\"x\">Tom & Jerry's</a>"),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
    );
}

// ============================================================================
// Markdown and CSV Report Tests
// ============================================================================

#[test]
fn test_markdown_report() {
    let md = generate_markdown_report(&sample_data());

    assert!(md.starts_with("# Technical SEO Audit: example.com"));
    assert!(md.contains("| Critical | 2 |"));
    assert!(md.contains("| Broken Links (4xx) | Critical | 2 | 10 | 5 | 2.00 |"));
    assert!(md.contains("- `https://example.com/a`"));
    assert!(md.contains("## Warnings"));
}

#[test]
fn test_markdown_report_backticks_in_urls_and_titles() {
    let mut data = sample_data();
    data.issues[0].examples[0] = "https://example.com/a`b".to_string();
    data.issues[0].title = "Broken `Links` | 4xx".to_string();

    let md = generate_markdown_report(&data);

    assert!(md.contains("- `` https://example.com/a`b ``\n"), "{}", md);
    assert!(md.contains("| Broken \\`Links\\` \\| 4xx | Critical |"), "{}", md);
}

#[test]
fn test_csv_report_rows() {
    let csv = generate_csv_report(&sample_data()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(
        lines[0],
        "Issue Type,Category,URL,Impact (1-10),Effort (1-10),Priority Score,Detail,Recommendation"
    );
    assert_eq!(lines.len(), 6);
    assert!(lines[1].starts_with("Broken Links (4xx),critical,https://example.com/a,10,5,2.00,"));
}

#[test]
fn test_csv_report_quotes_commas() {
    let csv = generate_csv_report(&sample_data()).unwrap();
    // recommendations contain commas and must stay one field
    let mut reader = csv::ReaderBuilder::new().from_reader(csv.as_bytes());
    for record in reader.records() {
        assert_eq!(record.unwrap().len(), 8);
    }
}

#[test]
fn test_csv_report_detail_with_quotes_and_newlines() {
    let mut data = sample_data();
    let detail = "Title \"Home, sweet home\"\nspans two lines";
    data.findings[0].detail = Some(detail.to_string());

    let csv = generate_csv_report(&data).unwrap();
    let mut reader = csv::ReaderBuilder::new().from_reader(csv.as_bytes());
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

    assert_eq!(records.len(), 5);
    assert_eq!(&records[0][2], "https://example.com/a");
    assert_eq!(&records[0][6], detail);
    assert_eq!(&records[1][6], "detail for https://example.com/b");
}

// ============================================================================
// Chart Tests
// ============================================================================

#[test]
fn test_chart_has_category_bars() {
    let svg = render_chart_svg(&sample_data());

    assert!(svg.starts_with("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    for category in Category::ALL {
        assert!(svg.contains(&format!("class=\"bar {}\"", category.as_str())));
    }
    assert!(svg.contains("Top Issues by Impact"));
    assert!(svg.contains("Broken Links (4xx)"));
}

#[test]
fn test_chart_without_findings() {
    let svg = render_chart_svg(&empty_data());
    assert!(svg.contains("No issues found"));
}

// ============================================================================
// Workbook Tests
// ============================================================================

fn read_sheet(workbook: &mut Xlsx<BufReader<File>>, name: &str) -> Range<Data> {
    workbook.worksheet_range(name).unwrap()
}

fn text(range: &Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        other => panic!("expected text at ({}, {}), got {:?}", row, col, other),
    }
}

fn number(range: &Range<Data>, row: u32, col: u32) -> f64 {
    match range.get_value((row, col)) {
        Some(Data::Float(f)) => *f,
        other => panic!("expected number at ({}, {}), got {:?}", row, col, other),
    }
}

#[test]
fn test_workbook_sheets_match_report_counts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("audit.xlsx");
    let data = sample_data();

    write_workbook(&data, &path).unwrap();
    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();

    assert_eq!(
        workbook.sheet_names(),
        vec!["Summary", "Critical", "High", "Medium", "Low", "Warnings"]
    );

    let summary = read_sheet(&mut workbook, "Summary");
    assert_eq!(text(&summary, 0, 0), "Metric");
    assert_eq!(text(&summary, 1, 1), "example.com");
    assert_eq!(text(&summary, 2, 1), "2024-03-09");

    let counts = &data.category_counts;
    let expected = [
        ("Pages Analyzed", 12),
        ("Total Findings", counts.total()),
        ("Critical Issues", counts.critical),
        ("High Priority Issues", counts.high),
        ("Medium Priority Issues", counts.medium),
        ("Low Priority Issues", counts.low),
    ];
    for (i, (metric, value)) in expected.iter().enumerate() {
        let row = i as u32 + 3;
        assert_eq!(text(&summary, row, 0), *metric);
        assert_eq!(number(&summary, row, 1), *value as f64, "{}", metric);
    }
    assert_eq!(counts.total(), 5);

    let critical = read_sheet(&mut workbook, "Critical");
    let header: Vec<String> = (0..7).map(|col| text(&critical, 0, col)).collect();
    assert_eq!(
        header,
        vec![
            "Issue Type",
            "URL",
            "Impact (1-10)",
            "Effort (1-10)",
            "Priority Score",
            "Detail",
            "Recommendation"
        ]
    );
    assert_eq!(critical.rows().count(), 1 + counts.critical);
    assert_eq!(text(&critical, 1, 1), "https://example.com/a");
    assert_eq!(number(&critical, 1, 2), 10.0);
    assert_eq!(number(&critical, 1, 4), 2.0);

    for (name, count) in [("High", counts.high), ("Medium", counts.medium), ("Low", counts.low)] {
        assert_eq!(read_sheet(&mut workbook, name).rows().count(), 1 + count, "{}", name);
    }

    let warnings = read_sheet(&mut workbook, "Warnings");
    assert_eq!(text(&warnings, 0, 0), "Warning");
    assert_eq!(text(&warnings, 1, 0), data.warnings[0]);
}

#[test]
fn test_workbook_without_findings_has_summary_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.xlsx");

    write_workbook(&empty_data(), &path).unwrap();
    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();

    assert_eq!(workbook.sheet_names(), vec!["Summary"]);
    let summary = read_sheet(&mut workbook, "Summary");
    assert_eq!(number(&summary, 4, 1), 0.0);
}

// ============================================================================
// Writer Tests
// ============================================================================

#[test]
fn test_write_reports_all_formats() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("reports");
    let data = sample_data();

    let formats = [
        ReportFormat::Text,
        ReportFormat::Json,
        ReportFormat::Csv,
        ReportFormat::Html,
        ReportFormat::Markdown,
        ReportFormat::Xlsx,
        ReportFormat::Chart,
    ];
    let written = write_reports(&data, &formats, &out).unwrap();

    assert_eq!(written.len(), 7);
    for path in &written {
        assert!(path.exists(), "{} missing", path.display());
        assert!(std::fs::metadata(path).unwrap().len() > 0);
    }
    assert!(written[5].extension().unwrap() == "xlsx");
}

#[test]
fn test_write_reports_dedups_formats() {
    let dir = TempDir::new().unwrap();
    let data = empty_data();

    let written = write_reports(
        &data,
        &[ReportFormat::Json, ReportFormat::Json, ReportFormat::Html],
        dir.path(),
    )
    .unwrap();

    assert_eq!(written.len(), 2);
}

#[test]
fn test_save_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.txt");

    save_report("hello", &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
}
