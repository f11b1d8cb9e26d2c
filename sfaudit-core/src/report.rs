// Report generation from audit findings

use crate::audit::AuditOutcome;
use crate::chart::render_chart_svg;
use crate::data::{Catalog, Category};
use crate::error::Result;
use crate::workbook::write_workbook;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Html,
    Markdown,
    Xlsx,
    Chart,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "html" => Some(ReportFormat::Html),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "xlsx" | "excel" => Some(ReportFormat::Xlsx),
            "chart" | "svg" => Some(ReportFormat::Chart),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
            ReportFormat::Markdown => "md",
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Chart => "svg",
        }
    }
}

/// Run details that do not come from the findings themselves.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub domain: String,
    pub export_dir: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// How many issues to list as highest impact
    pub top_issues: usize,
    /// Example URLs kept per issue
    pub example_limit: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_issues: 3,
            example_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub domain: String,
    pub export_dir: String,
    pub generated_at: DateTime<Utc>,
    pub pages_analyzed: usize,
    pub skipped_rows: usize,
    pub findings: Vec<FindingData>,
    pub category_counts: CategoryCounts,
    pub issues: Vec<IssueSummary>,
    pub highest_impact: Vec<IssueSummary>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingData {
    pub issue_id: String,
    pub title: String,
    pub category: Category,
    pub url: String,
    pub impact: u8,
    pub effort: u8,
    pub priority_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub recommendation: String,
}

/// All findings of one issue rolled up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSummary {
    pub issue_id: String,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub category: Category,
    pub impact: u8,
    pub effort: u8,
    pub priority_score: f64,
    pub count: usize,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl CategoryCounts {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Critical => self.critical,
            Category::High => self.high,
            Category::Medium => self.medium,
            Category::Low => self.low,
        }
    }

    fn bump(&mut self, category: Category) {
        match category {
            Category::Critical => self.critical += 1,
            Category::High => self.high += 1,
            Category::Medium => self.medium += 1,
            Category::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

impl ReportData {
    pub fn issues_in(&self, category: Category) -> impl Iterator<Item = &IssueSummary> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    pub fn findings_in(&self, category: Category) -> impl Iterator<Item = &FindingData> {
        self.findings.iter().filter(move |f| f.category == category)
    }

    fn format_date(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

pub fn gather_report_data(
    outcome: &AuditOutcome,
    catalog: &Catalog,
    meta: &ReportMeta,
    options: ReportOptions,
) -> ReportData {
    let mut category_counts = CategoryCounts::default();
    let mut issues: Vec<IssueSummary> = Vec::new();
    let mut issue_index: HashMap<&str, usize> = HashMap::new();
    let mut findings = Vec::with_capacity(outcome.findings.len());

    for finding in &outcome.findings {
        // Findings are only ever built from catalog entries
        let Some(issue) = catalog.get(finding.issue_id) else {
            continue;
        };

        category_counts.bump(finding.category);

        let idx = *issue_index.entry(finding.issue_id).or_insert_with(|| {
            issues.push(IssueSummary {
                issue_id: issue.id.to_string(),
                title: issue.title.to_string(),
                description: issue.description.to_string(),
                recommendation: issue.recommendation.to_string(),
                category: issue.category,
                impact: issue.impact,
                effort: issue.effort,
                priority_score: issue.priority_score(),
                count: 0,
                examples: Vec::new(),
            });
            issues.len() - 1
        });

        let summary = &mut issues[idx];
        summary.count += 1;
        if summary.examples.len() < options.example_limit {
            summary.examples.push(finding.url.clone());
        }

        findings.push(FindingData {
            issue_id: finding.issue_id.to_string(),
            title: issue.title.to_string(),
            category: finding.category,
            url: finding.url.clone(),
            impact: finding.impact,
            effort: finding.effort,
            priority_score: finding.priority_score,
            detail: finding.detail.clone(),
            recommendation: issue.recommendation.to_string(),
        });
    }

    let mut highest_impact = issues.clone();
    // stable: equal impact keeps report order
    highest_impact.sort_by(|a, b| b.impact.cmp(&a.impact));
    highest_impact.truncate(options.top_issues);

    ReportData {
        domain: meta.domain.clone(),
        export_dir: meta.export_dir.clone(),
        generated_at: meta.generated_at,
        pages_analyzed: outcome.pages_analyzed,
        skipped_rows: outcome.skipped_rows,
        findings,
        category_counts,
        issues,
        highest_impact,
        warnings: outcome.warnings.iter().map(|w| w.to_string()).collect(),
    }
}

// ============================================================================
// Text
// ============================================================================

const HEAVY_RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";
const LIGHT_RULE: &str = "────────────────────────────────────────────────────────────────────────────────\n";

pub fn generate_text_report(data: &ReportData) -> String {
    let mut report = String::new();

    report.push_str(HEAVY_RULE);
    report.push_str("                         TECHNICAL SEO AUDIT REPORT\n");
    report.push_str(HEAVY_RULE);
    report.push('\n');

    report.push_str(&format!("Domain:         {}\n", data.domain));
    report.push_str(&format!("Audit Date:     {}\n", data.format_date()));
    report.push_str(&format!("Exports:        {}\n", data.export_dir));
    report.push_str(&format!("Pages Analyzed: {}\n", data.pages_analyzed));
    report.push('\n');

    report.push_str(HEAVY_RULE);
    report.push_str("SUMMARY\n");
    report.push_str(HEAVY_RULE);
    report.push('\n');

    let counts = &data.category_counts;
    report.push_str(&format!("Total Findings: {}\n\n", counts.total()));

    if counts.critical > 0 {
        report.push_str(&format!("  [CRITICAL] {}  (Fix immediately)\n", counts.critical));
    }
    if counts.high > 0 {
        report.push_str(&format!("  [HIGH]     {}  (High priority)\n", counts.high));
    }
    if counts.medium > 0 {
        report.push_str(&format!("  [MEDIUM]   {}  (Should be addressed)\n", counts.medium));
    }
    if counts.low > 0 {
        report.push_str(&format!("  [LOW]      {}  (Minor issues)\n", counts.low));
    }
    report.push('\n');

    if !data.highest_impact.is_empty() {
        report.push_str("Highest impact issues:\n");
        for issue in &data.highest_impact {
            report.push_str(&format!(
                "  - {} ({} pages, impact {}/10, effort {}/10)\n",
                issue.title, issue.count, issue.impact, issue.effort
            ));
        }
        report.push('\n');
    }

    if !data.issues.is_empty() {
        report.push_str(HEAVY_RULE);
        report.push_str("ISSUES\n");
        report.push_str(HEAVY_RULE);
        report.push('\n');

        for (idx, issue) in data.issues.iter().enumerate() {
            report.push_str(&format!("[{}] {}\n", idx + 1, issue.title));
            report.push_str(&format!("Category:     {}\n", issue.category.as_str().to_uppercase()));
            report.push_str(&format!("Instances:    {}\n", issue.count));
            report.push_str(&format!(
                "Score:        impact {}/10, effort {}/10, priority {:.2}\n",
                issue.impact, issue.effort, issue.priority_score
            ));

            report.push_str("\nDescription:\n");
            report.push_str(&wrap_text(issue.description.as_str(), 80, "  "));
            report.push_str("\nRecommendation:\n");
            report.push_str(&wrap_text(issue.recommendation.as_str(), 80, "  "));
            report.push_str("\nExamples:\n");
            for example in &issue.examples {
                report.push_str(&format!("  {}\n", example));
            }
            report.push('\n');
            report.push_str(LIGHT_RULE);
            report.push('\n');
        }
    }

    if !data.warnings.is_empty() {
        report.push_str(HEAVY_RULE);
        report.push_str("WARNINGS\n");
        report.push_str(HEAVY_RULE);
        report.push('\n');
        for warning in &data.warnings {
            report.push_str(&format!("  ! {}\n", warning));
        }
        report.push('\n');
    }

    report.push_str(HEAVY_RULE);
    report.push_str("                                End of Report\n");
    report.push_str(HEAVY_RULE);
    report.push_str("\nGenerated by sfaudit from Screaming Frog crawl exports\n\n");

    report
}

// ============================================================================
// JSON
// ============================================================================

pub fn generate_json_report(data: &ReportData) -> std::result::Result<String, serde_json::Error> {
    let counts = &data.category_counts;
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "sfaudit",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": data.generated_at.to_rfc3339(),
                "format": "json"
            },
            "audit": {
                "domain": data.domain,
                "export_dir": data.export_dir,
                "date": data.generated_at.format("%Y-%m-%d").to_string(),
            },
            "summary": {
                "pages_analyzed": data.pages_analyzed,
                "skipped_rows": data.skipped_rows,
                "total_findings": counts.total(),
                "total_issues": data.issues.len(),
                "category_breakdown": {
                    "critical": counts.critical,
                    "high": counts.high,
                    "medium": counts.medium,
                    "low": counts.low
                },
                "highest_impact_issues": data.highest_impact
            },
            "issues": data.issues,
            "findings": data.findings,
            "warnings": data.warnings
        }
    });

    serde_json::to_string_pretty(&json_report)
}

// ============================================================================
// HTML
// ============================================================================

const HTML_STYLE: &str = r#"
        body { font-family: Arial, sans-serif; line-height: 1.6; margin: 0; padding: 20px; color: #333; }
        .container { max-width: 1200px; margin: 0 auto; }
        h1 { color: #2c3e50; border-bottom: 2px solid #eee; padding-bottom: 10px; }
        h2 { color: #3498db; margin-top: 30px; }
        h3 { color: #2c3e50; }
        .summary { background-color: #f8f9fa; padding: 15px; border-radius: 5px; margin: 20px 0; }
        .summary-grid { display: grid; grid-template-columns: repeat(4, 1fr); gap: 10px; }
        .summary-item { text-align: center; padding: 15px; border-radius: 5px; }
        .critical { background-color: #f8d7da; color: #721c24; }
        .high { background-color: #fff3cd; color: #856404; }
        .medium { background-color: #d1ecf1; color: #0c5460; }
        .low { background-color: #d4edda; color: #155724; }
        .issue { margin-bottom: 30px; padding: 15px; border-radius: 5px; border-left: 5px solid #ddd; }
        .issue.critical { border-left-color: #dc3545; }
        .issue.high { border-left-color: #ffc107; }
        .issue.medium { border-left-color: #17a2b8; }
        .issue.low { border-left-color: #28a745; }
        .score-bar { display: flex; margin: 10px 0; }
        .score-impact, .score-effort { height: 20px; color: white; text-align: center; line-height: 20px; }
        .score-impact { background-color: #007bff; }
        .score-effort { background-color: #28a745; }
        .examples { background-color: #f8f9fa; padding: 10px; border-radius: 5px; font-family: monospace; overflow-x: auto; }
        .warnings { background-color: #fff3cd; padding: 10px 20px; border-radius: 5px; }
        footer { margin-top: 30px; text-align: center; color: #6c757d; font-size: 0.9em; }
"#;

pub fn generate_html_report(data: &ReportData) -> String {
    let counts = &data.category_counts;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!(
        "    <title>SEO Audit Report - {}</title>\n",
        escape_html(&data.domain)
    ));
    html.push_str("    <style>");
    html.push_str(HTML_STYLE);
    html.push_str("    </style>\n</head>\n<body>\n<div class=\"container\">\n");

    html.push_str(&format!(
        "<h1>Technical SEO Audit Report: {}</h1>\n",
        escape_html(&data.domain)
    ));
    html.push_str(&format!("<p>Generated on: {}</p>\n", data.format_date()));
    html.push_str(&format!(
        "<p>Pages analyzed: {} &middot; Total findings: {}</p>\n",
        data.pages_analyzed,
        counts.total()
    ));

    html.push_str("<div class=\"summary\">\n<h2>Summary</h2>\n<div class=\"summary-grid\">\n");
    for category in Category::ALL {
        html.push_str(&format!(
            "<div class=\"summary-item {}\"><h3>{}</h3><p>{}</p></div>\n",
            category.as_str(),
            category_heading(category),
            counts.get(category)
        ));
    }
    html.push_str("</div>\n</div>\n");

    for category in Category::ALL {
        let mut issues = data.issues_in(category).peekable();
        if issues.peek().is_none() {
            continue;
        }

        html.push_str(&format!("<h2>{} Issues</h2>\n", category_heading(category)));
        for issue in issues {
            html.push_str(&format!("<div class=\"issue {}\">\n", category.as_str()));
            html.push_str(&format!(
                "<h3>{} ({} instances)</h3>\n",
                escape_html(&issue.title),
                issue.count
            ));
            html.push_str(&format!("<p>{}</p>\n", escape_html(&issue.description)));
            html.push_str(&format!(
                "<div class=\"score-bar\"><div class=\"score-impact\" style=\"width: {}%;\">Impact: {}/10</div></div>\n",
                u32::from(issue.impact) * 10,
                issue.impact
            ));
            html.push_str(&format!(
                "<div class=\"score-bar\"><div class=\"score-effort\" style=\"width: {}%;\">Effort: {}/10</div></div>\n",
                u32::from(issue.effort) * 10,
                issue.effort
            ));
            html.push_str("<h4>Recommendation:</h4>\n");
            html.push_str(&format!("<p>{}</p>\n", escape_html(&issue.recommendation)));
            html.push_str("<h4>Examples:</h4>\n<div class=\"examples\"><code>");
            let examples: Vec<String> = issue.examples.iter().map(|e| escape_html(e)).collect();
            html.push_str(&examples.join("<br>"));
            html.push_str("</code></div>\n</div>\n");
        }
    }

    if !data.warnings.is_empty() {
        html.push_str("<h2>Warnings</h2>\n<div class=\"warnings\"><ul>\n");
        for warning in &data.warnings {
            html.push_str(&format!("<li>{}</li>\n", escape_html(warning)));
        }
        html.push_str("</ul></div>\n");
    }

    html.push_str("<footer><p>This report was automatically generated by sfaudit</p></footer>\n");
    html.push_str("</div>\n</body>\n</html>\n");

    html
}

fn category_heading(category: Category) -> &'static str {
    match category {
        Category::Critical => "Critical",
        Category::High => "High Priority",
        Category::Medium => "Medium Priority",
        Category::Low => "Low Priority",
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// ============================================================================
// Markdown and CSV
// ============================================================================

pub fn generate_markdown_report(data: &ReportData) -> String {
    let counts = &data.category_counts;
    let mut md = String::new();

    md.push_str(&format!("# Technical SEO Audit: {}\n\n", data.domain));
    md.push_str(&format!("- **Audit date:** {}\n", data.format_date()));
    md.push_str(&format!("- **Pages analyzed:** {}\n", data.pages_analyzed));
    md.push_str(&format!("- **Total findings:** {}\n\n", counts.total()));

    md.push_str("## Summary\n\n");
    md.push_str("| Category | Findings |\n|---|---|\n");
    for category in Category::ALL {
        md.push_str(&format!("| {} | {} |\n", category.label(), counts.get(category)));
    }
    md.push('\n');

    if !data.issues.is_empty() {
        md.push_str("## Issues\n\n");
        md.push_str("| Issue | Category | Instances | Impact | Effort | Priority |\n");
        md.push_str("|---|---|---|---|---|---|\n");
        for issue in &data.issues {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {:.2} |\n",
                escape_markdown_cell(&issue.title),
                issue.category.label(),
                issue.count,
                issue.impact,
                issue.effort,
                issue.priority_score
            ));
        }
        md.push('\n');

        for issue in &data.issues {
            md.push_str(&format!("### {}\n\n", issue.title));
            md.push_str(&format!("{}\n\n", issue.description));
            md.push_str(&format!("**Recommendation:** {}\n\n", issue.recommendation));
            for example in &issue.examples {
                md.push_str(&format!("- {}\n", code_span(example)));
            }
            md.push('\n');
        }
    }

    if !data.warnings.is_empty() {
        md.push_str("## Warnings\n\n");
        for warning in &data.warnings {
            md.push_str(&format!("- {}\n", warning));
        }
        md.push('\n');
    }

    md
}

fn escape_markdown_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('`', "\\`")
}

/// Inline code whose fence is longer than any backtick run in `text`.
fn code_span(text: &str) -> String {
    let longest_run = text
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    if longest_run == 0 {
        return format!("`{}`", text);
    }
    let fence = "`".repeat(longest_run + 1);
    format!("{} {} {}", fence, text, fence)
}

pub fn generate_csv_report(data: &ReportData) -> std::result::Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Issue Type",
        "Category",
        "URL",
        "Impact (1-10)",
        "Effort (1-10)",
        "Priority Score",
        "Detail",
        "Recommendation",
    ])?;

    for finding in &data.findings {
        let impact = finding.impact.to_string();
        let effort = finding.effort.to_string();
        let priority = format!("{:.2}", finding.priority_score);
        writer.write_record([
            finding.title.as_str(),
            finding.category.as_str(),
            finding.url.as_str(),
            impact.as_str(),
            effort.as_str(),
            priority.as_str(),
            finding.detail.as_deref().unwrap_or(""),
            finding.recommendation.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ============================================================================
// Writing
// ============================================================================

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// File name for one rendered format, stamped with the report time.
pub fn report_file_name(data: &ReportData, format: ReportFormat) -> String {
    let stamp = data.generated_at.format("%Y%m%d_%H%M%S");
    match format {
        ReportFormat::Chart => format!("seo_audit_charts_{}.svg", stamp),
        ReportFormat::Xlsx => format!("seo_audit_{}_{}.xlsx", sanitize_file_part(&data.domain), stamp),
        other => format!("seo_audit_report_{}.{}", stamp, other.extension()),
    }
}

fn sanitize_file_part(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

/// Render every requested format into `out_dir` and return the written paths.
///
/// Formats are de-duplicated; the returned paths follow the requested order.
pub fn write_reports(data: &ReportData, formats: &[ReportFormat], out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;

    let mut written = Vec::new();
    let mut done: Vec<ReportFormat> = Vec::new();

    for &format in formats {
        if done.contains(&format) {
            continue;
        }
        done.push(format);

        let path = out_dir.join(report_file_name(data, format));
        match format {
            ReportFormat::Text => save_report(&generate_text_report(data), &path)?,
            ReportFormat::Json => save_report(&generate_json_report(data)?, &path)?,
            ReportFormat::Csv => save_report(&generate_csv_report(data)?, &path)?,
            ReportFormat::Html => save_report(&generate_html_report(data), &path)?,
            ReportFormat::Markdown => save_report(&generate_markdown_report(data), &path)?,
            ReportFormat::Chart => save_report(&render_chart_svg(data), &path)?,
            ReportFormat::Xlsx => write_workbook(data, &path)?,
        }

        info!("Wrote {} report: {}", format.extension(), path.display());
        written.push(path);
    }

    Ok(written)
}

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.len() + word.len() + 1 > width - indent.len() && !current_line.is_empty() {
            result.push_str(indent);
            result.push_str(&current_line);
            result.push('\n');
            current_line.clear();
        }

        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        result.push_str(indent);
        result.push_str(&current_line);
        result.push('\n');
    }

    result
}
