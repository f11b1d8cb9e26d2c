use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::ArgMatches;
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use sfaudit_core::config::DEFAULT_CONFIG;
use sfaudit_core::report::ReportData;
use sfaudit_core::{
    AuditConfig, AuditOutcome, Catalog, Category, ReportFormat, ReportMeta, ReportOptions,
    gather_report_data, load_config, run_audit, write_reports,
};
use sfaudit_exports::{ExportKind, ExportSet, load_exports};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use url::Url;

pub const CONFIG_FILE_NAME: &str = "sfaudit.toml";

/// Everything `sfaudit audit` was asked to do, with CLI values already parsed.
#[derive(Debug, Clone, Default)]
pub struct AuditRequest {
    pub exports: PathBuf,
    pub domain: Option<String>,
    pub output: Option<PathBuf>,
    /// Empty means the formats from the config file.
    pub formats: Vec<ReportFormat>,
    pub config: Option<PathBuf>,
    pub top: Option<usize>,
}

/// Result of a finished audit run.
#[derive(Debug)]
pub struct AuditRun {
    pub data: ReportData,
    pub written: Vec<PathBuf>,
}

pub fn print_banner() {
    println!(
        "{} {}",
        "sfaudit".bright_cyan().bold(),
        format!("v{} - technical SEO audits from crawl exports", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!();
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn category_badge(category: Category) -> ColoredString {
    let tag = format!("{:<12}", format!("[{}]", category.as_str().to_uppercase()));
    match category {
        Category::Critical => tag.red().bold(),
        Category::High => tag.yellow().bold(),
        Category::Medium => tag.cyan(),
        Category::Low => tag.green(),
    }
}

// ============================================================================
// init
// ============================================================================

/// Write the default configuration into `dir`, refusing to overwrite an
/// existing file unless `force` is set.
pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        bail!(
            "{} already exists, use --force to overwrite it",
            config_path.display()
        );
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    info!("Wrote default config to {}", config_path.display());
    Ok(config_path)
}

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    let path = args
        .get_one::<String>("PATH")
        .context("missing config directory")?;
    let force = args.get_flag("force");
    let dir = expand(path);

    print_divider();
    println!("{}", "  SFAUDIT INITIALIZATION".bright_white().bold());
    print_divider();
    println!();
    println!(
        "{} Target: {}",
        "→".blue(),
        dir.display().to_string().bright_white()
    );
    if force {
        println!("{} Overwriting any existing config (force mode)", "→".yellow().bold());
    }

    let config_path = init_config(&dir, force)?;

    println!(
        "{} Config written: {}",
        "✓".green().bold(),
        config_path.display().to_string().bright_white()
    );
    println!(
        "{} Pass it to an audit with {}",
        "ℹ".blue(),
        format!("--config {}", config_path.display()).cyan()
    );
    println!();
    Ok(())
}

// ============================================================================
// audit
// ============================================================================

/// Resolve format names given on the command line.
pub fn parse_formats(names: &[String]) -> Result<Vec<ReportFormat>> {
    names
        .iter()
        .map(|name| {
            ReportFormat::from_str(name).with_context(|| format!("Unknown report format '{}'", name))
        })
        .collect()
}

/// Host of the first finding, else of the first page in the exports.
pub fn infer_domain(outcome: &AuditOutcome, exports: &ExportSet) -> String {
    let from_findings = outcome.findings.iter().map(|f| f.url.as_str());
    let from_pages = ExportKind::ALL
        .iter()
        .filter_map(|kind| exports.get(*kind))
        .flat_map(|table| table.rows().filter_map(|row| row.address()));

    from_findings
        .chain(from_pages)
        .find_map(host_of)
        .unwrap_or_else(|| "unknown".to_string())
}

fn host_of(address: &str) -> Option<String> {
    Url::parse(address)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}

fn spinner(quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Load the exports, run every rule and write the requested reports.
pub fn run_audit_request(request: &AuditRequest, quiet: bool) -> Result<AuditRun> {
    let config = match &request.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AuditConfig::default(),
    };

    let formats = if request.formats.is_empty() {
        config.report.report_formats()
    } else {
        request.formats.clone()
    };
    let out_dir = request
        .output
        .clone()
        .unwrap_or_else(|| expand(&config.report.output_dir));
    let options = ReportOptions {
        top_issues: request.top.unwrap_or(config.report.top_issues),
        example_limit: config.report.example_limit,
    };

    let progress = spinner(quiet)?;

    progress.set_message(format!("Loading exports from {}", request.exports.display()));
    let exports = load_exports(&request.exports)
        .with_context(|| format!("Failed to read exports from {}", request.exports.display()))?;

    progress.set_message(format!("Analysing {} export(s)", exports.len()));
    let catalog = Catalog::standard();
    let outcome = run_audit(&exports, &catalog, &config.thresholds);

    let domain = request
        .domain
        .clone()
        .unwrap_or_else(|| infer_domain(&outcome, &exports));
    let meta = ReportMeta {
        domain,
        export_dir: request.exports.display().to_string(),
        generated_at: Utc::now(),
    };
    let data = gather_report_data(&outcome, &catalog, &meta, options);

    progress.set_message(format!("Writing reports to {}", out_dir.display()));
    let written = write_reports(&data, &formats, &out_dir)
        .with_context(|| format!("Failed to write reports to {}", out_dir.display()))?;

    progress.finish_and_clear();
    Ok(AuditRun { data, written })
}

pub fn handle_audit(args: &ArgMatches, quiet: bool) -> Result<()> {
    let exports = args
        .get_one::<String>("exports")
        .context("missing --exports")?;
    let formats: Vec<String> = args
        .get_many::<String>("format")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let request = AuditRequest {
        exports: expand(exports),
        domain: args.get_one::<String>("domain").cloned(),
        output: args.get_one::<String>("output").map(|p| expand(p)),
        formats: parse_formats(&formats)?,
        config: args.get_one::<String>("config").map(|p| expand(p)),
        top: args.get_one::<usize>("top").copied(),
    };

    let run = run_audit_request(&request, quiet)?;
    print_summary(&run);
    Ok(())
}

fn print_summary(run: &AuditRun) {
    let data = &run.data;
    let counts = &data.category_counts;

    print_divider();
    println!("{}", "  AUDIT COMPLETE".green().bold());
    print_divider();
    println!();
    println!("{} Domain: {}", "→".blue(), data.domain.bright_white());
    println!(
        "{} Pages analyzed: {}",
        "→".blue(),
        data.pages_analyzed.to_string().cyan()
    );
    println!(
        "{} Total findings: {}",
        "→".blue(),
        counts.total().to_string().cyan()
    );
    println!();

    for category in Category::ALL {
        println!("  {} {}", category_badge(category), counts.get(category));
    }
    println!();

    if !data.highest_impact.is_empty() {
        println!("{}", "HIGHEST IMPACT".bright_blue().bold());
        for issue in &data.highest_impact {
            println!(
                "  {} {} ({} pages, impact {}/10, effort {}/10)",
                "•".cyan(),
                issue.title.bright_white(),
                issue.count,
                issue.impact,
                issue.effort
            );
        }
        println!();
    }

    if !data.warnings.is_empty() {
        println!("{}", "⚠ WARNINGS".yellow().bold());
        for warning in &data.warnings {
            println!("  {} {}", "•".yellow(), warning);
        }
        println!();
    }

    if run.written.is_empty() {
        println!("{} No report formats requested", "ℹ".blue());
    } else {
        println!("{}", "REPORTS".bright_blue().bold());
        for path in &run.written {
            println!(
                "  {} {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
    }
    println!();
}

// ============================================================================
// catalog
// ============================================================================

/// Plain-text table of every issue the audit can report.
pub fn format_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<28} {:<10} {:>6} {:>6} {:>8}  {}\n",
        "ID", "CATEGORY", "IMPACT", "EFFORT", "PRIORITY", "TITLE"
    ));
    for issue in catalog.iter() {
        out.push_str(&format!(
            "{:<28} {:<10} {:>6} {:>6} {:>8.2}  {}\n",
            issue.id,
            issue.category.as_str(),
            issue.impact,
            issue.effort,
            issue.priority_score(),
            issue.title
        ));
    }
    out
}

pub fn handle_catalog() {
    let catalog = Catalog::standard();

    print_divider();
    println!("{}", "  ISSUE CATALOG".bright_white().bold());
    print_divider();
    println!();
    print!("{}", format_catalog(&catalog));
    println!();
    println!(
        "{} {} issues, priority = impact / effort",
        "ℹ".blue(),
        catalog.len()
    );
}
