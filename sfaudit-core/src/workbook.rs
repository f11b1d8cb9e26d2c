// Excel workbook output

use crate::data::Category;
use crate::report::ReportData;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::Path;

const FINDING_HEADERS: [&str; 7] = [
    "Issue Type",
    "URL",
    "Impact (1-10)",
    "Effort (1-10)",
    "Priority Score",
    "Detail",
    "Recommendation",
];

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4F81BD))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin)
}

/// Write the audit as an `.xlsx` workbook: a summary sheet, one sheet per
/// category that has findings, and a warnings sheet when needed.
pub fn write_workbook(data: &ReportData, path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header = header_format();

    write_summary_sheet(workbook.add_worksheet(), data, &header)?;

    for category in Category::ALL {
        if data.category_counts.get(category) == 0 {
            continue;
        }
        write_category_sheet(workbook.add_worksheet(), data, category, &header)?;
    }

    if !data.warnings.is_empty() {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Warnings")?;
        sheet.write_string_with_format(0, 0, "Warning", &header)?;
        for (i, warning) in data.warnings.iter().enumerate() {
            sheet.write_string(i as u32 + 1, 0, warning)?;
        }
        sheet.set_column_width(0, 100)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn write_summary_sheet(sheet: &mut Worksheet, data: &ReportData, header: &Format) -> Result<(), XlsxError> {
    sheet.set_name("Summary")?;
    sheet.write_string_with_format(0, 0, "Metric", header)?;
    sheet.write_string_with_format(0, 1, "Value", header)?;

    let counts = &data.category_counts;
    let audit_date = data.generated_at.format("%Y-%m-%d").to_string();

    sheet.write_string(1, 0, "Domain")?;
    sheet.write_string(1, 1, &data.domain)?;
    sheet.write_string(2, 0, "Audit Date")?;
    sheet.write_string(2, 1, &audit_date)?;

    let figures = [
        ("Pages Analyzed", data.pages_analyzed),
        ("Total Findings", counts.total()),
        ("Critical Issues", counts.critical),
        ("High Priority Issues", counts.high),
        ("Medium Priority Issues", counts.medium),
        ("Low Priority Issues", counts.low),
    ];
    for (i, (metric, value)) in figures.iter().enumerate() {
        let row = i as u32 + 3;
        sheet.write_string(row, 0, *metric)?;
        sheet.write_number(row, 1, *value as f64)?;
    }

    sheet.set_column_width(0, 26)?;
    sheet.set_column_width(1, 40)?;
    Ok(())
}

fn write_category_sheet(
    sheet: &mut Worksheet,
    data: &ReportData,
    category: Category,
    header: &Format,
) -> Result<(), XlsxError> {
    sheet.set_name(category.label())?;

    for (col, title) in FINDING_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, header)?;
    }

    for (i, finding) in data.findings_in(category).enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, &finding.title)?;
        sheet.write_string(row, 1, &finding.url)?;
        sheet.write_number(row, 2, f64::from(finding.impact))?;
        sheet.write_number(row, 3, f64::from(finding.effort))?;
        sheet.write_number(row, 4, (finding.priority_score * 100.0).round() / 100.0)?;
        sheet.write_string(row, 5, finding.detail.as_deref().unwrap_or(""))?;
        sheet.write_string(row, 6, &finding.recommendation)?;
    }

    sheet.set_column_width(0, 28)?;
    sheet.set_column_width(1, 60)?;
    sheet.set_column_width(5, 40)?;
    sheet.set_column_width(6, 80)?;
    Ok(())
}
