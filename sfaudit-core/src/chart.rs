// SVG chart of audit results

use crate::data::Category;
use crate::report::{ReportData, escape_html};

const WIDTH: u32 = 960;
const PANEL_HEIGHT: u32 = 360;
const MARGIN: u32 = 60;

const IMPACT_COLOR: &str = "#337ab7";
const EFFORT_COLOR: &str = "#5cb85c";

fn category_color(category: Category) -> &'static str {
    match category {
        Category::Critical => "#d9534f",
        Category::High => "#f0ad4e",
        Category::Medium => "#5bc0de",
        Category::Low => "#5cb85c",
    }
}

/// Two panels: findings per category, then the top issues' impact and effort.
pub fn render_chart_svg(data: &ReportData) -> String {
    let height = PANEL_HEIGHT * 2;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"Arial, sans-serif\">\n",
        w = WIDTH,
        h = height
    ));
    svg.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#ffffff\"/>\n",
        WIDTH, height
    ));

    category_panel(&mut svg, data);
    top_issues_panel(&mut svg, data);

    svg.push_str("</svg>\n");
    svg
}

fn category_panel(svg: &mut String, data: &ReportData) {
    let plot_top = MARGIN;
    let plot_bottom = PANEL_HEIGHT - MARGIN;
    let plot_height = plot_bottom - plot_top;
    let plot_width = WIDTH - 2 * MARGIN;

    title(svg, "SEO Issues by Priority Category", MARGIN / 2 + 10);
    axis(svg, plot_bottom);

    let max = Category::ALL
        .iter()
        .map(|c| data.category_counts.get(*c))
        .max()
        .unwrap_or(0)
        .max(1);

    let slot = plot_width / Category::ALL.len() as u32;
    let bar_width = slot * 3 / 5;

    for (i, category) in Category::ALL.iter().enumerate() {
        let count = data.category_counts.get(*category);
        let bar_height = scale(count as f64, max as f64, plot_height);
        let x = MARGIN + slot * i as u32 + (slot - bar_width) / 2;
        let y = plot_bottom - bar_height;

        svg.push_str(&format!(
            "<rect class=\"bar {}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
            category.as_str(),
            x,
            y,
            bar_width,
            bar_height,
            category_color(*category)
        ));
        // count label above the bar
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" font-size=\"14\" text-anchor=\"middle\">{}</text>\n",
            x + bar_width / 2,
            y.saturating_sub(6),
            count
        ));
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" font-size=\"14\" text-anchor=\"middle\">{}</text>\n",
            x + bar_width / 2,
            plot_bottom + 20,
            category.label()
        ));
    }

    svg.push_str(&format!(
        "<text x=\"20\" y=\"{}\" font-size=\"12\" transform=\"rotate(-90 20 {})\" text-anchor=\"middle\">Number of Findings</text>\n",
        plot_top + plot_height / 2,
        plot_top + plot_height / 2
    ));
}

fn top_issues_panel(svg: &mut String, data: &ReportData) {
    let offset = PANEL_HEIGHT;
    let plot_top = offset + MARGIN;
    let plot_bottom = offset + PANEL_HEIGHT - MARGIN;
    let plot_height = plot_bottom - plot_top;
    let plot_width = WIDTH - 2 * MARGIN;

    title(svg, "Top Issues by Impact", offset + MARGIN / 2 + 10);

    if data.highest_impact.is_empty() {
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" font-size=\"14\" text-anchor=\"middle\" fill=\"#6c757d\">No issues found</text>\n",
            WIDTH / 2,
            plot_top + plot_height / 2
        ));
        return;
    }

    axis(svg, plot_bottom);

    let slot = plot_width / data.highest_impact.len() as u32;
    let bar_width = (slot / 3).min(80);

    for (i, issue) in data.highest_impact.iter().enumerate() {
        let center = MARGIN + slot * i as u32 + slot / 2;

        for (value, color, x) in [
            (issue.impact, IMPACT_COLOR, center - bar_width),
            (issue.effort, EFFORT_COLOR, center),
        ] {
            let bar_height = scale(f64::from(value), 10.0, plot_height);
            svg.push_str(&format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
                x,
                plot_bottom - bar_height,
                bar_width,
                bar_height,
                color
            ));
        }

        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" font-size=\"12\" text-anchor=\"middle\">{}</text>\n",
            center,
            plot_bottom + 20,
            escape_html(&issue.title)
        ));
    }

    // legend
    let legend_x = WIDTH - MARGIN - 140;
    let legend_y = offset + MARGIN / 2;
    for (i, (label, color)) in [("Impact (1-10)", IMPACT_COLOR), ("Effort (1-10)", EFFORT_COLOR)]
        .iter()
        .enumerate()
    {
        let y = legend_y + i as u32 * 18;
        svg.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"12\" height=\"12\" fill=\"{}\"/>\n",
            legend_x, y, color
        ));
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" font-size=\"12\">{}</text>\n",
            legend_x + 18,
            y + 11,
            label
        ));
    }
}

fn title(svg: &mut String, text: &str, y: u32) {
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"{}\" font-size=\"18\" font-weight=\"bold\" text-anchor=\"middle\">{}</text>\n",
        WIDTH / 2,
        y,
        text
    ));
}

fn axis(svg: &mut String, y: u32) {
    svg.push_str(&format!(
        "<line x1=\"{}\" y1=\"{y}\" x2=\"{}\" y2=\"{y}\" stroke=\"#333333\" stroke-width=\"1\"/>\n",
        MARGIN,
        WIDTH - MARGIN,
        y = y
    ));
}

fn scale(value: f64, max: f64, span: u32) -> u32 {
    if max <= 0.0 {
        return 0;
    }
    ((value / max) * f64::from(span)).round() as u32
}
