//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use mastery_core::model::display_name_for;
use mastery_core::record::{LearnerRecord, TopicRecord};

/// Escape a string for safe HTML insertion.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Topics ordered by peak, strongest first; ties broken by slug.
pub(crate) fn ranked_topics(record: &LearnerRecord) -> Vec<(&str, &TopicRecord)> {
    let mut topics: Vec<(&str, &TopicRecord)> = record
        .topics
        .iter()
        .map(|(slug, t)| (slug.as_str(), t))
        .collect();
    topics.sort_by(|a, b| b.1.peak.total_cmp(&a.1.peak).then_with(|| a.0.cmp(b.0)));
    topics
}

/// Generate an HTML report for one learner.
pub fn generate_html(record: &LearnerRecord) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>mastery report: {}</title>\n",
        html_escape(&record.learner)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    let topics = ranked_topics(record);
    let scored = topics.iter().filter(|(_, t)| t.peak > 0.0).count();

    html.push_str("<header>\n");
    html.push_str(&format!(
        "<h1>Topic mastery for {}</h1>\n",
        html_escape(&record.learner)
    ));
    html.push_str(&format!(
        "<p class=\"meta\">{} of {} topics scored | {} bins | last synced {}</p>\n",
        scored,
        topics.len(),
        record.bin_count(),
        record.last_synced.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    if scored > 0 {
        html.push_str(&generate_bar_chart(&topics));
    }
    html.push_str("</section>\n");

    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Topics</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Topic</th><th onclick=\"sortTable(1)\">Current</th><th onclick=\"sortTable(2)\">Peak</th><th onclick=\"sortTable(3)\">Retained</th><th onclick=\"sortTable(4)\">Bins</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for (slug, topic) in &topics {
        let retained = retention(topic);
        let class = if topic.peak == 0.0 {
            "empty"
        } else if retained >= 0.8 {
            "pass"
        } else {
            "fail"
        };
        let bins = record.bins.get(*slug).map_or(0, |b| b.len());

        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{:.1}</td><td>{:.1}</td><td>{:.0}%</td><td>{}</td></tr>\n",
            class,
            html_escape(&display_name_for(slug)),
            topic.current,
            topic.peak,
            retained * 100.0,
            bins
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(record).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Share of the peak still held, 0 for never-scored topics.
pub(crate) fn retention(topic: &TopicRecord) -> f64 {
    if topic.peak > 0.0 {
        topic.current / topic.peak
    } else {
        0.0
    }
}

/// Write an HTML report to a file.
pub fn write_html_report(record: &LearnerRecord, path: &Path) -> Result<()> {
    let html = generate_html(record);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

/// Horizontal bars of current mastery against the learner's best peak.
fn generate_bar_chart(topics: &[(&str, &TopicRecord)]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 200;

    let scale = topics
        .iter()
        .map(|(_, t)| t.peak)
        .fold(0.0_f64, f64::max);
    let shown: Vec<_> = topics.iter().filter(|(_, t)| t.peak > 0.0).collect();

    let total_height = shown.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 80,
        total_height
    );

    for (i, (slug, topic)) in shown.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let peak_width = (topic.peak / scale * max_width as f64) as usize;
        let current_width = (topic.current / scale * max_width as f64) as usize;

        let color = if retention(topic) >= 0.8 {
            "#22c55e"
        } else if retention(topic) >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&display_name_for(slug))
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"currentColor\" rx=\"4\"/>\n",
            label_width, y, peak_width, bar_height
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, current_width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.0}</text>\n",
            label_width + peak_width + 8,
            y + bar_height / 2,
            topic.current
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.empty { color: #9ca3af; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  const key = cell => {
    const n = parseFloat(cell.textContent);
    return isNaN(n) ? cell.textContent : n;
  };
  rows.sort((a, b) => {
    const va = key(a.cells[col]);
    const vb = key(b.cells[col]);
    const cmp = typeof va === 'number' && typeof vb === 'number' ? va - vb : String(va).localeCompare(String(vb));
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
