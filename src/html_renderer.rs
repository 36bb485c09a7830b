use crate::loader::{FileFailure, ProcessedFile};
use crate::stats::{DayCounts, Stats, group_by_status, status_distribution};
use crate::types::{LogEntry, Status};

pub struct DashboardReport<'a> {
    pub generated_at: String,
    pub entries: &'a [LogEntry],
    pub stats: Stats,
    pub timeline: Vec<DayCounts>,
    pub table_rows: Vec<&'a LogEntry>,
    pub files: &'a [ProcessedFile],
    pub failures: &'a [FileFailure],
}

#[must_use]
pub fn render_dashboard(report: &DashboardReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("  <meta charset=\"UTF-8\">\n");
    html.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("  <title>Backup Log Audit</title>\n");
    html.push_str(&render_styles());
    html.push_str("</head>\n<body>\n");

    html.push_str("  <h1>Backup Log Audit</h1>\n");
    html.push_str(&format!(
        "  <h3>Generated: {}</h3>\n",
        escape_html(&report.generated_at)
    ));

    html.push_str("  <div class=\"container\">\n    <div class=\"column\">\n");
    html.push_str(&render_files_section(report));

    if report.entries.is_empty() {
        html.push_str(
            r#"<div class="section empty"><h2>No log files loaded</h2><p>Load backup log files to start the analysis.</p></div>
"#,
        );
    } else {
        html.push_str(&render_stats_cards(&report.stats));
        html.push_str(&render_status_lists(report.entries));
        html.push_str(&render_distribution(report.entries));
        html.push_str(&render_timeline(&report.timeline));
        html.push_str(&render_results_table(&report.table_rows));
    }

    html.push_str("    </div>\n  </div>\n");
    html.push_str("  <div class=\"footer\">Built with Rust</div>\n");
    html.push_str("</body>\n</html>\n");

    html
}

fn render_styles() -> String {
    r#"  <style>
    body { background-color: #0c0c0c; color: #d1d1d1; font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; padding: 20px; margin: 0; }
    h1 { text-align: center; margin-bottom: 5px; color: #4CAF50; font-size: 2.2em; letter-spacing: 1px; }
    h3 { text-align: center; font-size: 0.9em; color: #777; margin-bottom: 40px; font-weight: normal; text-transform: uppercase; letter-spacing: 2px; }
    .container { display: flex; gap: 20px; justify-content: center; align-items: flex-start; flex-wrap: wrap; }
    .column { flex: 1; min-width: 300px; max-width: 1200px; border: 1px solid #333; padding: 25px; background-color: #161616; border-radius: 12px; box-shadow: 0 10px 30px rgba(0,0,0,0.5); overflow-x: auto; }
    h2 { text-align: center; color: #fff; font-size: 1.3em; }
    .section { margin: 20px 0; overflow-x: auto; }
    .section-title { color: #4CAF50; font-size: 1.1em; border-bottom: 1px solid #333; padding-bottom: 8px; margin-bottom: 12px; text-align: left; text-transform: none; letter-spacing: 0; }
    .green { color: #4CAF50; }
    .yellow { color: #FFD700; font-weight: 500; }
    .red { color: #f44336; }
    .blue { color: #3b82f6; }
    .muted { color: #888; }
    .bold { font-weight: bold; }
    .cards { display: flex; gap: 12px; flex-wrap: wrap; }
    .card { flex: 1; min-width: 140px; background-color: #1a1a1a; border-left: 4px solid #4CAF50; border-radius: 8px; padding: 12px 16px; }
    .card .value { font-size: 2em; font-weight: bold; color: #fff; }
    .card.red { border-left-color: #f44336; }
    .card.yellow { border-left-color: #FFD700; }
    .card.blue { border-left-color: #3b82f6; }
    .lists { display: flex; gap: 12px; flex-wrap: wrap; }
    .job-list { flex: 1; min-width: 180px; background-color: #1a1a1a; border-radius: 8px; padding: 10px; }
    .job-list ul { list-style: none; padding-left: 0; max-height: 12em; overflow-y: auto; font-size: 0.85em; }
    .job-list li { padding: 3px 0; border-bottom: 1px solid #222; }
    .badge { font-size: 0.8em; margin-left: 6px; }
    .bar-row { display: flex; align-items: center; gap: 10px; margin: 6px 0; }
    .bar-label { width: 120px; }
    .bar-track { flex: 1; background-color: #2a2a2a; border-radius: 4px; height: 14px; }
    .bar { height: 14px; border-radius: 4px; }
    .bar.green { background-color: #4CAF50; }
    .bar.red { background-color: #f44336; }
    .bar.yellow { background-color: #FFD700; }
    .bar.muted { background-color: #888; }
    .bar.blue { background-color: #3b82f6; }
    .data-table { width: 100%; border-collapse: collapse; margin: 10px 0; font-size: 0.9em; min-width: 600px; }
    .data-table th { background-color: #1a1a1a; padding: 10px; text-align: left; border-bottom: 2px solid #333; }
    .data-table td { padding: 8px; border-bottom: 1px solid #222; }
    .data-table td.details { color: #999; font-size: 0.9em; }
    .file-list { list-style: none; padding-left: 0; font-size: 0.85em; }
    .file-list li { padding: 2px 0; word-break: break-all; }
    .empty { text-align: center; padding: 40px 0; color: #777; }
    .footer { text-align: center; margin-top: 40px; padding: 30px 20px; color: #666; font-size: 0.9em; }
    @media (max-width: 768px) {
      body { padding: 10px; }
      h1 { font-size: 1.5em; }
      .column { padding: 15px; min-width: 100%; }
      .data-table { font-size: 0.75em; min-width: 500px; }
    }
  </style>
"#
    .to_string()
}

fn render_files_section(report: &DashboardReport) -> String {
    if report.files.is_empty() && report.failures.is_empty() {
        return String::new();
    }

    let mut html = String::new();
    html.push_str(r#"<div class="section"><h3 class="section-title">Loaded Files</h3>"#);

    if !report.files.is_empty() {
        html.push_str(r#"<ul class="file-list">"#);
        for file in report.files {
            html.push_str(&format!(
                r#"<li>{} <span class="muted">({})</span></li>"#,
                escape_html(&file.name),
                human_bytes::human_bytes(file.size as f64)
            ));
        }
        html.push_str("</ul>");
    }

    if !report.failures.is_empty() {
        html.push_str(&format!(
            r#"<p class="red"><strong>⚠️ {} file(s) could not be processed:</strong></p><ul class="file-list">"#,
            report.failures.len()
        ));
        for failure in report.failures {
            html.push_str(&format!(
                r#"<li><span class="red">{}</span>: {}</li>"#,
                escape_html(&failure.file),
                escape_html(&failure.message)
            ));
        }
        html.push_str("</ul>");
    }

    html.push_str("</div>\n");
    html
}

fn render_stats_cards(stats: &Stats) -> String {
    let cards = [
        ("Total Jobs", stats.total, ""),
        ("Success", stats.success, ""),
        ("Failed", stats.failed, " red"),
        ("Warnings", stats.warning, " yellow"),
    ];

    let mut html = String::from(r#"<div class="section"><div class="cards">"#);
    for (title, value, class) in cards {
        html.push_str(&format!(
            r#"<div class="card{class}"><div class="muted">{title}</div><div class="value">{value}</div></div>"#
        ));
    }
    html.push_str("</div></div>\n");
    html
}

fn render_status_lists(entries: &[LogEntry]) -> String {
    let mut html = String::new();
    html.push_str(r#"<div class="section"><h3 class="section-title">Jobs by Status</h3><div class="lists">"#);

    for (status, jobs) in group_by_status(entries) {
        html.push_str(&format!(
            r#"<div class="job-list"><strong class="{}">{}</strong> <span class="muted">({})</span>"#,
            status.css_class(),
            status.label(),
            jobs.len()
        ));

        if jobs.is_empty() {
            html.push_str(&format!(
                r#"<p class="muted"><em>No jobs with status {}</em></p>"#,
                status.label().to_lowercase()
            ));
        } else {
            html.push_str("<ul>");
            for job in jobs {
                let badge = match status {
                    Status::Success if job.warnings > 0 => {
                        format!(r#"<span class="badge yellow">{} warnings</span>"#, job.warnings)
                    }
                    Status::Warning => {
                        format!(r#"<span class="badge yellow">{} warnings</span>"#, job.warnings)
                    }
                    Status::Failed => {
                        format!(r#"<span class="badge red">{} errors</span>"#, job.errors)
                    }
                    _ => String::new(),
                };
                html.push_str(&format!(
                    r#"<li>{}{}<br><span class="muted">{}</span></li>"#,
                    escape_html(&job.job_name),
                    badge,
                    escape_html(&job.date)
                ));
            }
            html.push_str("</ul>");
        }
        html.push_str("</div>");
    }

    html.push_str("</div></div>\n");
    html
}

fn render_distribution(entries: &[LogEntry]) -> String {
    let mut html = String::new();
    html.push_str(r#"<div class="section"><h3 class="section-title">Status Distribution</h3>"#);

    for share in status_distribution(entries) {
        html.push_str(&format!(
            r#"<div class="bar-row"><span class="bar-label">{}</span><div class="bar-track"><div class="bar {}" style="width: {:.1}%;"></div></div><span>{} ({:.0}%)</span></div>"#,
            share.status.label(),
            share.status.css_class(),
            share.percent,
            share.count,
            share.percent
        ));
    }

    html.push_str("</div>\n");
    html
}

fn render_timeline(days: &[DayCounts]) -> String {
    let mut html = String::new();
    html.push_str(r#"<div class="section"><h3 class="section-title">Daily Timeline</h3>"#);

    if days.is_empty() {
        html.push_str("<p>No dated entries.</p>");
    } else {
        html.push_str(r#"<table class="data-table"><thead><tr><th>Day</th>"#);
        for status in Status::ALL {
            html.push_str(&format!(
                r#"<th class="{}">{}</th>"#,
                status.css_class(),
                status.label()
            ));
        }
        html.push_str("</tr></thead><tbody>");

        for day in days {
            html.push_str(&format!("<tr><td>{}</td>", day.day.format("%Y-%m-%d")));
            for status in Status::ALL {
                let count = day.counts.count(status);
                if count > 0 {
                    html.push_str(&format!(r#"<td class="{}">{count}</td>"#, status.css_class()));
                } else {
                    html.push_str("<td>0</td>");
                }
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
    }

    html.push_str("</div>\n");
    html
}

fn render_results_table(rows: &[&LogEntry]) -> String {
    let mut html = String::new();
    html.push_str(r#"<div class="section"><h3 class="section-title">Detailed Results</h3>"#);

    if rows.is_empty() {
        html.push_str("<p>No matching entries.</p>");
    } else {
        html.push_str(r#"<table class="data-table"><thead><tr>"#);
        html.push_str("<th>Job Name</th><th>Date/Time</th><th>Status</th>");
        html.push_str("<th>Errors</th><th>Warnings</th><th>Details</th>");
        html.push_str("</tr></thead><tbody>");

        for entry in rows {
            let errors_class = if entry.errors > 0 { " class=\"red\"" } else { "" };
            let warnings_class = if entry.warnings > 0 {
                " class=\"yellow\""
            } else {
                ""
            };

            html.push_str(&format!(
                r#"<tr><td>{}</td><td>{}</td><td class="{}">{}</td><td{}>{}</td><td{}>{}</td><td class="details">{}</td></tr>"#,
                escape_html(&entry.job_name),
                escape_html(&entry.date),
                entry.status.css_class(),
                entry.status.label(),
                errors_class,
                entry.errors,
                warnings_class,
                entry.warnings,
                entry.details.as_deref().map_or_else(|| "-".to_string(), escape_html)
            ));
        }
        html.push_str("</tbody></table>");
    }

    html.push_str("</div>\n");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
