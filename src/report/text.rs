//! Plain-text rendering for reports, suitable for a log file or a mail body.
//!
//! Layout:
//! - `TITLE =====` blocks for the header and the start/end times
//! - `TITLE _____` lists, followed by a blank line, for each line group
//! - Empty groups are left out entirely

use chrono::{DateTime, Local};

use super::{LineGroup, Report};

const WIDTH: usize = 80;

pub fn render(report: &Report) -> String {
    let mut out = String::new();

    block(
        &mut out,
        "Script",
        &[
            format!("{} (ver. {})", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            String::new(),
            report.header.clone(),
        ],
    );
    time_block(&mut out, "Start time", &report.started_at);

    for group in report.groups.iter().filter(|g| !g.is_empty()) {
        list(&mut out, group);
    }

    time_block(&mut out, "End time", &report.finished_at);
    out
}

fn title_line(title: &str, decor: char) -> String {
    let title = title.to_uppercase();
    let fill = WIDTH.saturating_sub(title.chars().count() + 1);
    format!("{title} {}", decor.to_string().repeat(fill))
}

fn block(out: &mut String, title: &str, lines: &[String]) {
    out.push_str(&title_line(title, '='));
    out.push('\n');
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&"=".repeat(WIDTH));
    out.push_str("\n\n");
}

fn time_block(out: &mut String, title: &str, at: &DateTime<Local>) {
    let stamp = at.format("%A %x, %X").to_string();
    block(out, title, &[format!("{stamp:>width$}", width = WIDTH)]);
}

fn list(out: &mut String, group: &LineGroup) {
    out.push_str(&title_line(&group.title, '_'));
    out.push_str("\n\n");
    for line in &group.lines {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportLine, CHANGED_TITLE, DELETED_TITLE};

    fn report(groups: Vec<LineGroup>) -> Report {
        let now = Local::now();
        Report {
            header: "Changes in size of directories for /data on box".to_string(),
            started_at: now,
            finished_at: now,
            groups,
        }
    }

    #[test]
    fn title_lines_span_full_width() {
        let line = title_line("New directories", '_');
        assert!(line.starts_with("NEW DIRECTORIES ___"));
        assert_eq!(line.chars().count(), WIDTH);
    }

    #[test]
    fn empty_groups_are_omitted() {
        let text = render(&report(vec![
            LineGroup {
                title: DELETED_TITLE.to_string(),
                lines: vec![],
            },
            LineGroup {
                title: CHANGED_TITLE.to_string(),
                lines: vec![ReportLine::Text {
                    text: "something".to_string(),
                }],
            },
        ]));

        assert!(!text.contains("DELETED DIRECTORIES"));
        assert!(text.contains("CHANGED DIRECTORIES"));
        assert!(text.contains("\n\nsomething\n"));
    }

    #[test]
    fn header_and_times_present() {
        let text = render(&report(vec![]));
        assert!(text.starts_with("SCRIPT ==="));
        assert!(text.contains("Changes in size of directories for /data on box"));
        assert!(text.contains("START TIME ==="));
        assert!(text.contains("END TIME ==="));
    }
}
