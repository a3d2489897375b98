//! WireMock-style "Request was not matched" report.

use super::result::{DiffKind, MatchDiff, MatchResult};
use chrono::{DateTime, Utc};
use std::fmt::Write;

const COL_WIDTH: usize = 58;
const SEPARATOR_WIDTH: usize = 119;

const QUERY_NOT_PRESENT: &str = "<<<<< Query is not present";
const HEADER_NOT_PRESENT: &str = "<<<<< Header is not present";

/// Render the mismatch table for an unmatched request, timestamped now.
pub fn render_mismatch(method: &str, full_url: &str, result: &MatchResult) -> String {
    render_mismatch_at(method, full_url, result, Utc::now())
}

/// Render the mismatch table with an explicit timestamp.
pub fn render_mismatch_at(
    method: &str,
    full_url: &str,
    result: &MatchResult,
    timestamp: DateTime<Utc>,
) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let blank = format!("{:<width$} |", "", width = COL_WIDTH + 1);
    let mut out = String::new();

    // write! into a String cannot fail
    let _ = writeln!(out, "{} ", timestamp.format("%Y-%m-%d %H:%M:%S%.3f"));
    let _ = writeln!(out, "{:47}Request was not matched", "");
    let _ = writeln!(out, "{:47}=======================", "");
    let _ = writeln!(out);
    let _ = writeln!(out, "{separator}");
    let _ = writeln!(
        out,
        "| {:<w$} | {:<w$} |",
        "Closest stub",
        "Request",
        w = COL_WIDTH
    );
    let _ = writeln!(out, "{separator}");

    match &result.stub {
        Some(stub) => {
            let _ = writeln!(out, "{blank}");
            if let Some(name) = stub.name.as_deref().filter(|n| !n.is_empty()) {
                let _ = writeln!(out, "{:<w$} |", format!(" {name}"), w = COL_WIDTH + 1);
            }
            let _ = writeln!(out, "{blank}");

            let _ = writeln!(
                out,
                "{:<w$} | {}",
                format!(" {}", stub.request.method),
                method,
                w = COL_WIDTH
            );

            let expected_url = stub.request.url_description();
            let path_width = COL_WIDTH - 8;
            if result.evaluation.url {
                let _ = writeln!(
                    out,
                    " [path] {:<pw$} | {:<w$}",
                    truncate(expected_url, path_width),
                    truncate(full_url, COL_WIDTH),
                    pw = path_width,
                    w = COL_WIDTH
                );
            } else {
                let split = COL_WIDTH - 6;
                let _ = writeln!(
                    out,
                    " [path] {:<pw$} | {}<<<<< URL does not match",
                    truncate(expected_url, path_width),
                    truncate(full_url, split),
                    pw = path_width
                );
                let remainder: String = full_url.chars().skip(split).collect();
                if !remainder.is_empty() {
                    let _ = writeln!(out, " {:<w$} | {}", "", remainder, w = COL_WIDTH - 1);
                }
            }
            let _ = writeln!(out, "{blank}");

            for diff in result.query_diffs() {
                let stub_col = format!(
                    " Query: {} exactly [{}]",
                    diff.name,
                    diff.expected.join(" ")
                );
                write_diff_line(&mut out, diff, &stub_col, "Query", QUERY_NOT_PRESENT, 26);
            }

            for diff in result.header_diffs() {
                let stub_col = format!(" Header: {} [{}]", diff.name, diff.expected.join(" "));
                write_diff_line(&mut out, diff, &stub_col, "Header", HEADER_NOT_PRESENT, 27);
            }

            if result.body_mismatch() {
                let _ = writeln!(
                    out,
                    " {:<w$} | <<<<< Body does not match",
                    "Body [equalToJson]",
                    w = COL_WIDTH - 1
                );
            }
        }
        None => {
            let _ = writeln!(out, " No stub found for: {method} {full_url}");
        }
    }

    let _ = writeln!(out, "{blank}");
    let _ = writeln!(out, "{blank}");
    let _ = writeln!(out, "{separator}");
    out
}

fn write_diff_line(
    out: &mut String,
    diff: &MatchDiff,
    stub_col: &str,
    label: &str,
    not_present: &str,
    actual_margin: usize,
) {
    match diff.kind {
        DiffKind::NotPresent => {
            let pad = (COL_WIDTH + 1).saturating_sub(not_present.len());
            let _ = writeln!(
                out,
                "{:<w$} | {}{}",
                truncate(stub_col, COL_WIDTH),
                " ".repeat(pad),
                not_present,
                w = COL_WIDTH
            );
        }
        DiffKind::Mismatch => {
            let actual_width = COL_WIDTH - actual_margin;
            let actual_col = format!("{}: {}", diff.name, diff.actual.join(","));
            let _ = writeln!(
                out,
                "{:<w$} | {:<aw$}<<<<< {label} does not match",
                truncate(stub_col, COL_WIDTH),
                truncate(&actual_col, actual_width),
                w = COL_WIDTH,
                aw = actual_width
            );
        }
    }
}

/// Shorten to at most `max_chars` characters, ending in `...` when cut.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}
