// Console output for the rolling window: a fixed-width table or JSON lines.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::pipeline::window::{VisibleRange, WindowEntry};

const COLUMN_WIDTH: usize = 15;

/// Format rows as a `Time / ValueA / ValueB` table. Returns an empty string
/// when there is nothing to show.
pub fn format_table(rows: &[WindowEntry]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut out = format!(
        "{:>w$}\t{:>w$}\t{:>w$}\n",
        "Time",
        "ValueA",
        "ValueB",
        w = COLUMN_WIDTH
    );
    for row in rows {
        out.push_str(&format!(
            "{:>w$.6}\t{:>w$.6}\t{:>w$.6}\n",
            row.timestamp,
            row.series_a,
            row.series_b,
            w = COLUMN_WIDTH
        ));
    }
    out
}

#[derive(Serialize)]
struct JsonFrame<'a> {
    visible_range: Option<VisibleRange>,
    rows: &'a [WindowEntry],
}

/// Format one refresh as a single JSON line.
pub fn format_json(rows: &[WindowEntry], visible_range: Option<VisibleRange>) -> Result<String> {
    Ok(serde_json::to_string(&JsonFrame {
        visible_range,
        rows,
    })?)
}

/// Write one refresh to `out`. Nothing is written for an empty snapshot.
pub fn write_frame(
    out: &mut impl Write,
    rows: &[WindowEntry],
    visible_range: Option<VisibleRange>,
    json: bool,
) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    if json {
        writeln!(out, "{}", format_json(rows, visible_range)?)?;
    } else {
        writeln!(out, "{}", format_table(rows))?;
    }
    out.flush()?;
    Ok(())
}
