//! Plain-text table listings.

use std::io::{self, Write};

use rowmap_core::Cursor;

use crate::driver::Backend;
use crate::error::Result;
use crate::session::Session;

/// Width every cell is left-justified to.
pub const CELL_WIDTH: usize = 20;

/// Formats a header line of column names followed by one line per row.
///
/// Cells are padded to [`CELL_WIDTH`] but never truncated; nulls print as
/// `NULL`.
#[must_use]
pub fn format_cursor(cursor: &Cursor) -> String {
    let mut out = String::new();
    for column in cursor.columns() {
        push_cell(&mut out, &column.name);
    }
    out.push('\n');

    for row in cursor.iter() {
        for index in 0..row.values().len() {
            push_cell(&mut out, &row.get_string(index).unwrap_or_default());
        }
        out.push('\n');
    }
    out
}

fn push_cell(out: &mut String, text: &str) {
    out.push_str(&format!("{text:<width$}", width = CELL_WIDTH));
}

/// Selects `columns` (all when empty) from `table` and writes the listing
/// to `out`.
///
/// `tail` is appended verbatim to the `SELECT` and must come from trusted
/// code.
///
/// # Errors
///
/// Statement errors, or a failed write.
pub async fn print_table<B, S, W>(
    session: &mut Session<B>,
    table: &str,
    columns: &[S],
    tail: &str,
    out: &mut W,
) -> Result<()>
where
    B: Backend,
    S: AsRef<str>,
    W: Write,
{
    let cursor = session.select_columns(columns, table, tail).await?;
    out.write_all(format_cursor(&cursor).as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Writes every row of `table` to standard output.
///
/// # Errors
///
/// Statement errors, or a failed write.
pub async fn show_table<B: Backend>(session: &mut Session<B>, table: &str) -> Result<()> {
    let cursor = session.select(table, "").await?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(format_cursor(&cursor).as_bytes())?;
    stdout.flush()?;
    Ok(())
}
