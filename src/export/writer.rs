//! Single-column CSV output

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Field delimiter expected by downstream consumers
pub const DELIMITER: char = ',';

/// Row terminator of the standard CSV dialect
pub const LINE_TERMINATOR: &str = "\r\n";

/// Empty fields are written as `""`, never as a blank line.
fn needs_quotes(field: &str) -> bool {
    field.is_empty()
        || field.contains(DELIMITER)
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r')
}

/// Write one single-field row, quoting only when the value demands it.
pub fn write_row<W: Write>(w: &mut W, field: &str) -> io::Result<()> {
    if needs_quotes(field) {
        write!(w, "\"{}\"{}", field.replace('"', "\"\""), LINE_TERMINATOR)
    } else {
        write!(w, "{}{}", field, LINE_TERMINATOR)
    }
}

/// Write every value as its own row. Returns the row count.
pub fn write_rows<W, I, S>(w: &mut W, values: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut rows = 0;
    for value in values {
        write_row(w, value.as_ref())?;
        rows += 1;
    }
    Ok(rows)
}

/// Create (or truncate) `path` and write one value per line.
///
/// The file is flushed and synced before returning.
pub fn write_file<I, S>(path: &Path, values: I) -> io::Result<usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    let rows = write_rows(&mut writer, values)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(rows)
}
