//! Extraction of the header row from an uploaded table.

use std::io::{BufRead, Seek, SeekFrom};

/// Read the first line of `stream`, split on commas and normalize the names.
///
/// Names are trimmed and lowercased.  The stream is rewound to its start
/// afterwards since the row parser reads the content again from the top.  An
/// empty first line yields an empty header; rejecting it is left to the schema
/// checks.
pub fn read_header<R>(stream: &mut R) -> Result<Vec<String>, std::io::Error>
where
    R: BufRead + Seek + ?Sized,
{
    let mut line = String::new();
    stream.read_line(&mut line)?;
    stream.seek(SeekFrom::Start(0))?;

    let line = line.strip_prefix('\u{feff}').unwrap_or(&line);
    let line = line.trim_end_matches(|c| c == '\n' || c == '\r');
    tracing::trace!("header line = {:?}", line);
    if line.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(line
        .split(',')
        .map(|name| name.trim().to_lowercase())
        .collect())
}
