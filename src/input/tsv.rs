use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tracing::warn;

use crate::input::InputError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsvRow {
    pub line_no: usize,
    pub fields: Vec<String>,
}

impl TsvRow {
    /// Trimmed field, or "" when the row is shorter than the header.
    pub fn get(&self, col: usize) -> &str {
        self.fields.get(col).map(|s| s.trim()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsvTable {
    pub header: Vec<String>,
    pub rows: Vec<TsvRow>,
}

impl TsvTable {
    /// First column whose header matches any of `names`, ignoring case.
    pub fn column(&self, names: &[&str]) -> Option<usize> {
        self.header
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
    }

    pub fn require_column(&self, names: &[&str], source: &str) -> Result<usize, InputError> {
        self.column(names).ok_or_else(|| {
            InputError::InvalidInput(format!("{source}: missing required column `{}`", names[0]))
        })
    }
}

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn read_tsv(path: &Path) -> Result<TsvTable, InputError> {
    let reader = open_maybe_gz(path)?;
    parse_tsv(reader, &path.display().to_string())
}

pub fn parse_tsv<R: BufRead>(mut reader: R, source: &str) -> Result<TsvTable, InputError> {
    let mut buf = Vec::new();

    let Some(first) = read_line_lossy(&mut reader, &mut buf, source, 1)? else {
        return Err(InputError::Parse(format!("{source} is empty")));
    };
    let header: Vec<String> = first
        .trim_end_matches(['\r', '\n'])
        .trim_start_matches('\u{feff}')
        .split('\t')
        .map(|s| s.trim().to_string())
        .collect();
    if header.iter().all(|h| h.is_empty()) {
        return Err(InputError::Parse(format!("{source} header is empty")));
    }

    let mut rows = Vec::new();
    let mut line_no = 1usize;
    while let Some(text) = read_line_lossy(&mut reader, &mut buf, source, line_no + 1)? {
        line_no += 1;
        let line = text.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        rows.push(TsvRow {
            line_no,
            fields: line.split('\t').map(|s| s.to_string()).collect(),
        });
    }

    Ok(TsvTable { header, rows })
}

/// Next line as text. Bytes that are not UTF-8 (legacy exports) become
/// U+FFFD instead of failing the whole file.
fn read_line_lossy<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    source: &str,
    line_no: usize,
) -> Result<Option<String>, InputError> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    let text = match String::from_utf8_lossy(buf) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            warn!(source, line = line_no, "line is not valid UTF-8; replaced invalid bytes");
            text
        }
    };
    Ok(Some(text))
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tsv.rs"]
mod tests;
