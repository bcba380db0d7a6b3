use crate::core::cell::UnitCell;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

const CELL_RECORD: &str = "CRYST1";

/// 0-based, end-exclusive columns of a, b, c, alpha, beta, gamma in a `CRYST1` record.
const CELL_COLUMNS: [(usize, usize); 6] = [(6, 15), (15, 24), (24, 33), (33, 40), (40, 47), (47, 54)];

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("Failed to read structure file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

fn column(line: &str, start: usize, end: usize) -> &str {
    let len = line.len();
    line.get(start.min(len)..end.min(len)).unwrap_or("").trim()
}

fn parse_fixed_columns(line: &str) -> Option<[f64; 6]> {
    let mut values = [0.0; 6];
    for (value, (start, end)) in values.iter_mut().zip(CELL_COLUMNS) {
        *value = column(line, start, end).parse().ok()?;
    }
    Some(values)
}

fn parse_whitespace(line: &str) -> Option<[f64; 6]> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 7 || parts[0] != CELL_RECORD {
        return None;
    }
    let mut values = [0.0; 6];
    for (value, part) in values.iter_mut().zip(&parts[1..7]) {
        *value = part.parse().ok()?;
    }
    Some(values)
}

/// Extracts the unit cell from the first usable `CRYST1` record.
///
/// The fixed PDB columns are tried first, then a whitespace-separated layout. Lines
/// that parse neither way are skipped; without any usable record every field is `None`.
pub fn parse_cell<I, S>(lines: I) -> UnitCell
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for line in lines {
        let line = line.as_ref();
        if !line.contains(CELL_RECORD) {
            continue;
        }
        if let Some([a, b, c, alpha, beta, gamma]) =
            parse_fixed_columns(line).or_else(|| parse_whitespace(line))
        {
            return UnitCell::new(a, b, c, alpha, beta, gamma);
        }
    }
    UnitCell::default()
}

/// Reads all lines of a structure file.
pub fn read_lines(path: &Path) -> Result<Vec<String>, PdbError> {
    let to_err = |source| PdbError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(to_err)?);
    reader.lines().collect::<Result<_, _>>().map_err(to_err)
}

/// Reads a structure file and returns its unit cell.
pub fn read_cell_from_path(path: &Path) -> Result<UnitCell, PdbError> {
    Ok(parse_cell(read_lines(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_fixed_width_record() {
        let line =
            "CRYST1   10.000   20.000   30.000   90.00   90.00   90.00 P 1           1";
        let cell = parse_cell([line]);
        assert_eq!(cell, UnitCell::new(10.0, 20.0, 30.0, 90.0, 90.0, 90.0));
    }

    #[test]
    fn parses_fixed_width_record_with_touching_fields() {
        let line = "CRYST1 1234.5671234.5671234.567 90.00 90.00 90.00";
        let cell = parse_cell([line]);
        assert_eq!(
            cell,
            UnitCell::new(1234.567, 1234.567, 1234.567, 90.0, 90.0, 90.0)
        );
    }

    #[test]
    fn falls_back_to_whitespace_split() {
        let cell = parse_cell(["CRYST1 10 20 30 90 90 90"]);
        assert_eq!(cell, UnitCell::new(10.0, 20.0, 30.0, 90.0, 90.0, 90.0));
    }

    #[test]
    fn returns_empty_cell_without_record() {
        let cell = parse_cell(["ATOM      1  N   ALA A   1", "HEADER X"]);
        assert!(cell.is_empty());
    }

    #[test]
    fn skips_unparsable_records() {
        let cell = parse_cell(["REMARK CRYST1 is below", "CRYST1 5 5 5 90 90 90"]);
        assert_eq!(cell, UnitCell::new(5.0, 5.0, 5.0, 90.0, 90.0, 90.0));
    }

    #[test]
    fn reads_cell_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("box0.pdb");
        fs::write(
            &path,
            "REMARK test\nCRYST1   25.000   26.000   27.000   90.00   90.00   90.00\nEND\n",
        )
        .unwrap();
        let cell = read_cell_from_path(&path).unwrap();
        assert_eq!(cell.lengths, [Some(25.0), Some(26.0), Some(27.0)]);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempdir().unwrap();
        let err = read_cell_from_path(&dir.path().join("nope.pdb")).unwrap_err();
        assert!(err.to_string().contains("nope.pdb"));
    }
}
