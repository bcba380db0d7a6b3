use crate::core::cell::grid::GridDims;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const TITLE_TAG: &str = "ETITLE:";
const ENERGY_TAG: &str = "ENERGY:";
const PME_GRID_PREFIX: [&str; 4] = ["Info:", "PME", "GRID", "DIMENSIONS"];

/// Column titles NAMD prints for a standard run, used when a log carries no `ETITLE:` line.
pub const DEFAULT_ENERGY_TITLES: [&str; 20] = [
    "TS", "BOND", "ANGLE", "DIHED", "IMPRP", "ELECT", "VDW", "BOUNDARY", "MISC", "KINETIC",
    "TOTAL", "TEMP", "POTENTIAL", "TOTAL3", "TEMPAVG", "PRESSURE", "GPRESSURE", "VOLUME",
    "PRESSAVG", "GPRESSAVG",
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NamdOutputError {
    #[error("No ENERGY lines found in NAMD energy output")]
    NoEnergyRows,

    #[error("Required column '{column}' not found in titles: {titles:?}")]
    MissingColumn { column: String, titles: Vec<String> },

    #[error("Invalid number '{token}' on ENERGY line {row}")]
    InvalidNumber { row: usize, token: String },

    #[error("Failed to read NAMD output '{path}': {message}")]
    Io { path: String, message: String },
}

/// The energy table of one MD run, plus the series the cycle loop reports on.
///
/// Column 0 of every row is `NaN` so that row indices line up with `titles`, whose
/// first entry is the `ETITLE:` tag itself.
#[derive(Debug, Clone, PartialEq)]
pub struct NamdEnergyData {
    pub titles: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    pub elect: Vec<f64>,
    pub potential: Vec<f64>,
    pub vdw: Vec<f64>,
    pub vdw_plus_elect: Vec<f64>,
}

impl NamdEnergyData {
    pub fn elect_first(&self) -> f64 {
        self.elect[0]
    }

    pub fn elect_last(&self) -> f64 {
        self.elect[self.elect.len() - 1]
    }

    pub fn potential_first(&self) -> f64 {
        self.potential[0]
    }

    pub fn potential_last(&self) -> f64 {
        self.potential[self.potential.len() - 1]
    }

    pub fn vdw_plus_elect_first(&self) -> f64 {
        self.vdw_plus_elect[0]
    }

    pub fn vdw_plus_elect_last(&self) -> f64 {
        self.vdw_plus_elect[self.vdw_plus_elect.len() - 1]
    }
}

fn normalize_titles<S: AsRef<str>>(titles: Vec<String>, default_titles: &[S]) -> Vec<String> {
    let mut titles = if titles.is_empty() {
        default_titles.iter().map(|t| t.as_ref().to_string()).collect()
    } else {
        titles
    };
    if titles.first().map(String::as_str) != Some(TITLE_TAG) {
        titles.insert(0, TITLE_TAG.to_string());
    }
    titles
}

fn column_index(titles: &[String], column: &str) -> Result<usize, NamdOutputError> {
    titles
        .iter()
        .position(|t| t == column)
        .ok_or_else(|| NamdOutputError::MissingColumn {
            column: column.to_string(),
            titles: titles.to_vec(),
        })
}

/// Parses the `ETITLE:`/`ENERGY:` blocks of a NAMD log.
///
/// The last `ETITLE:` line names the columns, falling back to `default_titles`.
/// Every `ENERGY:` row is padded with `NaN` or truncated to the title width. The
/// `ELECT`, `POTENTIAL` and `VDW` columns must exist.
pub fn parse_energy_lines<I, L, S>(
    lines: I,
    default_titles: &[S],
) -> Result<NamdEnergyData, NamdOutputError>
where
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
    S: AsRef<str>,
{
    let mut titles: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for line in lines {
        let line = line.as_ref();
        if line.starts_with(TITLE_TAG) {
            titles = line.split_whitespace().map(str::to_string).collect();
        } else if line.starts_with(ENERGY_TAG) {
            let mut row = vec![f64::NAN];
            for token in line.split_whitespace().skip(1) {
                let value = token
                    .parse::<f64>()
                    .map_err(|_| NamdOutputError::InvalidNumber {
                        row: rows.len(),
                        token: token.to_string(),
                    })?;
                row.push(value);
            }
            rows.push(row);
        }
    }

    let titles = normalize_titles(titles, default_titles);
    if rows.is_empty() {
        return Err(NamdOutputError::NoEnergyRows);
    }

    let width = titles.len();
    for row in &mut rows {
        row.resize(width, f64::NAN);
    }

    let elect_idx = column_index(&titles, "ELECT")?;
    let potential_idx = column_index(&titles, "POTENTIAL")?;
    let vdw_idx = column_index(&titles, "VDW")?;

    let column = |idx: usize| rows.iter().map(|r| r[idx]).collect::<Vec<f64>>();
    let elect = column(elect_idx);
    let potential = column(potential_idx);
    let vdw = column(vdw_idx);
    let vdw_plus_elect = vdw.iter().zip(&elect).map(|(v, e)| v + e).collect();

    Ok(NamdEnergyData {
        titles,
        rows,
        elect,
        potential,
        vdw,
        vdw_plus_elect,
    })
}

/// Reads a NAMD log from disk and parses its energy table.
pub fn read_energy_file<S: AsRef<str>>(
    path: &Path,
    default_titles: &[S],
) -> Result<NamdEnergyData, NamdOutputError> {
    let to_err = |e: std::io::Error| NamdOutputError::Io {
        path: path.to_string_lossy().to_string(),
        message: e.to_string(),
    };
    let reader = BufReader::new(File::open(path).map_err(to_err)?);
    let lines = reader.lines().collect::<Result<Vec<_>, _>>().map_err(to_err)?;
    parse_energy_lines(lines, default_titles)
}

fn parse_grid_values(parts: &[&str]) -> Option<GridDims> {
    Some(GridDims::new(
        parts[4].parse().ok()?,
        parts[5].parse().ok()?,
        parts[6].parse().ok()?,
    ))
}

/// Finds the PME grid NAMD actually used, from its `Info: PME GRID DIMENSIONS` line.
///
/// A missing or unreadable file, a missing line, or a malformed first match all yield `None`.
pub fn extract_pme_grid(path: &Path) -> Option<GridDims> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            debug!("No NAMD output at {}: {}", path.display(), e);
            return None;
        }
    };
    for line in BufReader::new(file).lines() {
        let line = line.ok()?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 7 && parts[..4] == PME_GRID_PREFIX {
            return parse_grid_values(&parts);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const TITLES: &str = "ETITLE:      TS           BOND          ANGLE          DIHED          IMPRP               ELECT            VDW       BOUNDARY           MISC        KINETIC               TOTAL           TEMP      POTENTIAL";

    fn energy_line(ts: u64, elect: f64, vdw: f64, potential: f64) -> String {
        format!(
            "ENERGY: {ts} 1.0 2.0 3.0 4.0 {elect} {vdw} 0.0 0.0 10.0 20.0 300.0 {potential}"
        )
    }

    #[test]
    fn parses_series_and_endpoints() {
        let lines = vec![
            "Info: startup".to_string(),
            TITLES.to_string(),
            energy_line(0, -100.0, 5.0, -50.0),
            energy_line(10, -110.0, 6.0, -60.0),
        ];
        let data = parse_energy_lines(lines, &DEFAULT_ENERGY_TITLES).unwrap();

        assert_eq!(data.titles[0], "ETITLE:");
        assert_eq!(data.elect, vec![-100.0, -110.0]);
        assert_eq!(data.potential, vec![-50.0, -60.0]);
        assert_eq!(data.vdw_plus_elect, vec![-95.0, -104.0]);
        assert_eq!(data.elect_first(), -100.0);
        assert_eq!(data.elect_last(), -110.0);
        assert_eq!(data.potential_last(), -60.0);
        assert_eq!(data.vdw_plus_elect_first(), -95.0);
        assert!(data.rows.iter().all(|r| r[0].is_nan()));
    }

    #[test]
    fn uses_default_titles_without_etitle_line() {
        let lines = [
            "ENERGY: 0 1 2 3 4 -7.5 2.5 0 0 0 0 0 -1.25 0 0 0 0 0 0 0",
        ];
        let data = parse_energy_lines(lines, &DEFAULT_ENERGY_TITLES).unwrap();
        assert_eq!(data.titles.len(), DEFAULT_ENERGY_TITLES.len() + 1);
        assert_eq!(data.elect, vec![-7.5]);
        assert_eq!(data.vdw, vec![2.5]);
        assert_eq!(data.potential, vec![-1.25]);
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let lines = [
            "ETITLE: TS ELECT VDW POTENTIAL",
            "ENERGY: 0 -1.0 2.0",
            "ENERGY: 1 -3.0 4.0 5.0 99.0 98.0",
        ];
        let data = parse_energy_lines(lines, &DEFAULT_ENERGY_TITLES).unwrap();
        assert!(data.rows.iter().all(|r| r.len() == 5));
        assert!(data.potential[0].is_nan());
        assert_eq!(data.potential[1], 5.0);
    }

    #[test]
    fn no_energy_rows_is_an_error() {
        let lines = [TITLES];
        assert_eq!(
            parse_energy_lines(lines, &DEFAULT_ENERGY_TITLES),
            Err(NamdOutputError::NoEnergyRows)
        );
    }

    #[test]
    fn last_title_line_names_the_columns() {
        let lines = [
            "ETITLE: TS VDW ELECT POTENTIAL",
            "ENERGY: 0 5.0 -50.0 -40.0",
            "ETITLE: TS ELECT VDW POTENTIAL",
            "ENERGY: 100 -60.0 6.0 -45.0",
        ];
        let data = parse_energy_lines(lines, &DEFAULT_ENERGY_TITLES).unwrap();
        assert_eq!(data.titles[2], "VDW");
        assert_eq!(data.elect, vec![5.0, -60.0]);
        assert_eq!(data.vdw, vec![-50.0, 6.0]);
    }

    #[test]
    fn missing_required_column_is_reported() {
        let lines = ["ETITLE: TS ELECT POTENTIAL", "ENERGY: 0 1.0 2.0"];
        match parse_energy_lines(lines, &DEFAULT_ENERGY_TITLES) {
            Err(NamdOutputError::MissingColumn { column, .. }) => assert_eq!(column, "VDW"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_energy_value_is_an_error() {
        let lines = ["ETITLE: TS ELECT VDW POTENTIAL", "ENERGY: 0 abc 2.0 3.0"];
        assert!(matches!(
            parse_energy_lines(lines, &DEFAULT_ENERGY_TITLES),
            Err(NamdOutputError::InvalidNumber { row: 0, .. })
        ));
    }

    #[test]
    fn extracts_pme_grid_from_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.dat");
        fs::write(
            &path,
            "Info: SIMULATION PARAMETERS:\nInfo: PME GRID DIMENSIONS  48 50 64\nInfo: PME GRID DIMENSIONS 1 1 1\n",
        )
        .unwrap();
        assert_eq!(extract_pme_grid(&path), Some(GridDims::new(48, 50, 64)));
    }

    #[test]
    fn missing_or_malformed_grid_yields_none() {
        let dir = tempdir().unwrap();
        assert_eq!(extract_pme_grid(&dir.path().join("absent.dat")), None);

        let path = dir.path().join("out.dat");
        fs::write(&path, "Info: PME GRID DIMENSIONS 48 x 64\n").unwrap();
        assert_eq!(extract_pme_grid(&path), None);

        fs::write(&path, "Info: nothing here\n").unwrap();
        assert_eq!(extract_pme_grid(&path), None);
    }

    #[test]
    fn reads_energy_file_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.dat");
        fs::write(&path, format!("{TITLES}\n{}\n", energy_line(0, -1.0, 1.0, 0.5))).unwrap();
        let data = read_energy_file(&path, &DEFAULT_ENERGY_TITLES).unwrap();
        assert_eq!(data.potential_first(), 0.5);

        let err = read_energy_file(&dir.path().join("nope.dat"), &DEFAULT_ENERGY_TITLES);
        assert!(matches!(err, Err(NamdOutputError::Io { .. })));
    }
}
