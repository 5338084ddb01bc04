//! Concrete data providers: observation CSVs plus the shared JSON model
//! provider.

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use tracing::info;

use verify_common::{case_dir_name, ObsProvider, ObsRecord, ObsSet, VerifyError, VerifyResult};

pub use verify_common::JsonModelProvider;

/// Missing-value sentinel used by the observation archives.
const MISSING_SENTINEL: f64 = -888888.0;

/// Observation provider reading one quality-controlled CSV per case.
///
/// Layout: `<obs_dir>/<case>/` (case timestamp with `-` flattened and the
/// colon dropped) holding exactly one `.csv` file. The file carries the
/// fixed metadata columns `ID_String, FM_string, Latitude, Longitude, YEAR,
/// MONTH, DAY, HOUR, MINUTE` followed by one column per variable. Blank
/// cells and the `-888888.0` sentinel are missing.
pub struct CsvObsProvider {
    obs_dir: PathBuf,
}

impl CsvObsProvider {
    pub fn new(obs_dir: impl Into<PathBuf>) -> Self {
        Self {
            obs_dir: obs_dir.into(),
        }
    }

    /// The single observation CSV for a case.
    fn case_file(&self, case: &str) -> VerifyResult<PathBuf> {
        let dir = self.obs_dir.join(case_dir_name(case));
        if !dir.is_dir() {
            return Err(VerifyError::DirectoryNotFound(dir.display().to_string()));
        }
        let pattern = format!("{}/*.csv", dir.display());
        let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().map_or(false, |ext| ext == "csv"))
            .collect();
        if files.len() != 1 {
            return Err(VerifyError::WrongFileCount {
                pattern,
                found: files.len(),
            });
        }
        Ok(files.remove(0))
    }
}

fn parse_value(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v == MISSING_SENTINEL => f64::NAN,
        Ok(v) => v,
        Err(_) => f64::NAN,
    }
}

fn column_index(header: &[&str], name: &str) -> VerifyResult<usize> {
    header
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| VerifyError::parse("observation header", format!("missing column {name:?}")))
}

impl ObsProvider for CsvObsProvider {
    fn load(&self, case: &str, variable: &str) -> VerifyResult<ObsSet> {
        let path = self.case_file(case)?;
        let content = std::fs::read_to_string(&path)?;
        let mut lines = content.lines();
        let header_line = lines
            .next()
            .ok_or_else(|| VerifyError::parse("observation file", "empty file"))?;
        let header: Vec<&str> = header_line.split(',').collect();

        let id_col = column_index(&header, "ID_String")?;
        let fm_col = column_index(&header, "FM_string")?;
        let lat_col = column_index(&header, "Latitude")?;
        let lon_col = column_index(&header, "Longitude")?;
        let year_col = column_index(&header, "YEAR")?;
        let month_col = column_index(&header, "MONTH")?;
        let day_col = column_index(&header, "DAY")?;
        let hour_col = column_index(&header, "HOUR")?;
        let minute_col = column_index(&header, "MINUTE")?;
        let var_col = header
            .iter()
            .position(|h| h.trim() == variable)
            .ok_or_else(|| VerifyError::UnknownVariable(variable.to_string()))?;

        let mut records = Vec::new();
        for (lineno, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let cells: Vec<&str> = line.split(',').collect();
            if cells.len() != header.len() {
                return Err(VerifyError::parse(
                    "observation file",
                    format!(
                        "{}: line {} has {} cells, header has {}",
                        path.display(),
                        lineno + 2,
                        cells.len(),
                        header.len()
                    ),
                ));
            }
            let stamp = |col: usize, what: &str| -> VerifyResult<u32> {
                cells[col].trim().parse::<u32>().map_err(|e| {
                    VerifyError::parse(what, format!("{}: line {}: {e}", path.display(), lineno + 2))
                })
            };
            let year = stamp(year_col, "observation year")? as i32;
            let time = Utc
                .with_ymd_and_hms(
                    year,
                    stamp(month_col, "observation month")?,
                    stamp(day_col, "observation day")?,
                    stamp(hour_col, "observation hour")?,
                    stamp(minute_col, "observation minute")?,
                    0,
                )
                .single()
                .ok_or_else(|| {
                    VerifyError::parse(
                        "observation timestamp",
                        format!("{}: line {}", path.display(), lineno + 2),
                    )
                })?;

            records.push(ObsRecord {
                station_id: cells[id_col].trim().to_string(),
                fm_code: cells[fm_col].trim().to_string(),
                lat: parse_value(cells[lat_col]),
                lon: parse_value(cells[lon_col]),
                time,
                value: parse_value(cells[var_col]),
            });
        }
        info!(case, variable, records = records.len(), "loaded observations");
        Ok(ObsSet::new(records))
    }
}
