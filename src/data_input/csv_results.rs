// src/data_input/csv_results.rs
//
// CSV output of computed flight series, merging of per-experiment CSVs and
// reading CSVs back into named float columns.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::{AnalysisError, Result};
use crate::types::Series;

/// Named float columns read from a CSV, in header order. Cells that could not
/// be parsed are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl CsvTable {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Column by name, as an error if absent.
    pub fn column(&self, name: &str) -> Result<&[Option<f64>]> {
        self.get(name)
            .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))
    }

    /// Column values with unparseable cells dropped.
    pub fn values(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self.column(name)?.iter().flatten().copied().collect())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|(_, v)| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}

/// Writes `columns` (one slice per header) row by row. Rows are zipped, so the
/// output has as many rows as the shortest column.
pub fn save_data(
    columns: &[&[f64]],
    column_names: &[&str],
    filename: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let file_path = output_dir.join(filename);

    if columns.len() != column_names.len() {
        log::warn!(
            "Writing {} columns with {} headers to '{}'",
            columns.len(),
            column_names.len(),
            file_path.display()
        );
    }

    let rows = columns.iter().map(|c| c.len()).min().unwrap_or(0);
    let mut writer = WriterBuilder::new().from_path(&file_path)?;
    writer.write_record(column_names)?;
    for i in 0..rows {
        writer.write_record(columns.iter().map(|c| c[i].to_string()))?;
    }
    writer.flush()?;

    log::info!("Saved {rows} rows to '{}'", file_path.display());
    Ok(file_path)
}

/// All `*.csv` files directly inside `dir`, sorted by name.
pub fn csv_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("csv"))
        .collect();
    files.sort();
    Ok(files)
}

/// All regular files directly inside `dir`, sorted by name.
pub fn files_in_folder(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Concatenates the CSVs of one experiment folder into `output_dir/filename`.
///
/// Columns are matched by header name; a column missing from one file is left
/// empty on that file's rows. Returns the output path and the row count, or
/// `None` when the folder holds no CSV files.
pub fn unify_csvs(
    input_dir: &Path,
    output_dir: &Path,
    filename: &str,
) -> Result<Option<(PathBuf, usize)>> {
    let output_file = output_dir.join(filename);
    let csv_files: Vec<PathBuf> = csv_files_in(input_dir)?
        .into_iter()
        .filter(|p| *p != output_file)
        .collect();

    if csv_files.is_empty() {
        log::error!("No .csv files were found in '{}'", input_dir.display());
        return Ok(None);
    }

    let mut header: Vec<String> = Vec::new();
    let mut tables: Vec<(Vec<String>, Vec<csv::StringRecord>)> = Vec::new();
    for file in &csv_files {
        let mut reader = ReaderBuilder::new().has_headers(true).from_path(file)?;
        let file_header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        for name in &file_header {
            if !header.contains(name) {
                header.push(name.clone());
            }
        }
        let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
        tables.push((file_header, records));
    }

    fs::create_dir_all(output_dir)?;
    let mut writer = WriterBuilder::new().from_path(&output_file)?;
    writer.write_record(&header)?;

    let mut rows = 0;
    for (file_header, records) in &tables {
        let positions: Vec<Option<usize>> = header
            .iter()
            .map(|name| file_header.iter().position(|h| h == name))
            .collect();
        for record in records {
            writer.write_record(
                positions
                    .iter()
                    .map(|pos| pos.and_then(|i| record.get(i)).unwrap_or("")),
            )?;
            rows += 1;
        }
    }
    writer.flush()?;

    log::info!(
        "Unify {} files in '{}' ({rows} rows)",
        csv_files.len(),
        output_file.display()
    );
    Ok(Some((output_file, rows)))
}

/// Reads a CSV into float columns.
///
/// Empty cells are skipped; cells that are not floats are logged and stored as
/// `None`. If the resulting columns differ in length the read fails.
pub fn read_csv(path: &Path) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut columns: Vec<(String, Vec<Option<f64>>)> =
        headers.iter().map(|h| (h.clone(), Vec::new())).collect();

    for result in reader.records() {
        let record = result?;
        for ((name, values), cell) in columns.iter_mut().zip(record.iter()) {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            match cell.parse::<f64>() {
                Ok(v) => values.push(Some(v)),
                Err(_) => {
                    log::warn!("Could not convert '{cell}' to float in column '{name}'");
                    values.push(None);
                }
            }
        }
    }

    // Columns that never received a value are not part of the table.
    columns.retain(|(_, values)| !values.is_empty());

    if let Some((reference, first)) = columns.first() {
        let reference_len = first.len();
        if let Some((column, values)) = columns.iter().find(|(_, v)| v.len() != reference_len) {
            log::error!(
                "The key '{column}' has a different length ({}) compared to '{reference}' ({reference_len})",
                values.len()
            );
            return Err(AnalysisError::ColumnLengthMismatch {
                column: column.clone(),
                len: values.len(),
                reference: reference.clone(),
                reference_len,
            });
        }
    }

    Ok(CsvTable { columns })
}

/// Pairs two columns row by row, dropping rows where either cell is missing.
pub fn get_vector_from_csv(data1: &[Option<f64>], data2: &[Option<f64>]) -> Series {
    data1
        .iter()
        .zip(data2)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect()
}
