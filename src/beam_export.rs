#![warn(missing_docs)]
//! Export of ray-tracing beam data into a headered CSV file.
//!
//! The ray table follows the Shadow column convention (1-based):
//!
//! | column | quantity |
//! |--------|----------|
//! | 1, 2, 3 | X, Y, Z |
//! | 4, 5, 6 | Xp, Yp, Zp |
//! | 11 | photon energy |
//! | 23 | intensity |
//! | 24, 25 | s- and p-polarized intensity |
//!
//! Note that the exported `Y`/`Z` (and `Yp`/`Zp`) columns are swapped with respect to the
//! table so that `Z` is the vertical coordinate in the CSV file.
use crate::{
    error::{HermesError, HermesResult},
    utils::sci_format::format_exp,
};
use log::info;
use nalgebra::DMatrix;
use std::{fs, io::Write, path::Path};

/// 1-based table columns written to the CSV file (in this order).
pub const EXPORT_COLUMNS: [usize; 10] = [11, 23, 24, 25, 1, 3, 2, 4, 6, 5];

/// Header line of the CSV file.
pub const EXPORT_HEADERS: [&str; 10] = [
    "energy",
    "intensity",
    "intensity_s-pol",
    "intensity_p-pol",
    "X",
    "Y",
    "Z",
    "Xp",
    "Yp",
    "Zp",
];

/// Tabulated ray data with one row per ray.
pub trait RayTable {
    /// Number of rays (rows) in the table.
    fn nb_rays(&self) -> usize;
    /// Number of columns of each ray record.
    fn nb_columns(&self) -> usize;
    /// Value of the 1-based `column` of ray `ray`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the ray or column index is out of range.
    fn value(&self, ray: usize, column: usize) -> HermesResult<f64>;
}

/// A [`RayTable`] backed by a dense matrix (rays x columns).
#[derive(Debug, Clone, PartialEq)]
pub struct TextRayTable {
    data: DMatrix<f64>,
}
impl TextRayTable {
    /// Create a table from a matrix with one row per ray.
    #[must_use]
    pub const fn new(data: DMatrix<f64>) -> Self {
        Self { data }
    }
    /// Read a whitespace separated table from a file.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file cannot be read or its content cannot be parsed.
    /// See [`TextRayTable::parse`].
    pub fn from_file(path: &Path) -> HermesResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HermesError::Export(format!("cannot read file {} : {}", path.display(), e))
        })?;
        Self::parse(&content)
    }
    /// Parse a whitespace separated table. Empty lines and lines starting with `#` are ignored.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - a value is not a number.
    ///   - the rows have different numbers of columns.
    ///   - the table is empty.
    pub fn parse(text: &str) -> HermesResult<Self> {
        let mut values = Vec::new();
        let mut nb_columns = None;
        let mut nb_rows = 0;
        for (line_nr, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(str::parse::<f64>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| {
                    HermesError::Export(format!("invalid value in line {}: {e}", line_nr + 1))
                })?;
            match nb_columns {
                None => nb_columns = Some(row.len()),
                Some(n) if n != row.len() => {
                    return Err(HermesError::Export(format!(
                        "line {} has {} columns, expected {n}",
                        line_nr + 1,
                        row.len()
                    )));
                }
                Some(_) => {}
            }
            values.extend(row);
            nb_rows += 1;
        }
        let Some(nb_columns) = nb_columns else {
            return Err(HermesError::Export("ray table is empty".into()));
        };
        Ok(Self::new(DMatrix::from_row_slice(
            nb_rows, nb_columns, &values,
        )))
    }
}
impl RayTable for TextRayTable {
    fn nb_rays(&self) -> usize {
        self.data.nrows()
    }
    fn nb_columns(&self) -> usize {
        self.data.ncols()
    }
    fn value(&self, ray: usize, column: usize) -> HermesResult<f64> {
        if column == 0 {
            return Err(HermesError::Export("column indices start at 1".into()));
        }
        self.data.get((ray, column - 1)).copied().ok_or_else(|| {
            HermesError::Export(format!(
                "ray {ray} / column {column} out of range ({} x {})",
                self.data.nrows(),
                self.data.ncols()
            ))
        })
    }
}

/// Write the exported columns of a [`RayTable`] as CSV into a writer.
///
/// # Errors
///
/// This function will return an error if
///   - the table has less columns than required.
///   - writing fails.
pub fn write_beam_data<T: RayTable + ?Sized, W: Write>(table: &T, writer: W) -> HermesResult<()> {
    let max_column = EXPORT_COLUMNS.iter().copied().max().unwrap_or_default();
    if table.nb_columns() < max_column {
        return Err(HermesError::Export(format!(
            "ray table needs at least {max_column} columns, found {}",
            table.nb_columns()
        )));
    }
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADERS)
        .map_err(|e| HermesError::Export(format!("cannot write csv header: {e}")))?;
    for ray in 0..table.nb_rays() {
        let record = EXPORT_COLUMNS
            .iter()
            .map(|column| table.value(ray, *column).map(|v| format_exp(v, 6)))
            .collect::<HermesResult<Vec<_>>>()?;
        wtr.write_record(&record)
            .map_err(|e| HermesError::Export(format!("cannot write csv record: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| HermesError::Export(format!("cannot flush csv data: {e}")))?;
    Ok(())
}

/// Save the exported columns of a [`RayTable`] into a CSV file.
///
/// # Errors
///
/// This function will return an error if the file cannot be created or written.
pub fn save_beam_data_to_csv<T: RayTable + ?Sized>(table: &T, path: &Path) -> HermesResult<()> {
    let file = fs::File::create(path).map_err(|e| {
        HermesError::Export(format!("cannot create file {} : {}", path.display(), e))
    })?;
    write_beam_data(table, file)?;
    info!("{} saved!", path.display());
    Ok(())
}
