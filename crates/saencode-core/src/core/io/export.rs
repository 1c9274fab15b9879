use crate::core::models::encoding::Encoding;
use nalgebra::DMatrix;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV writing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("I/O error while flushing '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

const STREAM: &str = "<stream>";

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer)
}

fn csv_error(path: &str) -> impl Fn(csv::Error) -> ExportError + '_ {
    move |source| ExportError::Csv {
        path: path.to_string(),
        source,
    }
}

fn write_matrix_named<W: Write>(
    matrix: &DMatrix<f64>,
    writer: W,
    path: &str,
) -> Result<(), ExportError> {
    let mut csv = csv_writer(writer);
    for row in matrix.row_iter() {
        csv.write_record(row.iter().map(|v| v.to_string()))
            .map_err(csv_error(path))?;
    }
    csv.flush().map_err(|source| ExportError::Io {
        path: path.to_string(),
        source,
    })
}

fn write_encoding_named<W: Write>(
    encoding: &Encoding,
    writer: W,
    path: &str,
) -> Result<(), ExportError> {
    let mut csv = csv_writer(writer);
    for row in encoding.as_matrix().row_iter() {
        csv.write_record(row.iter().map(|l| l.to_string()))
            .map_err(csv_error(path))?;
    }
    csv.flush().map_err(|source| ExportError::Io {
        path: path.to_string(),
        source,
    })
}

/// Writes a real matrix as headerless CSV, one matrix row per line.
pub fn write_matrix<W: Write>(matrix: &DMatrix<f64>, writer: W) -> Result<(), ExportError> {
    write_matrix_named(matrix, writer, STREAM)
}

/// Writes an encoding as headerless CSV, one frame per line and one letter per cell.
pub fn write_encoding<W: Write>(encoding: &Encoding, writer: W) -> Result<(), ExportError> {
    write_encoding_named(encoding, writer, STREAM)
}

pub fn write_matrix_to_path(matrix: &DMatrix<f64>, path: &Path) -> Result<(), ExportError> {
    let name = path.to_string_lossy();
    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: name.to_string(),
        source,
    })?;
    write_matrix_named(matrix, std::io::BufWriter::new(file), &name)
}

pub fn write_encoding_to_path(encoding: &Encoding, path: &Path) -> Result<(), ExportError> {
    let name = path.to_string_lossy();
    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: name.to_string(),
        source,
    })?;
    write_encoding_named(encoding, std::io::BufWriter::new(file), &name)
}
