use crate::core::alphabet::library::{LibraryLoadError, ReferenceLibrary};
use crate::core::models::fragment::Fragment;
use crate::core::models::letter::Letter;
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Cannot derive a letter from file name '{0}'")]
    InvalidFileName(String),
    #[error("Reference fragment from '{path}' is invalid: {source}")]
    Fragment {
        path: String,
        source: LibraryLoadError,
    },
    #[error(transparent)]
    Library(#[from] LibraryLoadError),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
}

/// Length unit of the coordinates handed back by the alphabet loader.
///
/// PDB files store Ångström. Trajectories read through MD toolkits usually
/// come in nanometres, and RMSD is scale dependent, so the library must use the
/// same unit as the trajectory it will encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    Angstrom,
    #[default]
    Nanometer,
}

impl LengthUnit {
    /// Factor converting Ångström to this unit.
    pub fn per_angstrom(self) -> f64 {
        match self {
            LengthUnit::Angstrom => 1.0,
            LengthUnit::Nanometer => 0.1,
        }
    }
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_coord(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.to_string(),
        },
    })
}

/// Reads the backbone trace of the first model in a PDB stream.
///
/// Returns the `CA` atoms in file order, or every atom if the file has no
/// `CA` records (reduced single-bead files). Coordinates are in Ångström, as
/// written in the file.
pub fn read_backbone_trace(reader: &mut impl BufRead) -> Result<Vec<Point3<f64>>, PdbError> {
    let mut alpha_carbons = Vec::new();
    let mut all_atoms = Vec::new();

    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line_num = line_num + 1;

        match slice_and_trim(&line, 0, 6) {
            "ATOM" | "HETATM" => {
                if line.len() < 54 {
                    return Err(PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::LineTooShort,
                    });
                }
                let position = Point3::new(
                    parse_coord(&line, line_num, 30, 38)?,
                    parse_coord(&line, line_num, 38, 46)?,
                    parse_coord(&line, line_num, 46, 54)?,
                );
                if slice_and_trim(&line, 12, 16) == "CA" {
                    alpha_carbons.push(position);
                }
                all_atoms.push(position);
            }
            "ENDMDL" | "END" => break,
            _ => {}
        }
    }

    Ok(if alpha_carbons.is_empty() {
        all_atoms
    } else {
        alpha_carbons
    })
}

/// Loads a structural alphabet from a directory of per-letter PDB files.
///
/// Every `*.pdb` file contributes one reference fragment; its letter is the
/// first character of the file name (`A.pdb` -> `A`). Other files are ignored.
/// Coordinates are converted from the file's Ångström to `unit`.
///
/// # Errors
///
/// Returns `PdbError::InvalidFileName` for a PDB file whose name does not start
/// with a valid letter, `PdbError::Fragment` if a file does not hold exactly
/// four backbone atoms, and `PdbError::Library` for duplicate letters or an
/// empty directory.
pub fn load_alphabet_dir(dir: &Path, unit: LengthUnit) -> Result<ReferenceLibrary, PdbError> {
    let scale = unit.per_angstrom();
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    paths.sort();

    let mut entries = Vec::new();
    for path in paths {
        if path.extension().and_then(|e| e.to_str()) != Some("pdb") {
            continue;
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let letter = file_name
            .chars()
            .next()
            .and_then(|c| Letter::new(c).ok())
            .ok_or_else(|| PdbError::InvalidFileName(file_name.clone()))?;

        let mut reader = BufReader::new(File::open(&path)?);
        let trace: Vec<_> = read_backbone_trace(&mut reader)?
            .into_iter()
            .map(|p| Point3::from(p.coords * scale))
            .collect();
        let fragment = Fragment::try_from(trace.as_slice()).map_err(|source| PdbError::Fragment {
            path: path.to_string_lossy().to_string(),
            source: LibraryLoadError::InvalidFragment { letter, source },
        })?;
        debug!(%letter, path = %path.display(), "Loaded reference fragment.");
        entries.push((letter, fragment));
    }

    Ok(ReferenceLibrary::new(entries)?)
}
