use crate::core::models::fragment::{FRAGMENT_LENGTH, Fragment, FragmentLengthError};
use crate::core::models::letter::{Letter, LetterError};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

/// Raw shape of one library entry as written in a TOML alphabet file.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
struct ReferenceData {
    points: Vec<[f64; 3]>,
}

/// Type alias for the raw table loaded from a TOML alphabet file.
///
/// Maps letter keys (e.g. `"A"`) to their reference coordinates before the
/// keys are validated as [`Letter`]s and the coordinates as [`Fragment`]s.
type RawLibraryFile = HashMap<String, ReferenceData>;

/// The reference geometries of a structural alphabet.
///
/// Each letter maps to exactly one canonical four-point fragment. The library
/// is immutable once constructed and is shared read-only by every encoding
/// call, so it can be used from any number of worker threads without locking.
///
/// Entries are enumerated in ascending letter order. Classification relies on
/// this order to break ties deterministically.
///
/// The library carries no unit of its own: RMSD is scale dependent, so its
/// coordinates must be in the same length unit as the [`Trajectory`] being
/// encoded (nanometres for trajectories read through MD toolkits, see
/// [`LengthUnit`]).
///
/// [`Trajectory`]: crate::core::models::trajectory::Trajectory
/// [`LengthUnit`]: crate::core::io::pdb::LengthUnit
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLibrary {
    /// Reference fragments keyed by letter; never empty.
    references: BTreeMap<Letter, Fragment>,
}

/// Represents errors that can occur while building or loading a reference library.
#[derive(Debug, Error)]
pub enum LibraryLoadError {
    /// The library file could not be read from disk.
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    /// The library file is not valid TOML or does not match the expected layout.
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    /// A key of the library could not be interpreted as a letter.
    #[error("Invalid letter '{name}' in reference library: {source}")]
    InvalidLetter { name: String, source: LetterError },
    /// A reference fragment does not have the window width of points.
    #[error("Reference fragment for letter '{letter}' is invalid: {source}")]
    InvalidFragment {
        letter: Letter,
        source: FragmentLengthError,
    },
    /// The same letter was supplied more than once.
    #[error("Duplicate reference fragment for letter '{0}'")]
    DuplicateLetter(Letter),
    /// The library has no entries at all.
    #[error("Reference library contains no entries")]
    Empty,
}

impl ReferenceLibrary {
    /// Builds a library from already-loaded reference fragments.
    ///
    /// # Errors
    ///
    /// Returns `LibraryLoadError::Empty` if no entries are supplied and
    /// `LibraryLoadError::DuplicateLetter` if a letter appears twice.
    pub fn new(
        entries: impl IntoIterator<Item = (Letter, Fragment)>,
    ) -> Result<Self, LibraryLoadError> {
        let mut references = BTreeMap::new();
        for (letter, fragment) in entries {
            if references.insert(letter, fragment).is_some() {
                return Err(LibraryLoadError::DuplicateLetter(letter));
            }
        }
        if references.is_empty() {
            return Err(LibraryLoadError::Empty);
        }
        Ok(Self { references })
    }

    /// Loads a library from a TOML file.
    ///
    /// The file holds one table per letter with a `points` array of
    /// `[x, y, z]` triples:
    ///
    /// ```toml
    /// [A]
    /// points = [[0.0, 0.0, 0.0], [3.8, 0.0, 0.0], [5.0, 3.6, 0.0], [8.1, 4.2, 2.0]]
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `LibraryLoadError::Io` if the file cannot be read, and any error
    /// of [`ReferenceLibrary::from_toml_str`] for malformed content.
    pub fn load_toml(path: &Path) -> Result<Self, LibraryLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| LibraryLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse_toml(&content, &path.to_string_lossy())
    }

    /// Parses a library from TOML text, see [`ReferenceLibrary::load_toml`].
    pub fn from_toml_str(content: &str) -> Result<Self, LibraryLoadError> {
        Self::parse_toml(content, "<string>")
    }

    fn parse_toml(content: &str, path_for_error: &str) -> Result<Self, LibraryLoadError> {
        let raw: RawLibraryFile = toml::from_str(content).map_err(|e| LibraryLoadError::Toml {
            path: path_for_error.to_string(),
            source: e,
        })?;

        let mut entries = Vec::with_capacity(raw.len());
        for (name, data) in raw {
            let letter = name
                .parse::<Letter>()
                .map_err(|source| LibraryLoadError::InvalidLetter {
                    name: name.clone(),
                    source,
                })?;
            let fragment = fragment_from_coords(letter, &data.points)?;
            entries.push((letter, fragment));
        }
        Self::new(entries)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Number of points in every reference fragment.
    #[inline]
    pub fn fragment_length(&self) -> usize {
        FRAGMENT_LENGTH
    }

    pub fn get(&self, letter: Letter) -> Option<&Fragment> {
        self.references.get(&letter)
    }

    /// Iterates over `(letter, fragment)` pairs in ascending letter order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Letter, &Fragment)> {
        self.references.iter().map(|(letter, fragment)| (*letter, fragment))
    }

    pub fn letters(&self) -> impl ExactSizeIterator<Item = Letter> + '_ {
        self.references.keys().copied()
    }
}

/// Validates raw coordinates of one letter as a reference fragment.
pub(crate) fn fragment_from_coords(
    letter: Letter,
    coords: &[[f64; 3]],
) -> Result<Fragment, LibraryLoadError> {
    let points: Vec<_> = coords
        .iter()
        .map(|&[x, y, z]| nalgebra::Point3::new(x, y, z))
        .collect();
    Fragment::try_from(points.as_slice())
        .map_err(|source| LibraryLoadError::InvalidFragment { letter, source })
}
