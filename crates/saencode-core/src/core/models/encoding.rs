use super::letter::Letter;
use nalgebra::DMatrix;
use thiserror::Error;

/// A trajectory expressed in a structural alphabet.
///
/// Rows are trajectory frames, columns are fragment positions along the chain
/// (one fewer than the fragment width per frame, i.e. `atoms - 3`).
#[derive(Debug, Clone, PartialEq)]
pub struct Encoding {
    letters: DMatrix<Letter>,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum EncodingError {
    #[error("Row {row} has {found} letters, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl Encoding {
    pub fn from_rows(rows: Vec<Vec<Letter>>) -> Result<Self, EncodingError> {
        let num_frames = rows.len();
        let num_positions = rows.first().map_or(0, Vec::len);
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != num_positions)
        {
            return Err(EncodingError::RaggedRow {
                row,
                expected: num_positions,
                found,
            });
        }
        Ok(Self {
            letters: DMatrix::from_row_iterator(
                num_frames,
                num_positions,
                rows.into_iter().flatten(),
            ),
        })
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.letters.nrows()
    }

    #[inline]
    pub fn num_positions(&self) -> usize {
        self.letters.ncols()
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.letters.shape()
    }

    pub fn get(&self, frame: usize, position: usize) -> Option<Letter> {
        self.letters.get((frame, position)).copied()
    }

    /// The letters observed at one position across all frames, in frame order,
    /// or `None` if `position` is out of range.
    ///
    /// Storage is column-major, so this is a contiguous slice.
    pub fn column(&self, position: usize) -> Option<&[Letter]> {
        if position >= self.num_positions() {
            return None;
        }
        let n = self.letters.nrows();
        self.letters.as_slice().get(position * n..(position + 1) * n)
    }

    pub fn columns(&self) -> impl ExactSizeIterator<Item = &[Letter]> {
        let n = self.letters.nrows();
        let data = self.letters.as_slice();
        (0..self.num_positions()).map(move |j| &data[j * n..(j + 1) * n])
    }

    pub fn row(&self, frame: usize) -> Option<Vec<Letter>> {
        (frame < self.num_frames()).then(|| self.letters.row(frame).iter().copied().collect())
    }

    /// Splits the encoding into contiguous blocks of `frames_per_block` frames.
    ///
    /// Only full blocks are returned; trailing frames that do not fill a block
    /// are dropped so that every block has the same sample count.
    pub fn blocks(&self, frames_per_block: usize) -> Vec<Encoding> {
        if frames_per_block == 0 {
            return Vec::new();
        }
        (0..self.num_frames() / frames_per_block)
            .map(|b| Encoding {
                letters: self
                    .letters
                    .rows(b * frames_per_block, frames_per_block)
                    .into_owned(),
            })
            .collect()
    }

    pub fn as_matrix(&self) -> &DMatrix<Letter> {
        &self.letters
    }
}

impl From<DMatrix<Letter>> for Encoding {
    fn from(letters: DMatrix<Letter>) -> Self {
        Self { letters }
    }
}
