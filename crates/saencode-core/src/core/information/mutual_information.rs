use super::entropy::entropy_from_counts;
use crate::core::models::letter::Letter;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum InformationError {
    #[error("Columns have different sample counts ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
}

/// Letters are ASCII, so a 128-entry table maps every letter to a dense code.
const CODE_TABLE_SIZE: usize = 128;

/// One encoding column recoded into dense integer codes, with its marginal
/// statistics computed once so they can be reused for every pair it joins.
#[derive(Debug, Clone)]
pub(crate) struct ColumnProfile {
    codes: Vec<u8>,
    support: usize,
    entropy: f64,
}

impl ColumnProfile {
    pub(crate) fn new(column: &[Letter]) -> Self {
        let mut table = [u8::MAX; CODE_TABLE_SIZE];
        let mut counts: Vec<u32> = Vec::new();
        let codes = column
            .iter()
            .map(|letter| {
                let slot = &mut table[letter.as_char() as usize];
                if *slot == u8::MAX {
                    *slot = counts.len() as u8;
                    counts.push(0);
                }
                counts[*slot as usize] += 1;
                *slot
            })
            .collect();
        Self {
            codes,
            support: counts.len(),
            entropy: entropy_from_counts(&counts, column.len()),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.codes.len()
    }

    #[inline]
    pub(crate) fn entropy(&self) -> f64 {
        self.entropy
    }
}

/// Joint entropy and joint support size of two equally long columns.
///
/// `scratch` holds the joint count table; it is resized and cleared here so a
/// worker can reuse one buffer across every pair it evaluates.
fn joint_statistics(a: &ColumnProfile, b: &ColumnProfile, scratch: &mut Vec<u32>) -> (f64, usize) {
    scratch.clear();
    scratch.resize(a.support * b.support, 0);
    for (&ca, &cb) in a.codes.iter().zip(&b.codes) {
        scratch[ca as usize * b.support + cb as usize] += 1;
    }
    let support = scratch.iter().filter(|&&c| c > 0).count();
    (entropy_from_counts(scratch, a.len()), support)
}

/// Finite-sample corrected, joint-entropy normalised mutual information.
///
/// `nMI = (Hi + Hj - Hij - e) / Hij` with the bias correction
/// `e = (|joint| - |i| - |j| + 1) / 2N`, and `nMI = 0` whenever `Hij = 0`.
pub(crate) fn normalized_mi(a: &ColumnProfile, b: &ColumnProfile, scratch: &mut Vec<u32>) -> f64 {
    let n = a.len();
    if n == 0 {
        return 0.0;
    }
    let (joint_entropy, joint_support) = joint_statistics(a, b, scratch);
    if joint_entropy == 0.0 {
        return 0.0;
    }
    let mi = a.entropy + b.entropy - joint_entropy;
    let error = (joint_support as f64 - a.support as f64 - b.support as f64 + 1.0)
        / (2.0 * n as f64);
    (mi - error) / joint_entropy
}

fn check_lengths(ci: &[Letter], cj: &[Letter]) -> Result<(), InformationError> {
    if ci.len() != cj.len() {
        return Err(InformationError::LengthMismatch {
            left: ci.len(),
            right: cj.len(),
        });
    }
    Ok(())
}

/// Normalised mutual information between two encoding columns.
///
/// # Errors
///
/// Returns [`InformationError::LengthMismatch`] if the columns were not
/// sampled over the same number of frames.
pub fn pairwise_nmi(ci: &[Letter], cj: &[Letter]) -> Result<f64, InformationError> {
    check_lengths(ci, cj)?;
    let mut scratch = Vec::new();
    Ok(normalized_mi(
        &ColumnProfile::new(ci),
        &ColumnProfile::new(cj),
        &mut scratch,
    ))
}

/// Plain mutual information `Hi + Hj - Hij` in bits, without bias correction
/// or normalisation.
pub fn mutual_information(ci: &[Letter], cj: &[Letter]) -> Result<f64, InformationError> {
    check_lengths(ci, cj)?;
    let a = ColumnProfile::new(ci);
    let b = ColumnProfile::new(cj);
    if a.len() == 0 {
        return Ok(0.0);
    }
    let mut scratch = Vec::new();
    let (joint_entropy, _) = joint_statistics(&a, &b, &mut scratch);
    Ok(a.entropy + b.entropy - joint_entropy)
}
