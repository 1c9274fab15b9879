use crate::core::alignment::kabsch::align;
use crate::core::alphabet::library::ReferenceLibrary;
use crate::core::models::letter::Letter;
use crate::engine::error::EngineError;
use nalgebra::Point3;

/// Assigns a fragment to the letter whose reference superposes best onto it.
///
/// Every reference is aligned against `fragment` and the letter with the
/// smallest Kabsch RMSD wins. References are visited in the library's
/// ascending letter order and only a strictly smaller RMSD replaces the
/// current best, so ties always resolve to the earliest letter.
///
/// # Errors
///
/// Returns `EngineError::ShapeMismatch` if `fragment` does not have the
/// library's fragment length, `EngineError::EmptyLibrary` if the library
/// has no entries, and `EngineError::NonFiniteCoordinates` if any coordinate
/// is NaN or infinite.
pub fn classify(fragment: &[Point3<f64>], library: &ReferenceLibrary) -> Result<Letter, EngineError> {
    if library.is_empty() {
        return Err(EngineError::EmptyLibrary);
    }
    if fragment.len() != library.fragment_length() {
        return Err(EngineError::ShapeMismatch {
            expected: library.fragment_length(),
            found: fragment.len(),
        });
    }

    if fragment.iter().any(|p| p.coords.iter().any(|c| !c.is_finite())) {
        return Err(EngineError::NonFiniteCoordinates);
    }

    let mut best: Option<(Letter, f64)> = None;
    for (letter, reference) in library.iter() {
        let rmsd = align(reference.points(), fragment)?;
        if !rmsd.is_finite() {
            return Err(EngineError::NonFiniteCoordinates);
        }
        if best.is_none_or(|(_, best_rmsd)| rmsd < best_rmsd) {
            best = Some((letter, rmsd));
        }
    }

    best.map(|(letter, _)| letter)
        .ok_or(EngineError::EmptyLibrary)
}
