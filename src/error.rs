use thiserror::Error;

/// Input-validation failures. All checks run before any computation starts,
/// so a returned error means no partial result was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DoseError {

    /// Two per-element inputs disagree about the number of elements.
    #[error("input lengths disagree: {left} vs {right}")]
    ShapeMismatch { left: usize, right: usize },

    /// A requested output grid has a zero-sized dimension.
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    InvalidGridSize { rows: usize, cols: usize },
}
