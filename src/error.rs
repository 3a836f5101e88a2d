//! Engine error taxonomy.
//!
//! Only construction and sequencing mistakes are errors. Blocked moves,
//! rotations and spawns are ordinary `bool` results.

use crate::piece::PieceId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("piece template must contain at least one cell")]
    InvalidTemplate,
    #[error("rotation origin ({x}, {y}) is not part of the piece template")]
    InvalidRotationOrigin { x: i32, y: i32 },
    #[error("piece {piece} does not occupy cells matching its template")]
    NotPlaced { piece: PieceId },
}
