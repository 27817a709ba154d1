pub use geometry::{Point2, Vector2};

pub type Lengthf32    = f32;
pub type Anglef32     = f32; // degrees
pub type Dosef32      = f32; // Gy
pub type Ratiof32     = f32;
pub type Intensityf32 = f32;

/// Integer organ label, as found in a segmentation mask.
pub type Label = u32;

pub use crate::error::DoseError;
