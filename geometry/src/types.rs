pub type Lengthf32 = f32;

/// Angles are plain `f32` degrees throughout.
pub type Anglef32 = f32;

use nalgebra as na;
pub type Point2  = na::Point2 <Lengthf32>;
pub type Vector2 = na::Vector2<Lengthf32>;
