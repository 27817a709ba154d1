mod types;
mod rotate;

pub use types::{Anglef32, Lengthf32, Point2, Vector2};
pub use rotate::{rotation_matrix, rotate_points};
