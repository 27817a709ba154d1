use nalgebra::Matrix2;

use crate::{Anglef32, Lengthf32, Point2};

/// Matrix of a counter-clockwise rotation by `angle` degrees.
pub fn rotation_matrix(angle: Anglef32) -> Matrix2<Lengthf32> {
    let theta = angle.to_radians();
    let (sin, cos) = theta.sin_cos();
    Matrix2::new(cos, -sin,
                 sin,  cos)
}

/// Rotate `points` counter-clockwise by `angle` degrees about `pivot`.
///
/// Positive angles rotate counter-clockwise; callers wanting the view *from* a
/// rotated frame (e.g. a beam's-eye view at some gantry angle) must pass the
/// negative of that angle themselves.
pub fn rotate_points(points: &[Point2], angle: Anglef32, pivot: Point2) -> Vec<Point2> {
    let rot = rotation_matrix(angle);
    points.iter()
        .map(|&p| pivot + rot * (p - pivot))
        .collect()
}
