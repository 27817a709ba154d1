//! Rasterization of the aperture formed by the leaf pairs of a multi-leaf
//! collimator (MLC), as seen on a grid rotated to a given gantry angle.

use itertools::iproduct;
use ndarray::Array2;

#[cfg(not(feature = "serial"))]
use rayon::prelude::*;

use geometry::rotate_points;
use crate::{Anglef32, DoseError, Intensityf32, Lengthf32, Point2};

/// Render the transmission field of an MLC aperture on an `(rows, cols)` grid.
///
/// Each leaf pair `i` opens the strip `w_min..w_max` given by `leaf_widths[i]`
/// across the leaf-travel span `p_left..p_right` given by `leaf_positions[i]`,
/// both in beam's-eye coordinates. Grid cell `(i, j)` sits at spatial
/// coordinate `(i, j)`: the row index is the first spatial coordinate and is
/// the one compared against `leaf_positions`; the column index is compared
/// against `leaf_widths`, with a half-open `[w_min, w_max)` interval.
///
/// The grid is rotated by the *negative* of `gantry_angle` about `isocenter`
/// to obtain the beam's-eye view. Leaf edges along the travel direction are
/// soft: a logistic transition models the penumbra instead of a hard cutoff,
/// so cells near an edge take intermediate values. Contributions from
/// overlapping leaf pairs accumulate without clamping; the result can exceed
/// 1.0 where openings overlap, and callers wanting a binary aperture must
/// threshold it themselves. No leaf pairs at all is valid and yields an
/// all-zero field.
///
/// Every leaf pair is evaluated against every grid cell, which is fine at
/// clinical sizes (tens of pairs, grids in the low hundreds per side).
pub fn aperture_mask(
    leaf_widths:    &[[Lengthf32; 2]],
    leaf_positions: &[[Lengthf32; 2]],
    gantry_angle:   Anglef32,
    grid_size:      (usize, usize),
    isocenter:      Point2,
) -> Result<Array2<Intensityf32>, DoseError> {
    let (rows, cols) = grid_size;
    if leaf_widths.len() != leaf_positions.len() {
        return Err(DoseError::ShapeMismatch {
            left:  leaf_widths   .len(),
            right: leaf_positions.len(),
        });
    }
    if rows == 0 || cols == 0 {
        return Err(DoseError::InvalidGridSize { rows, cols });
    }

    let grid: Vec<Point2> = iproduct!(0..rows, 0..cols)
        .map(|(i, j)| Point2::new(i as Lengthf32, j as Lengthf32))
        .collect();

    // Rotating the sampling grid against the gantry simulates the beam's
    // perspective.
    let beam_eye = rotate_points(&grid, -gantry_angle, isocenter);

    let zero_mask = || Array2::zeros((rows, cols));

    // Row-major traversal of the mask matches the generation order of `grid`.
    let open_one_pair = |mut mask: Array2<Intensityf32>,
                         &(&[w_min, w_max], &[p_left, p_right]):
                          &(&[Lengthf32; 2], &[Lengthf32; 2])| {
        for (cell, p) in mask.iter_mut().zip(&beam_eye) {
            if p.y >= w_min && p.y < w_max {
                *cell += sigmoid(p.x - p_left) * sigmoid(p_right - p.x);
            }
        }
        mask
    };

    let pairs: Vec<_> = leaf_widths.iter().zip(leaf_positions.iter()).collect();

    #[cfg(feature = "serial")]
    let mask = pairs.iter().fold(zero_mask(), open_one_pair);

    // Leaf pairs are independent, so accumulate them in parallel and sum the
    // per-thread fields.
    #[cfg(not(feature = "serial"))]
    let mask = pairs.par_iter()
        .fold  (zero_mask, open_one_pair)
        .reduce(zero_mask, |l, r| l + r);

    Ok(mask)
}

#[inline]
fn sigmoid(x: f32) -> f32 { 1.0 / (1.0 + (-x).exp()) }

#[cfg(test)]
mod test_aperture {
    use super::*;
    use float_eq::assert_float_eq;
    use rstest::rstest;

    fn centred_iso(rows: usize, cols: usize) -> Point2 {
        Point2::new((rows - 1) as f32 / 2.0, (cols - 1) as f32 / 2.0)
    }

    #[test]
    fn mismatched_leaf_arrays_are_rejected() {
        let result = aperture_mask(&[[0.0, 1.0], [1.0, 2.0]], &[[0.0, 1.0]],
                                   0.0, (4, 4), Point2::new(0.0, 0.0));
        assert_eq!(result.unwrap_err(), DoseError::ShapeMismatch { left: 2, right: 1 });
    }

    #[rstest(/**/ rows, cols,
             case(0, 4),
             case(4, 0),
             case(0, 0),
    )]
    fn empty_grid_is_rejected(rows: usize, cols: usize) {
        let result = aperture_mask(&[[0.0, 1.0]], &[[0.0, 1.0]],
                                   0.0, (rows, cols), Point2::new(0.0, 0.0));
        assert_eq!(result.unwrap_err(), DoseError::InvalidGridSize { rows, cols });
    }

    #[test]
    fn no_leaf_pairs_block_everything() {
        let mask = aperture_mask(&[], &[], 30.0, (3, 5), Point2::new(1.0, 2.0)).unwrap();
        assert_eq!(mask.dim(), (3, 5));
        assert!(mask.iter().all(|&v| v == 0.0));
    }

    // One fully open pair on a 4x4 grid: each row takes the value
    // sigmoid(i) * sigmoid(4 - i), constant across the row.
    #[rstest(/**/ row, expected,
             case(0, 0.491007),
             case(1, 0.696388),
             case(2, 0.775803),
             case(3, 0.696388),
    )]
    fn single_open_pair_on_4x4(row: usize, expected: f32) {
        let mask = aperture_mask(&[[0.0, 4.0]], &[[0.0, 4.0]],
                                 0.0, (4, 4), Point2::new(1.5, 1.5)).unwrap();
        for col in 0..4 {
            assert_float_eq!(mask[(row, col)], expected, abs <= 1e-4);
        }
    }

    #[test]
    fn interior_of_wide_opening_saturates_to_one() {
        let mask = aperture_mask(&[[0.0, 32.0]], &[[0.0, 32.0]],
                                 0.0, (32, 32), centred_iso(32, 32)).unwrap();
        for ((i, _), &v) in mask.indexed_iter() {
            assert!(v > 0.0 && v <= 1.0);
            // Eight cells in from each travel edge the sigmoids have saturated
            if (8..=24).contains(&i) {
                assert_float_eq!(v, 1.0, abs <= 1e-3);
            }
        }
    }

    #[test]
    fn leaf_pair_contributions_accumulate_linearly() {
        let widths    = [[0.0, 8.0], [2.0, 6.0]];
        let positions = [[1.0, 5.0], [3.0, 7.0]];
        let iso = Point2::new(2.5, 3.0);

        let both  = aperture_mask(&widths,      &positions,      25.0, (6, 7), iso).unwrap();
        let first = aperture_mask(&widths[..1], &positions[..1], 25.0, (6, 7), iso).unwrap();
        let second= aperture_mask(&widths[1..], &positions[1..], 25.0, (6, 7), iso).unwrap();

        let summed = first + second;
        for (&b, &s) in both.iter().zip(summed.iter()) {
            assert_float_eq!(b, s, abs <= 1e-5);
        }
    }

    #[test]
    fn full_turn_reproduces_the_unrotated_field() {
        let widths    = [[1.0, 7.0]];
        let positions = [[2.0, 6.0]];
        let iso = centred_iso(8, 8);
        let still   = aperture_mask(&widths, &positions,   0.0, (8, 8), iso).unwrap();
        let rotated = aperture_mask(&widths, &positions, 360.0, (8, 8), iso).unwrap();
        for (&a, &b) in still.iter().zip(rotated.iter()) {
            assert_float_eq!(a, b, abs <= 1e-4);
        }
    }

    // At 90 degrees the travel direction lines up with the column axis, so
    // the field is the transpose of the one rendered at 0 degrees.
    #[test]
    fn quarter_turn_transposes_the_field() {
        let widths    = [[-100.0, 100.0]];
        let positions = [[2.8, 4.2]];
        let iso = centred_iso(8, 8);
        let straight = aperture_mask(&widths, &positions,  0.0, (8, 8), iso).unwrap();
        let turned   = aperture_mask(&widths, &positions, 90.0, (8, 8), iso).unwrap();
        for ((i, j), &v) in turned.indexed_iter() {
            assert_float_eq!(v, straight[(j, i)], abs <= 1e-4);
        }
    }

    // The width interval is half-open: a column exactly on w_max is blocked
    #[test]
    fn width_upper_edge_is_exclusive() {
        let mask = aperture_mask(&[[1.0, 3.0]], &[[-50.0, 50.0]],
                                 0.0, (5, 5), centred_iso(5, 5)).unwrap();
        for i in 0..5 {
            assert_eq!(mask[(i, 0)], 0.0);
            assert_eq!(mask[(i, 3)], 0.0); // on the upper edge
            assert!(mask[(i, 1)] > 0.9);
            assert!(mask[(i, 2)] > 0.9);
        }
    }
}
