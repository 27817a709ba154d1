//! Helpers for integer segmentation masks.

use ndarray::{ArrayD, ArrayViewD, IxDyn};

use crate::Label;

/// Decompose an integer label array into `num_bits` binary bit planes.
///
/// The output has shape `(num_bits, ..labels.shape())`; plane `b` holds
/// `(v >> b) & 1` for every label value `v`. Labels needing more than
/// `num_bits` bits simply lose their high bits.
pub fn label_bit_planes(labels: ArrayViewD<Label>, num_bits: usize) -> ArrayD<u8> {
    let mut shape = Vec::with_capacity(labels.ndim() + 1);
    shape.push(num_bits);
    shape.extend_from_slice(labels.shape());

    let mut planes = ArrayD::zeros(IxDyn(&shape));
    for (bit, mut plane) in planes.outer_iter_mut().enumerate() {
        plane.assign(&labels.mapv(|v| ((v >> bit) & 1) as u8));
    }
    planes
}

/// 0/1 mask of the voxels carrying `label`.
pub fn binary_mask(labels: ArrayViewD<Label>, label: Label) -> ArrayD<u8> {
    labels.mapv(|v| (v == label) as u8)
}
