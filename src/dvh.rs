//! Cumulative dose-volume histograms (DVHs) of labelled organ volumes.

use std::collections::BTreeMap;

use itertools::izip;
use ndhistogram::{ndhistogram, Histogram, axis::Uniform};
use serde::{Deserialize, Serialize};

use crate::{Dosef32, DoseError, Label, Ratiof32};

/// Dose width of one DVH bin, in Gy.
pub const BIN_WIDTH: Dosef32 = 0.1;

/// Upper dose limit to use when the caller has no better bound, in Gy.
pub const DEFAULT_MAX_DOSE: Dosef32 = 60.0;

/// Cumulative DVH of a single organ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dvh {
    /// `curve[k]` is the percentage of the organ volume receiving a dose
    /// beyond the `k`-th bin, i.e. at least `(k + 1) * BIN_WIDTH` Gy.
    pub curve: Vec<Ratiof32>,

    /// Number of voxels carrying the organ's label. Zero means the organ was
    /// absent from the label mask, in which case `curve` is all zeros.
    pub voxels: usize,

    /// Percentage of the organ volume whose dose lies beyond the last bin.
    /// Nonzero values mean `max_dose` was chosen too low for this organ, and
    /// show up as a raised tail on `curve`.
    pub above_range: Ratiof32,
}

/// Compute the cumulative DVH of every organ in `organs`.
///
/// `dose` and `labels` describe the same voxels and must have equal length.
/// Doses are binned from 0 to one bin past `max_dose` in steps of
/// [`BIN_WIDTH`]; percentages are relative to each organ's full voxel count.
pub fn calculate_dvhs(
    dose:     &[Dosef32],
    labels:   &[Label],
    organs:   &BTreeMap<String, Label>,
    max_dose: Dosef32,
) -> Result<BTreeMap<String, Dvh>, DoseError> {
    if dose.len() != labels.len() {
        return Err(DoseError::ShapeMismatch { left: dose.len(), right: labels.len() });
    }

    let n_bins = (max_dose / BIN_WIDTH).round() as usize + 1;
    let top = n_bins as Dosef32 * BIN_WIDTH;

    let mut dvhs = BTreeMap::new();
    for (organ, &label) in organs {
        let mut hist = ndhistogram!(Uniform::new(n_bins, 0.0, top); usize);
        let mut voxels = 0;
        for (&d, &l) in izip!(dose, labels) {
            if l == label {
                hist.fill(&d);
                voxels += 1;
            }
        }

        let percent_beyond = |binned: usize| {
            if voxels > 0 { 100.0 * (voxels - binned) as Ratiof32 / voxels as Ratiof32 }
            else          { 0.0 }
        };

        let mut curve = Vec::with_capacity(n_bins);
        let mut seen = 0;
        for k in 0..n_bins {
            let centre = (k as Dosef32 + 0.5) * BIN_WIDTH;
            seen += hist.value(&centre).copied().unwrap_or(0);
            curve.push(percent_beyond(seen));
        }

        // Doses past the last bin land in the axis overflow bin
        let above = hist.value(&(top + BIN_WIDTH)).copied().unwrap_or(0);
        let above_range = if voxels > 0 { 100.0 * above as Ratiof32 / voxels as Ratiof32 }
                          else          { 0.0 };

        dvhs.insert(organ.clone(), Dvh { curve, voxels, above_range });
    }
    Ok(dvhs)
}
