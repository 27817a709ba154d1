//! Per-organ dose statistics: mean dose, Dx and Vx.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use itertools::izip;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{Dosef32, DoseError, Label, Ratiof32};

fn check_lengths(dose: &[Dosef32], labels: &[Label]) -> Result<(), DoseError> {
    if dose.len() != labels.len() {
        return Err(DoseError::ShapeMismatch { left: dose.len(), right: labels.len() });
    }
    Ok(())
}

fn organ_doses(dose: &[Dosef32], labels: &[Label], label: Label) -> Vec<Dosef32> {
    izip!(dose, labels)
        .filter(|&(_, &l)| l == label)
        .map(|(&d, _)| d)
        .collect()
}

/// Mean dose over each organ's voxels. Organs absent from the label mask are
/// omitted from the result.
pub fn mean_dose(
    dose:   &[Dosef32],
    labels: &[Label],
    organs: &BTreeMap<String, Label>,
) -> Result<BTreeMap<String, Dosef32>, DoseError> {
    check_lengths(dose, labels)?;
    let mut means = BTreeMap::new();
    for (organ, &label) in organs {
        let doses = organ_doses(dose, labels, label);
        if doses.is_empty() { continue }
        let sum: Dosef32 = doses.iter().sum();
        means.insert(organ.clone(), sum / doses.len() as Dosef32);
    }
    Ok(means)
}

/// Dx estimate for one organ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DxEstimate {
    /// The dose received by at least x% of the organ volume, in Gy.
    pub dose: Dosef32,

    /// Organ volume in voxels. With fewer than ~100 voxels the volume rank
    /// resolution is coarser than 1%, so `dose` carries visible rounding
    /// error.
    pub voxels: usize,
}

/// Dose received by at least `volume_percentage` percent of each organ's
/// volume. Valid percentages run from 0 to 100; organs absent from the label
/// mask are omitted from the result.
pub fn dx(
    dose:   &[Dosef32],
    labels: &[Label],
    organs: &BTreeMap<String, Label>,
    volume_percentage: Ratiof32,
) -> Result<BTreeMap<String, DxEstimate>, DoseError> {
    check_lengths(dose, labels)?;
    let mut estimates = BTreeMap::new();
    for (organ, &label) in organs {
        let mut doses = organ_doses(dose, labels, label);
        if doses.is_empty() { continue }
        doses.sort_unstable_by_key(|&d| Reverse(OrderedFloat(d)));

        let voxels = doses.len();
        let rank = ((100.0 - volume_percentage) / 100.0 * voxels as Ratiof32).ceil() as isize - 1;
        // D100 asks for the dose that the whole volume receives: the rank
        // underflows to -1 and wraps to the lowest dose
        let rank = rank.rem_euclid(voxels as isize) as usize;

        estimates.insert(organ.clone(), DxEstimate { dose: doses[rank], voxels });
    }
    Ok(estimates)
}

/// Percentage of each organ's volume receiving at least `threshold` Gy.
/// Every organ in `organs` appears in the result; an organ absent from the
/// label mask scores 0%.
pub fn vx(
    dose:   &[Dosef32],
    labels: &[Label],
    organs: &BTreeMap<String, Label>,
    threshold: Dosef32,
) -> Result<BTreeMap<String, Ratiof32>, DoseError> {
    check_lengths(dose, labels)?;
    let mut percentages = BTreeMap::new();
    for (organ, &label) in organs {
        let doses = organ_doses(dose, labels, label);
        let at_least = doses.iter().filter(|&&d| d >= threshold).count();
        let percent = if doses.is_empty() { 0.0 }
                      else { 100.0 * at_least as Ratiof32 / doses.len() as Ratiof32 };
        percentages.insert(organ.clone(), percent);
    }
    Ok(percentages)
}
