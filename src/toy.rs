//! Toy event generation by accept/reject
//!
//! Candidates are drawn uniformly over the rectangular grid box, dropped when
//! they fall outside the Dalitz boundary, and kept with probability
//! `|A|^2 / max`. The maximum is estimated on the normalization grid and
//! inflated by [`MAX_MARGIN`]; draws that exceed it are counted and logged.

use crate::error::{DalitzError, Result};
use crate::events::EventTable;
use crate::model::DalitzModel;
use crate::normalization::NormalizationCache;
use rand::Rng;
use tracing::{info, warn};

/// Relative safety margin on the scanned intensity maximum
pub const MAX_MARGIN: f64 = 0.1;

/// Column names of generated tables, matching the default session fields
pub const FIELDS: [&str; 3] = ["m12sq", "m13sq", "m23sq"];

/// Candidates tried per requested event before giving up
const ATTEMPTS_PER_EVENT: usize = 10_000;

/// Largest `|A|^2` over the cached grid points
pub fn scan_maximum(model: &DalitzModel, cache: &NormalizationCache) -> Result<f64> {
    let mut max = 0.0_f64;
    for point in cache.points() {
        max = max.max(model.intensity(point)?);
    }
    Ok(max)
}

/// Draw `n` events distributed as `|A|^2` over the Dalitz plot
///
/// The returned table has the columns in [`FIELDS`].
pub fn generate<R: Rng + ?Sized>(
    model: &DalitzModel,
    cache: &NormalizationCache,
    n: usize,
    rng: &mut R,
) -> Result<EventTable> {
    let ceiling = scan_maximum(model, cache)? * (1.0 + MAX_MARGIN);
    if !(ceiling > 0.0 && ceiling.is_finite()) {
        return Err(DalitzError::InvalidState(format!(
            "intensity maximum {} does not allow accept/reject sampling",
            ceiling
        )));
    }

    let kinematics = model.kinematics();
    let (lo12, hi12) = cache.grid().m12_range();
    let (lo13, hi13) = cache.grid().m13_range();
    let budget = n.saturating_mul(ATTEMPTS_PER_EVENT).max(ATTEMPTS_PER_EVENT);

    let mut table = EventTable::with_fields(&FIELDS)?;
    let mut attempts = 0usize;
    let mut overshoots = 0usize;
    while table.data().nrows() < n {
        if attempts == budget {
            return Err(DalitzError::InvalidState(format!(
                "accepted {} of {} events after {} candidates",
                table.data().nrows(),
                n,
                attempts
            )));
        }
        attempts += 1;

        let m12sq = rng.gen_range(lo12..hi12);
        let m13sq = rng.gen_range(lo13..hi13);
        if !kinematics.contains(m12sq, m13sq) {
            continue;
        }
        let point = kinematics.point(m12sq, m13sq);
        let intensity = model.intensity(&point)?;
        if intensity > ceiling {
            overshoots += 1;
        }
        if rng.gen::<f64>() * ceiling < intensity {
            table.push_row(&[point.m12sq, point.m13sq, point.m23sq])?;
        }
    }

    if overshoots > 0 {
        warn!(overshoots, ceiling, "intensity exceeded the sampling ceiling");
    }
    info!(
        events = n,
        attempts,
        efficiency = n as f64 / attempts.max(1) as f64,
        "toy sample generated"
    );
    Ok(table)
}
