//! Multi-bike processing: ordering by stack and resilient batch solving

use std::cmp::Ordering;

use serde::Serialize;

use crate::errors::NotDrawable;
use crate::params::{FrameParameters, RawFrameParameters};
use crate::solver::{FramePoints, SolverOptions, compute_frame_points};
use crate::types::PtMm;

/// One bike as supplied by a loader: an identifier plus whatever it measured
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BikeRecord {
    pub id: String,
    pub params: RawFrameParameters,
}

impl BikeRecord {
    pub fn new(id: impl Into<String>, params: RawFrameParameters) -> Self {
        Self {
            id: id.into(),
            params,
        }
    }
}

/// Anything that can be ordered by its stack height
pub trait Stacked {
    /// The stack in millimetres, if known and finite
    fn stack(&self) -> Option<f64>;
}

impl Stacked for RawFrameParameters {
    fn stack(&self) -> Option<f64> {
        self.stack.filter(|s| s.is_finite())
    }
}

impl Stacked for FrameParameters {
    fn stack(&self) -> Option<f64> {
        Some(self.stack.raw())
    }
}

impl Stacked for BikeRecord {
    fn stack(&self) -> Option<f64> {
        self.params.stack()
    }
}

impl Stacked for SolvedBike {
    fn stack(&self) -> Option<f64> {
        self.params.stack()
    }
}

impl<T: Stacked + ?Sized> Stacked for &T {
    fn stack(&self) -> Option<f64> {
        (**self).stack()
    }
}

fn by_stack(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable ascending sort by stack. Items without a usable stack go last.
pub fn sort_by_stack<T: Stacked>(items: &mut [T]) {
    items.sort_by(|a, b| by_stack(a.stack(), b.stack()));
}

/// A bike whose frame points were derived
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolvedBike {
    pub id: String,
    pub params: FrameParameters,
    pub points: FramePoints,
}

/// A bike left out of the drawing, and why
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedBike {
    pub id: String,
    pub reason: NotDrawable,
}

/// Outcome of solving many bikes. Both lists keep input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub drawable: Vec<SolvedBike>,
    pub skipped: Vec<SkippedBike>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.drawable.len() + self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Solve one record; frames are anchored on the axle-line origin.
pub fn solve_record(record: &BikeRecord, options: &SolverOptions) -> Result<SolvedBike, NotDrawable> {
    let params = record.params.validate()?;
    let points = compute_frame_points(&params, PtMm::ORIGIN, options)?;
    Ok(SolvedBike {
        id: record.id.clone(),
        params,
        points,
    })
}

/// Solve every record. A record that cannot be drawn is set aside without
/// affecting its siblings.
pub fn solve_batch(records: &[BikeRecord], options: &SolverOptions) -> Batch {
    let mut batch = Batch::default();
    for record in records {
        match solve_record(record, options) {
            Ok(solved) => batch.drawable.push(solved),
            Err(reason) => {
                crate::log::warn!(bike = %record.id, %reason, "skipping bike that cannot be drawn");
                batch.skipped.push(SkippedBike {
                    id: record.id.clone(),
                    reason,
                });
            }
        }
    }
    crate::log::debug!(
        drawable = batch.drawable.len(),
        skipped = batch.skipped.len(),
        "solved batch"
    );
    batch
}
