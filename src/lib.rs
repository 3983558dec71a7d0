//! Bicycle frame geometry: from chart measurements to comparable drawings.
//!
//! The core is [`solver::compute_frame_points`], which turns eleven standard
//! measurements (stack, reach, head angle, ...) into the 2D positions of the
//! wheels, bottom bracket, head tube and seat tube. Around it sit a lenient
//! JSON loader, batch helpers that sort by stack and skip bikes that cannot be
//! drawn, and an SVG renderer that overlays bikes on a shared bottom bracket
//! or lays them out in a grid.
//!
//! ```
//! use framegeo::{RawFrameParameters, SolverOptions, frame_points, types::PtMm};
//!
//! let raw = RawFrameParameters {
//!     wheelbase: Some(995.0),
//!     bb_drop: Some(70.0),
//!     chainstay: Some(410.0),
//!     stack: Some(543.0),
//!     reach: Some(390.0),
//!     fork_rake: Some(45.0),
//!     head_angle: Some(70.0),
//!     head_tube: Some(140.0),
//!     seat_tube_length: Some(520.0),
//!     seat_angle: Some(74.0),
//!     wheel_size: Some(340.0),
//! };
//! let points = frame_points(&raw, PtMm::ORIGIN, &SolverOptions::default()).unwrap();
//! assert_eq!(points.rear_wheel.x.raw(), -497.5);
//! ```

pub mod batch;
pub mod defaults;
pub mod errors;
pub mod load;
pub mod log;
pub mod params;
pub mod render;
pub mod solver;
pub mod types;

pub use batch::{Batch, BikeRecord, SkippedBike, SolvedBike, Stacked, solve_batch, sort_by_stack};
pub use errors::{Degeneracy, FieldIssue, LoadError, NotDrawable, RenderError};
pub use load::load_bikes;
pub use params::{Field, FrameParameters, RawFrameParameters};
pub use render::{LayoutMode, RenderOptions, render};
pub use solver::{
    BottomBracketMethod, CockpitDimensions, FramePoint, FramePoints, SolverOptions,
    SteeringAxisMethod, compute_frame_points, frame_points, is_drawable,
};

/// Load a JSON document of bikes and render them to SVG in one call.
///
/// Bikes are sorted by stack before drawing; those that cannot be drawn are
/// left out (and logged when the `tracing` feature is on).
pub fn render_json(
    name: &str,
    json: &str,
    solver: &SolverOptions,
    options: &RenderOptions,
) -> Result<String, miette::Report> {
    let mut records = load_bikes(name, json)?;
    sort_by_stack(&mut records);
    let batch = solve_batch(&records, solver);
    render(&batch.drawable, options)
}
