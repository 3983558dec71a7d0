//! Placing bikes in model space and fitting the result to the viewport
//!
//! Model space is millimetres, y-down. Each bike pivots on its bottom bracket:
//! in overlay mode every bottom bracket sits on the origin, in grid mode they
//! sit on the centres of a square-ish grid.

use glam::{DVec2, dvec2};

use super::LayoutMode;
use crate::batch::SolvedBike;
use crate::defaults;
use crate::errors::RenderError;
use crate::solver::FramePoints;
use crate::types::{BoxMm, Length, PtMm, Scaler};

/// Smallest extent used when fitting, so a degenerate box never divides by zero.
const MIN_EXTENT: f64 = 1.0;

/// A bike moved to its slot in the drawing
#[derive(Debug, Clone)]
pub struct Placement<'a> {
    pub bike: &'a SolvedBike,
    /// Position in the stack-sorted input
    pub index: usize,
    pub points: FramePoints,
}

/// Columns used for `count` bikes in grid layout: `ceil(sqrt(count))`
pub fn grid_columns(count: usize) -> usize {
    let mut columns = 0;
    while columns * columns < count {
        columns += 1;
    }
    columns
}

/// Centre of grid cell `index` when laying out `count` bikes, centred on the origin.
pub fn grid_centre(index: usize, count: usize) -> PtMm {
    let columns = grid_columns(count).max(1);
    let rows = count.div_ceil(columns).max(1);
    let column = (index % columns) as f64;
    let row = (index / columns) as f64;
    let pitch = defaults::GRID_PITCH;
    PtMm::new(
        pitch * (column - (columns - 1) as f64 / 2.0),
        pitch * (row - (rows - 1) as f64 / 2.0),
    )
}

pub fn place(bikes: &[SolvedBike], mode: LayoutMode) -> Vec<Placement<'_>> {
    bikes
        .iter()
        .enumerate()
        .map(|(index, bike)| {
            let target = match mode {
                LayoutMode::Overlay => PtMm::ORIGIN,
                LayoutMode::Grid => grid_centre(index, bikes.len()),
            };
            Placement {
                bike,
                index,
                points: bike.points.recentered_on_bottom_bracket(target),
            }
        })
        .collect()
}

/// Uniform scale plus translation from model millimetres to viewport pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    pub scaler: Scaler,
    pub translate: DVec2,
}

impl FitTransform {
    /// Scale `bounds` to fill `fill_ratio` of the viewport and centre it.
    pub fn fit(
        bounds: &BoxMm,
        width: f64,
        height: f64,
        fill_ratio: f64,
    ) -> Result<Self, RenderError> {
        if bounds.is_empty() || !bounds.is_finite() {
            return Err(RenderError::InvalidBounds);
        }
        let extent = dvec2(
            bounds.width().raw().max(MIN_EXTENT),
            bounds.height().raw().max(MIN_EXTENT),
        );
        let scale = (width / extent.x).min(height / extent.y) * fill_ratio;
        let scaler = Scaler::try_new(scale).map_err(|_| RenderError::InvalidBounds)?;

        let centre = to_dvec(bounds.center());
        let translate = dvec2(width, height) / 2.0 - centre * scale;

        crate::log::trace!(scale, tx = translate.x, ty = translate.y, "fit transform");
        Ok(Self { scaler, translate })
    }

    pub fn apply(&self, p: PtMm) -> DVec2 {
        to_dvec(p) * self.scaler.px_per_mm + self.translate
    }

    pub fn length(&self, l: Length) -> f64 {
        self.scaler.px(l)
    }
}

fn to_dvec(p: PtMm) -> DVec2 {
    dvec2(p.x.raw(), p.y.raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::pmm;

    #[test]
    fn grid_columns_round_up() {
        assert_eq!(grid_columns(0), 0);
        assert_eq!(grid_columns(1), 1);
        assert_eq!(grid_columns(4), 2);
        assert_eq!(grid_columns(5), 3);
        assert_eq!(grid_columns(9), 3);
        assert_eq!(grid_columns(10), 4);
    }

    #[test]
    fn four_bikes_fill_the_quadrants() {
        let centres: Vec<_> = (0..4).map(|i| grid_centre(i, 4)).collect();
        assert_eq!(
            centres,
            vec![
                pmm(-1000.0, -1000.0),
                pmm(1000.0, -1000.0),
                pmm(-1000.0, 1000.0),
                pmm(1000.0, 1000.0),
            ]
        );
    }

    #[test]
    fn single_bike_sits_on_origin() {
        assert_eq!(grid_centre(0, 1), PtMm::ORIGIN);
    }

    #[test]
    fn partial_rows_stay_centred() {
        // Three bikes: two columns, two rows
        assert_eq!(grid_centre(2, 3), pmm(-1000.0, 1000.0));
    }

    #[test]
    fn fit_centres_and_scales() {
        let mut bounds = BoxMm::new();
        bounds.expand_point(pmm(-500.0, -250.0));
        bounds.expand_point(pmm(500.0, 250.0));

        let fit = FitTransform::fit(&bounds, 800.0, 600.0, 0.8).unwrap();
        // Width limits: 800 / 1000 * 0.8
        assert!((fit.scaler.px_per_mm - 0.64).abs() < 1e-12);
        assert_eq!(fit.apply(pmm(0.0, 0.0)), dvec2(400.0, 300.0));
        assert!((fit.apply(pmm(500.0, 0.0)).x - 720.0).abs() < 1e-9);
        assert!((fit.length(Length(7.0)) - 4.48).abs() < 1e-12);
    }

    #[test]
    fn fit_rejects_empty_and_non_finite_bounds() {
        assert!(matches!(
            FitTransform::fit(&BoxMm::new(), 800.0, 600.0, 0.8),
            Err(RenderError::InvalidBounds)
        ));
        let mut bounds = BoxMm::new();
        bounds.expand_point(pmm(f64::INFINITY, 0.0));
        assert!(FitTransform::fit(&bounds, 800.0, 600.0, 0.8).is_err());
    }

    #[test]
    fn fit_tolerates_zero_extent() {
        let mut bounds = BoxMm::new();
        bounds.expand_point(pmm(10.0, 10.0));
        let fit = FitTransform::fit(&bounds, 100.0, 100.0, 1.0).unwrap();
        assert_eq!(fit.apply(pmm(10.0, 10.0)), dvec2(50.0, 50.0));
    }
}
