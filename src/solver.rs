//! Frame-point solver
//!
//! Converts validated frame measurements into 2D coordinates. Coordinates are
//! screen-style: x grows towards the front wheel, y grows downwards, so the
//! bottom bracket sits at `+bb_drop` below the axle line and the head tube top
//! at `-(stack - bb_drop)` above it.
//!
//! Each point depends only on points derived before it:
//!
//! ```text
//! rear_wheel, front_wheel
//!   -> bottom_bracket (rear_wheel)
//!   -> steering_axis_bottom (front_wheel)
//!   -> steering_axis_top (bottom_bracket | steering_axis_bottom)
//!   -> head_tube_bottom (steering_axis_top)
//!   -> seat_tube_top (bottom_bracket)
//!   -> seat_post_top (seat_tube_top), handlebar_post_top (steering_axis_top)
//! ```

use std::fmt;

use serde::Serialize;

use crate::defaults;
use crate::errors::{Degeneracy, NotDrawable};
use crate::params::{Field, FrameParameters, RawFrameParameters};
use crate::types::{Angle, BoxMm, Length, Offset, OffsetMm, PtMm};

/// Relative slack allowed before a negative radicand counts as degenerate.
const RADICAND_TOLERANCE: f64 = 1e-9;

/// Names of the derived points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FramePoint {
    RearWheel,
    FrontWheel,
    BottomBracket,
    SteeringAxisBottom,
    SteeringAxisTop,
    HeadTubeBottom,
    SeatTubeTop,
    SeatPostTop,
    HandlebarPostTop,
}

impl FramePoint {
    /// All points in derivation order
    pub const ALL: [FramePoint; 9] = [
        FramePoint::RearWheel,
        FramePoint::FrontWheel,
        FramePoint::BottomBracket,
        FramePoint::SteeringAxisBottom,
        FramePoint::SteeringAxisTop,
        FramePoint::HeadTubeBottom,
        FramePoint::SeatTubeTop,
        FramePoint::SeatPostTop,
        FramePoint::HandlebarPostTop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FramePoint::RearWheel => "rear_wheel",
            FramePoint::FrontWheel => "front_wheel",
            FramePoint::BottomBracket => "bottom_bracket",
            FramePoint::SteeringAxisBottom => "steering_axis_bottom",
            FramePoint::SteeringAxisTop => "steering_axis_top",
            FramePoint::HeadTubeBottom => "head_tube_bottom",
            FramePoint::SeatTubeTop => "seat_tube_top",
            FramePoint::SeatPostTop => "seat_post_top",
            FramePoint::HandlebarPostTop => "handlebar_post_top",
        }
    }
}

impl fmt::Display for FramePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the top of the steering axis is located.
///
/// The two formulations agree only when reach is consistent with the
/// rake/head-angle/wheelbase/chainstay combination; in general they differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SteeringAxisMethod {
    /// `(bottom_bracket.x + reach, steering_axis_bottom.y - (stack - bb_drop))`
    #[default]
    Direct,
    /// Walk up the steering axis from its bottom: the axis length is
    /// `(stack - bb_drop) / sin(head_angle)` and the horizontal run is the
    /// remaining leg of that triangle. Ignores reach.
    Triangulated,
}

/// How the bottom bracket's horizontal offset from the rear axle is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BottomBracketMethod {
    /// `sqrt(chainstay² + bb_drop²)`, the formula geometry charts are drawn
    /// with. The drawn chainstay comes out slightly longer than specified.
    #[default]
    Standard,
    /// Chainstay is the hypotenuse: `sqrt(chainstay² - bb_drop²)`. Keeps the
    /// chainstay length exact but fails when `|bb_drop| > chainstay`.
    RightTriangle,
}

/// Fixed lengths for the optional cockpit points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CockpitDimensions {
    pub seat_post: Length,
    pub handlebar_post: Length,
}

impl Default for CockpitDimensions {
    fn default() -> Self {
        Self {
            seat_post: defaults::SEAT_POST_LENGTH,
            handlebar_post: defaults::HANDLEBAR_POST_LENGTH,
        }
    }
}

/// Solver configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolverOptions {
    pub steering_axis: SteeringAxisMethod,
    pub bottom_bracket: BottomBracketMethod,
    /// Derive seat post and handlebar post tops when set
    pub cockpit: Option<CockpitDimensions>,
}

impl SolverOptions {
    /// Enable the cockpit extension with the default post lengths.
    pub fn with_cockpit(mut self) -> Self {
        self.cockpit = Some(CockpitDimensions::default());
        self
    }
}

/// Derived frame coordinates, in millimetres relative to the caller's origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FramePoints {
    pub rear_wheel: PtMm,
    pub front_wheel: PtMm,
    pub bottom_bracket: PtMm,
    pub steering_axis_bottom: PtMm,
    pub steering_axis_top: PtMm,
    pub head_tube_bottom: PtMm,
    pub seat_tube_top: PtMm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_post_top: Option<PtMm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handlebar_post_top: Option<PtMm>,
}

impl FramePoints {
    pub fn get(&self, point: FramePoint) -> Option<PtMm> {
        match point {
            FramePoint::RearWheel => Some(self.rear_wheel),
            FramePoint::FrontWheel => Some(self.front_wheel),
            FramePoint::BottomBracket => Some(self.bottom_bracket),
            FramePoint::SteeringAxisBottom => Some(self.steering_axis_bottom),
            FramePoint::SteeringAxisTop => Some(self.steering_axis_top),
            FramePoint::HeadTubeBottom => Some(self.head_tube_bottom),
            FramePoint::SeatTubeTop => Some(self.seat_tube_top),
            FramePoint::SeatPostTop => self.seat_post_top,
            FramePoint::HandlebarPostTop => self.handlebar_post_top,
        }
    }

    /// Present points, in derivation order
    pub fn iter(&self) -> impl Iterator<Item = (FramePoint, PtMm)> + '_ {
        FramePoint::ALL
            .into_iter()
            .filter_map(|name| self.get(name).map(|p| (name, p)))
    }

    /// Move the whole assembly
    pub fn translated(&self, by: OffsetMm) -> FramePoints {
        FramePoints {
            rear_wheel: self.rear_wheel + by,
            front_wheel: self.front_wheel + by,
            bottom_bracket: self.bottom_bracket + by,
            steering_axis_bottom: self.steering_axis_bottom + by,
            steering_axis_top: self.steering_axis_top + by,
            head_tube_bottom: self.head_tube_bottom + by,
            seat_tube_top: self.seat_tube_top + by,
            seat_post_top: self.seat_post_top.map(|p| p + by),
            handlebar_post_top: self.handlebar_post_top.map(|p| p + by),
        }
    }

    /// Move the assembly so the bottom bracket lands on `target`.
    pub fn recentered_on_bottom_bracket(&self, target: PtMm) -> FramePoints {
        self.translated(target - self.bottom_bracket)
    }

    /// Where an estimated down tube meets the head tube.
    pub fn down_tube_top(&self) -> PtMm {
        self.steering_axis_top
            .lerp(self.head_tube_bottom, defaults::DOWN_TUBE_HEAD_TUBE_FRACTION)
    }

    /// Bounds of the points alone (no wheels or stroke widths)
    pub fn bounds(&self) -> BoxMm {
        let mut bounds = BoxMm::new();
        for (_, p) in self.iter() {
            bounds.expand_point(p);
        }
        bounds
    }
}

impl fmt::Display for FramePoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<20} {:>9} {:>9}", "point", "x", "y")?;
        for (name, p) in self.iter() {
            writeln!(f, "{:<20} {:>9.1} {:>9.1}", name.name(), p.x.raw(), p.y.raw())?;
        }
        Ok(())
    }
}

// ============================================================================
// Derivations
// ============================================================================

/// `sqrt(hypotenuse² - leg²)`, tolerating rounding noise around zero.
fn pythagorean_leg(hypotenuse: Length, leg: Length) -> Result<Length, Degeneracy> {
    let h2 = hypotenuse.raw() * hypotenuse.raw();
    let radicand = h2 - leg.raw() * leg.raw();
    if radicand >= 0.0 {
        Ok(Length(radicand.sqrt()))
    } else if radicand >= -RADICAND_TOLERANCE * h2 {
        Ok(Length::ZERO)
    } else {
        Err(Degeneracy::NegativeRadicand { radicand })
    }
}

/// Horizontal and vertical extent of a tube of `length` leaning at `angle`.
fn tube_offset(length: Length, angle: Angle) -> Result<OffsetMm, Degeneracy> {
    let dy = length * angle.sin();
    let dx = pythagorean_leg(length, dy)?;
    Ok(Offset::new(dx, dy))
}

fn nonzero_sin(angle: Angle, divisor: &'static str) -> Result<f64, Degeneracy> {
    let sin = angle.sin();
    if sin == 0.0 {
        Err(Degeneracy::ZeroDivisor { divisor })
    } else {
        Ok(sin)
    }
}

pub fn find_rear_wheel(params: &FrameParameters, origin: PtMm) -> PtMm {
    origin + Offset::new(-(params.wheelbase / 2.0), Length::ZERO)
}

pub fn find_front_wheel(params: &FrameParameters, origin: PtMm) -> PtMm {
    origin + Offset::new(params.wheelbase / 2.0, Length::ZERO)
}

pub fn find_bottom_bracket(
    params: &FrameParameters,
    rear_wheel: PtMm,
    method: BottomBracketMethod,
) -> Result<PtMm, Degeneracy> {
    let run = match method {
        BottomBracketMethod::Standard => Length(params.chainstay.raw().hypot(params.bb_drop.raw())),
        BottomBracketMethod::RightTriangle => pythagorean_leg(params.chainstay, params.bb_drop)?,
    };
    Ok(rear_wheel + Offset::new(run, params.bb_drop))
}

/// The rake offset resolved along the axle line.
pub fn find_steering_axis_bottom(
    params: &FrameParameters,
    front_wheel: PtMm,
) -> Result<PtMm, Degeneracy> {
    let sin = nonzero_sin(params.head_angle, "sin(head_angle)")?;
    Ok(front_wheel - Offset::new(params.fork_rake / sin, Length::ZERO))
}

pub fn find_steering_axis_top(
    params: &FrameParameters,
    bottom_bracket: PtMm,
    steering_axis_bottom: PtMm,
    method: SteeringAxisMethod,
) -> Result<PtMm, Degeneracy> {
    let rise = params.stack_above_axles();
    match method {
        SteeringAxisMethod::Direct => Ok(PtMm::new(
            bottom_bracket.x + params.reach,
            steering_axis_bottom.y - rise,
        )),
        SteeringAxisMethod::Triangulated => {
            let sin = nonzero_sin(params.head_angle, "sin(head_angle)")?;
            let axis_length = rise / sin;
            let run = pythagorean_leg(axis_length, rise)?;
            Ok(steering_axis_bottom - Offset::new(run, rise))
        }
    }
}

pub fn find_head_tube_bottom(
    params: &FrameParameters,
    steering_axis_top: PtMm,
) -> Result<PtMm, Degeneracy> {
    Ok(steering_axis_top + tube_offset(params.head_tube, params.head_angle)?)
}

pub fn find_seat_tube_top(
    params: &FrameParameters,
    bottom_bracket: PtMm,
) -> Result<PtMm, Degeneracy> {
    Ok(bottom_bracket - tube_offset(params.seat_tube_length, params.seat_angle)?)
}

/// Seat post continues the seat tube line for `post_length`.
pub fn find_seat_post_top(
    params: &FrameParameters,
    seat_tube_top: PtMm,
    post_length: Length,
) -> Result<PtMm, Degeneracy> {
    Ok(seat_tube_top - tube_offset(post_length, params.seat_angle)?)
}

/// Handlebar post continues the steering axis above the head tube for `post_length`.
pub fn find_handlebar_post_top(
    params: &FrameParameters,
    steering_axis_top: PtMm,
    post_length: Length,
) -> Result<PtMm, Degeneracy> {
    Ok(steering_axis_top - tube_offset(post_length, params.head_angle)?)
}

fn check_angle(field: Field, angle: Angle, point: FramePoint) -> Result<(), NotDrawable> {
    if angle.is_strictly_acute() {
        Ok(())
    } else {
        Err(NotDrawable::DegenerateGeometry {
            point,
            reason: Degeneracy::AngleOutOfRange { field, degrees: angle.raw() },
        })
    }
}

/// Derive every frame point. `origin` is the midpoint of the axle line.
pub fn compute_frame_points(
    params: &FrameParameters,
    origin: PtMm,
    options: &SolverOptions,
) -> Result<FramePoints, NotDrawable> {
    check_angle(Field::HeadAngle, params.head_angle, FramePoint::SteeringAxisBottom)?;
    check_angle(Field::SeatAngle, params.seat_angle, FramePoint::SeatTubeTop)?;

    let at = |point: FramePoint| move |reason: Degeneracy| NotDrawable::DegenerateGeometry { point, reason };

    let rear_wheel = find_rear_wheel(params, origin);
    let front_wheel = find_front_wheel(params, origin);
    let bottom_bracket = find_bottom_bracket(params, rear_wheel, options.bottom_bracket)
        .map_err(at(FramePoint::BottomBracket))?;
    let steering_axis_bottom =
        find_steering_axis_bottom(params, front_wheel).map_err(at(FramePoint::SteeringAxisBottom))?;
    let steering_axis_top =
        find_steering_axis_top(params, bottom_bracket, steering_axis_bottom, options.steering_axis)
            .map_err(at(FramePoint::SteeringAxisTop))?;
    let head_tube_bottom =
        find_head_tube_bottom(params, steering_axis_top).map_err(at(FramePoint::HeadTubeBottom))?;
    let seat_tube_top =
        find_seat_tube_top(params, bottom_bracket).map_err(at(FramePoint::SeatTubeTop))?;

    let (seat_post_top, handlebar_post_top) = match options.cockpit {
        Some(cockpit) => (
            Some(
                find_seat_post_top(params, seat_tube_top, cockpit.seat_post)
                    .map_err(at(FramePoint::SeatPostTop))?,
            ),
            Some(
                find_handlebar_post_top(params, steering_axis_top, cockpit.handlebar_post)
                    .map_err(at(FramePoint::HandlebarPostTop))?,
            ),
        ),
        None => (None, None),
    };

    let points = FramePoints {
        rear_wheel,
        front_wheel,
        bottom_bracket,
        steering_axis_bottom,
        steering_axis_top,
        head_tube_bottom,
        seat_tube_top,
        seat_post_top,
        handlebar_post_top,
    };

    if let Some((point, _)) = points.iter().find(|(_, p)| !p.is_finite()) {
        return Err(NotDrawable::DegenerateGeometry { point, reason: Degeneracy::NonFinite });
    }

    crate::log::debug!(
        bottom_bracket_x = points.bottom_bracket.x.raw(),
        steering_axis_top_x = points.steering_axis_top.x.raw(),
        steering_axis_top_y = points.steering_axis_top.y.raw(),
        "solved frame points"
    );

    Ok(points)
}

/// Validate a raw record and derive its points in one step.
pub fn frame_points(
    raw: &RawFrameParameters,
    origin: PtMm,
    options: &SolverOptions,
) -> Result<FramePoints, NotDrawable> {
    let params = raw.validate()?;
    compute_frame_points(&params, origin, options)
}

/// Whether `raw` yields a complete, finite frame under `options`.
pub fn is_drawable(raw: &RawFrameParameters, options: &SolverOptions) -> bool {
    frame_points(raw, PtMm::ORIGIN, options).is_ok()
}
