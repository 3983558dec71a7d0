//! Drawable frame parts
//!
//! A bike drawing is a list of parts. Each part knows its model-space bounds
//! and how to emit itself as an SVG node once the fit transform is known.
//!
//! Parts come in three weights:
//! - measured: tubes and wheels the geometry chart actually specifies
//! - estimated: tubes inferred from the measured ones (down tube, seat stay, posts)
//! - guideline: construction lines for the measurements themselves

use enum_dispatch::enum_dispatch;
use facet_svg::{Circle as SvgCircle, Line as SvgLine, SvgNode, Text as SvgText};

use super::RenderOptions;
use super::layout::{FitTransform, Placement};
use super::svg::{fmt_num, round_px};
use crate::defaults;
use crate::types::{BoxMm, Length, Offset, PtMm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartRole {
    Measured,
    Estimated,
    Guideline,
    Label,
}

impl PartRole {
    /// CSS class shared by every part of this role
    pub fn class(self) -> &'static str {
        match self {
            PartRole::Measured => "measured",
            PartRole::Estimated => "estimated",
            PartRole::Guideline => "guideline",
            PartRole::Label => "label",
        }
    }
}

/// What a part needs to know to render itself
pub struct PartRenderContext<'a> {
    pub transform: &'a FitTransform,
    /// Component colour of the bike being drawn
    pub colour: &'a str,
}

/// Stroke attributes, already converted to pixels
struct Stroke {
    colour: String,
    width: String,
    dash: Option<String>,
    opacity: Option<String>,
}

impl Stroke {
    fn for_role(role: PartRole, ctx: &PartRenderContext<'_>) -> Self {
        let px = |l: Length| fmt_num(ctx.transform.length(l));
        match role {
            PartRole::Measured => Stroke {
                colour: ctx.colour.to_string(),
                width: px(defaults::MEASURED_STROKE_WIDTH),
                dash: None,
                opacity: Some(fmt_num(defaults::MEASURED_OPACITY)),
            },
            PartRole::Estimated => {
                let dash = px(defaults::ESTIMATED_DASH);
                Stroke {
                    colour: ctx.colour.to_string(),
                    width: px(defaults::ESTIMATED_STROKE_WIDTH),
                    dash: Some(format!("{dash} {dash}")),
                    opacity: None,
                }
            }
            PartRole::Guideline | PartRole::Label => Stroke {
                colour: defaults::GUIDELINE_COLOR.to_string(),
                width: px(defaults::GUIDELINE_STROKE_WIDTH),
                dash: None,
                opacity: None,
            },
        }
    }
}

fn class_attr(role: PartRole, name: &str) -> Option<String> {
    Some(format!("{} {}", role.class(), name))
}

/// Common behaviour for all parts
#[enum_dispatch]
pub trait Part {
    /// Short name, also emitted as a CSS class
    fn name(&self) -> &str;

    fn role(&self) -> PartRole;

    /// Model-space extent, strokes excluded
    fn bounds(&self) -> BoxMm;

    fn render_svg(&self, ctx: &PartRenderContext<'_>) -> SvgNode;
}

/// A straight tube or construction line
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub name: &'static str,
    pub role: PartRole,
    pub from: PtMm,
    pub to: PtMm,
}

impl Segment {
    pub fn new(name: &'static str, role: PartRole, from: PtMm, to: PtMm) -> Self {
        Self { name, role, from, to }
    }
}

impl Part for Segment {
    fn name(&self) -> &str {
        self.name
    }

    fn role(&self) -> PartRole {
        self.role
    }

    fn bounds(&self) -> BoxMm {
        let mut bounds = BoxMm::new();
        bounds.expand_point(self.from);
        bounds.expand_point(self.to);
        bounds
    }

    fn render_svg(&self, ctx: &PartRenderContext<'_>) -> SvgNode {
        let from = ctx.transform.apply(self.from);
        let to = ctx.transform.apply(self.to);
        let stroke = Stroke::for_role(self.role, ctx);
        SvgNode::Line(SvgLine {
            x1: Some(round_px(from.x)),
            y1: Some(round_px(from.y)),
            x2: Some(round_px(to.x)),
            y2: Some(round_px(to.y)),
            class: class_attr(self.role, self.name),
            stroke: Some(stroke.colour),
            stroke_width: Some(stroke.width),
            stroke_dasharray: stroke.dash,
            stroke_linecap: Some("round".to_string()),
            opacity: stroke.opacity,
        })
    }
}

/// A wheel or the bottom-bracket shell
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub name: &'static str,
    pub role: PartRole,
    pub centre: PtMm,
    pub radius: Length,
}

impl Ring {
    pub fn new(name: &'static str, role: PartRole, centre: PtMm, radius: Length) -> Self {
        Self { name, role, centre, radius }
    }
}

impl Part for Ring {
    fn name(&self) -> &str {
        self.name
    }

    fn role(&self) -> PartRole {
        self.role
    }

    fn bounds(&self) -> BoxMm {
        let mut bounds = BoxMm::new();
        bounds.expand_circle(self.centre, self.radius);
        bounds
    }

    fn render_svg(&self, ctx: &PartRenderContext<'_>) -> SvgNode {
        let centre = ctx.transform.apply(self.centre);
        let stroke = Stroke::for_role(self.role, ctx);
        SvgNode::Circle(SvgCircle {
            cx: Some(round_px(centre.x)),
            cy: Some(round_px(centre.y)),
            r: Some(round_px(ctx.transform.length(self.radius.abs()))),
            class: class_attr(self.role, self.name),
            fill: Some("none".to_string()),
            stroke: Some(stroke.colour),
            stroke_width: Some(stroke.width),
            stroke_dasharray: stroke.dash,
            opacity: stroke.opacity,
        })
    }
}

/// The bike's identifier, written under its wheels
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub at: PtMm,
}

impl Part for Label {
    fn name(&self) -> &str {
        "name"
    }

    fn role(&self) -> PartRole {
        PartRole::Label
    }

    fn bounds(&self) -> BoxMm {
        let mut bounds = BoxMm::new();
        bounds.expand_point(self.at);
        bounds
    }

    fn render_svg(&self, ctx: &PartRenderContext<'_>) -> SvgNode {
        let at = ctx.transform.apply(self.at);
        SvgNode::Text(SvgText {
            x: Some(round_px(at.x)),
            y: Some(round_px(at.y)),
            class: class_attr(PartRole::Label, self.name()),
            fill: Some(ctx.colour.to_string()),
            font_size: Some(fmt_num(ctx.transform.length(defaults::LABEL_FONT_SIZE))),
            text_anchor: Some("middle".to_string()),
            dominant_baseline: Some("central".to_string()),
            content: self.text.clone(),
        })
    }
}

#[enum_dispatch(Part)]
#[derive(Debug, Clone, PartialEq)]
pub enum PartShape {
    Segment(Segment),
    Ring(Ring),
    Label(Label),
}

/// Every part of one bike, positioned in model space
#[derive(Debug, Clone)]
pub struct BikeDrawing {
    pub id: String,
    pub colour: String,
    pub parts: Vec<PartShape>,
}

impl BikeDrawing {
    /// `label_slot` stacks labels of overlaid bikes beneath one another.
    pub fn new(placement: &Placement<'_>, colour: &str, label_slot: usize, options: &RenderOptions) -> Self {
        use PartRole::{Estimated, Guideline, Measured};

        let p = &placement.points;
        let params = &placement.bike.params;
        let mut parts: Vec<PartShape> = Vec::new();

        if options.guidelines {
            let axle_y = p.rear_wheel.y;
            let drop_top = PtMm::new(p.bottom_bracket.x, axle_y);
            let stack_top = p.bottom_bracket - Offset::new(Length::ZERO, params.stack);
            parts.push(Segment::new("wheelbase", Guideline, p.rear_wheel, p.front_wheel).into());
            parts.push(Segment::new("bb-drop", Guideline, drop_top, drop_top + Offset::new(Length::ZERO, params.bb_drop)).into());
            parts.push(Segment::new("stack", Guideline, p.bottom_bracket, stack_top).into());
            parts.push(Segment::new("steering-axis", Guideline, p.steering_axis_bottom, p.steering_axis_top).into());
        }

        parts.push(Ring::new("bottom-bracket", Measured, p.bottom_bracket, defaults::BOTTOM_BRACKET_RADIUS).into());
        parts.push(Segment::new("chainstay", Measured, p.bottom_bracket, p.rear_wheel).into());
        parts.push(Segment::new("head-tube", Measured, p.steering_axis_top, p.head_tube_bottom).into());
        parts.push(Segment::new("seat-tube", Measured, p.bottom_bracket, p.seat_tube_top).into());
        parts.push(Segment::new("fork", Measured, p.head_tube_bottom, p.front_wheel).into());
        parts.push(Segment::new("top-tube", Measured, p.seat_tube_top, p.steering_axis_top).into());
        parts.push(Ring::new("rear-wheel", Measured, p.rear_wheel, params.wheel_size).into());
        parts.push(Ring::new("front-wheel", Measured, p.front_wheel, params.wheel_size).into());

        parts.push(Segment::new("down-tube", Estimated, p.bottom_bracket, p.down_tube_top()).into());
        parts.push(Segment::new("seat-stay", Estimated, p.rear_wheel, p.seat_tube_top).into());
        if let Some(top) = p.seat_post_top {
            parts.push(Segment::new("seat-post", Estimated, p.seat_tube_top, top).into());
        }
        if let Some(top) = p.handlebar_post_top {
            parts.push(Segment::new("handlebar-post", Estimated, p.steering_axis_top, top).into());
        }

        if options.labels {
            let line = defaults::LABEL_FONT_SIZE * 1.25;
            let below_wheels = p.rear_wheel.y + params.wheel_size + line * (label_slot + 1) as f64;
            let at = PtMm::new(p.bottom_bracket.x, below_wheels);
            parts.push(
                Label {
                    text: placement.bike.id.clone(),
                    at,
                }
                .into(),
            );
        }

        Self {
            id: placement.bike.id.clone(),
            colour: colour.to_string(),
            parts,
        }
    }

    pub fn bounds(&self) -> BoxMm {
        let mut bounds = BoxMm::new();
        for part in &self.parts {
            bounds.expand_box(&part.bounds());
        }
        bounds
    }

    pub fn parts_with_role(&self, role: PartRole) -> impl Iterator<Item = &PartShape> + '_ {
        self.parts.iter().filter(move |part| part.role() == role)
    }
}
