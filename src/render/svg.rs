//! SVG generation

use std::collections::HashSet;

use facet_svg::{Group, Line, SVG_NS, Style, Svg, SvgNode, facet_xml};

use super::RenderOptions;
use super::layout::FitTransform;
use super::parts::{BikeDrawing, Part, PartRenderContext, PartRole};
use crate::defaults;
use crate::errors::RenderError;

/// Round a pixel coordinate to a thousandth, enough for any screen.
pub(crate) fn round_px(value: f64) -> f64 {
    let rounded = (value * 1000.0).round() / 1000.0;
    // Avoid emitting "-0"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Format a number with 6 significant figures, trailing zeros trimmed.
pub(crate) fn fmt_num(value: f64) -> String {
    fmt_num_precision(value, 6)
}

fn fmt_num_precision(value: f64, sig_figs: i32) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }

    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10_f64.powi(sig_figs - 1 - magnitude);
    let rounded = (value * scale).round() / scale;

    let decimals = (sig_figs - 1 - magnitude).max(0) as usize;
    let s = format!("{:.prec$}", rounded, prec = decimals);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };
    s.to_string()
}

/// Hover highlight for measured parts
fn generate_hover_css() -> Style {
    Style {
        type_: Some("text/css".to_string()),
        content: format!(
            ".measured:hover {{ stroke: {}; }}",
            defaults::HOVERED_COLOR
        ),
    }
}

/// Background grid at every tenth of the viewport, edges excluded
fn generate_grid_lines(width: f64, height: f64) -> Group {
    let line = |x1: f64, y1: f64, x2: f64, y2: f64| {
        SvgNode::Line(Line {
            x1: Some(round_px(x1)),
            y1: Some(round_px(y1)),
            x2: Some(round_px(x2)),
            y2: Some(round_px(y2)),
            class: Some("gridline".to_string()),
            stroke: Some(defaults::GRIDLINE_COLOR.to_string()),
            stroke_width: Some("1".to_string()),
            ..Default::default()
        })
    };

    let divisions = defaults::GRID_DIVISIONS;
    let mut children = Vec::with_capacity(2 * (divisions - 1));
    for i in 1..divisions {
        let t = i as f64 / divisions as f64;
        children.push(line(width * t, 0.0, width * t, height));
        children.push(line(0.0, height * t, width, height * t));
    }

    Group {
        id: Some("grid".to_string()),
        children,
        ..Default::default()
    }
}

/// Turn a bike id into something usable as an XML id.
fn element_id(id: &str) -> String {
    let slug: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("bike-{slug}")
}

/// One element id per drawing; colliding slugs get `-2`, `-3`, ... appended.
fn unique_element_ids(drawings: &[BikeDrawing]) -> Vec<String> {
    let mut seen = HashSet::new();
    drawings
        .iter()
        .map(|drawing| {
            let base = element_id(&drawing.id);
            let mut id = base.clone();
            let mut n = 2;
            while !seen.insert(id.clone()) {
                id = format!("{base}-{n}");
                n += 1;
            }
            id
        })
        .collect()
}

fn render_bike(drawing: &BikeDrawing, element_id: String, transform: &FitTransform) -> Group {
    let ctx = PartRenderContext {
        transform,
        colour: &drawing.colour,
    };

    let role_group = |role: PartRole| -> Option<SvgNode> {
        let children: Vec<SvgNode> = drawing
            .parts_with_role(role)
            .map(|part| part.render_svg(&ctx))
            .collect();
        (!children.is_empty()).then(|| {
            SvgNode::G(Group {
                class: Some(role.class().to_string()),
                children,
                ..Default::default()
            })
        })
    };

    // Guidelines underneath, labels on top
    let children = [
        PartRole::Guideline,
        PartRole::Measured,
        PartRole::Estimated,
        PartRole::Label,
    ]
    .into_iter()
    .filter_map(role_group)
    .collect();

    Group {
        id: Some(element_id),
        class: Some("bike".to_string()),
        transform: None,
        children,
    }
}

/// Assemble and serialize the document. `transform` is `None` only when
/// there is nothing to draw.
pub fn generate_svg(
    drawings: &[BikeDrawing],
    transform: Option<&FitTransform>,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    let mut children = vec![SvgNode::Style(generate_hover_css())];

    if options.grid {
        children.push(SvgNode::G(generate_grid_lines(options.width, options.height)));
    }

    if let Some(transform) = transform {
        for (drawing, id) in drawings.iter().zip(unique_element_ids(drawings)) {
            children.push(SvgNode::G(render_bike(drawing, id, transform)));
        }
    }

    crate::log::debug!(
        bikes = drawings.len(),
        width = options.width,
        height = options.height,
        "generate_svg"
    );

    let svg = Svg {
        xmlns: Some(SVG_NS.to_string()),
        width: Some(fmt_num(options.width)),
        height: Some(fmt_num(options.height)),
        view_box: Some(format!(
            "0 0 {} {}",
            fmt_num(options.width),
            fmt_num(options.height)
        )),
        children,
    };

    facet_xml::to_string(&svg).map_err(|e| RenderError::Serialize {
        message: e.to_string(),
    })
}
