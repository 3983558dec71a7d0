//! SVG rendering for frame comparisons
//!
//! This module is organized into submodules:
//! - `layout`: placing bikes (overlay or grid) and fitting them to the viewport
//! - `parts`: the tubes, wheels and guidelines that make up one bike
//! - `svg`: document assembly and serialization

pub mod layout;
pub mod parts;
pub mod svg;

use crate::batch::SolvedBike;
use crate::defaults;
use crate::errors::RenderError;
use crate::types::BoxMm;
use layout::{FitTransform, place};
use parts::BikeDrawing;
use svg::generate_svg;

/// How several bikes share the drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Every bike pivots on the same bottom bracket
    #[default]
    Overlay,
    /// One cell per bike, in stack order
    Grid,
}

/// Render configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Viewport width in pixels
    pub width: f64,
    /// Viewport height in pixels
    pub height: f64,
    pub layout: LayoutMode,
    /// Share of the viewport the bikes may occupy, in (0, 1]
    pub fill_ratio: f64,
    pub grid: bool,
    pub guidelines: bool,
    pub labels: bool,
    /// Component colours, cycled in stack order. Empty means one colour for all.
    pub palette: Vec<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: defaults::VIEW_WIDTH,
            height: defaults::VIEW_HEIGHT,
            layout: LayoutMode::Overlay,
            fill_ratio: defaults::FILL_RATIO,
            grid: true,
            guidelines: true,
            labels: false,
            palette: defaults::PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl RenderOptions {
    fn validate(&self) -> Result<(), RenderError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.width) || !valid(self.height) {
            return Err(RenderError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        if !valid(self.fill_ratio) || self.fill_ratio > 1.0 {
            return Err(RenderError::InvalidFillRatio {
                value: self.fill_ratio,
            });
        }
        Ok(())
    }

    /// Component colour of the bike at `index`
    pub fn colour(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            defaults::COMPONENT_COLOR
        } else {
            &self.palette[index % self.palette.len()]
        }
    }
}

/// Render solved bikes to an SVG document.
///
/// Bikes are drawn in the order given; sort them by stack first for stable
/// colours. Zero bikes renders only the background.
pub fn render(bikes: &[SolvedBike], options: &RenderOptions) -> Result<String, miette::Report> {
    options.validate()?;

    let drawings: Vec<BikeDrawing> = place(bikes, options.layout)
        .iter()
        .map(|placement| {
            let label_slot = match options.layout {
                LayoutMode::Overlay => placement.index,
                LayoutMode::Grid => 0,
            };
            BikeDrawing::new(placement, options.colour(placement.index), label_slot, options)
        })
        .collect();

    let transform = if drawings.is_empty() {
        None
    } else {
        let mut bounds = BoxMm::new();
        for drawing in &drawings {
            bounds.expand_box(&drawing.bounds());
        }
        Some(FitTransform::fit(
            &bounds,
            options.width,
            options.height,
            options.fill_ratio,
        )?)
    };

    Ok(generate_svg(&drawings, transform.as_ref(), options)?)
}
