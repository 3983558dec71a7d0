//! Default sizes and settings (lengths in millimetres, like the geometry charts)

use crate::types::Length;

// Cockpit
pub const SEAT_POST_LENGTH: Length = Length::mm(140.0);
pub const HANDLEBAR_POST_LENGTH: Length = Length::mm(100.0);

/// How far down the head tube (from its top) an estimated down tube ends.
pub const DOWN_TUBE_HEAD_TUBE_FRACTION: f64 = 0.8;

// Part strokes
pub const BOTTOM_BRACKET_RADIUS: Length = Length::mm(5.0);
pub const MEASURED_STROKE_WIDTH: Length = Length::mm(7.0);
pub const MEASURED_OPACITY: f64 = 0.3;
pub const ESTIMATED_STROKE_WIDTH: Length = Length::mm(2.0);
pub const ESTIMATED_DASH: Length = Length::mm(7.0);
pub const GUIDELINE_STROKE_WIDTH: Length = Length::mm(1.0);
pub const LABEL_FONT_SIZE: Length = Length::mm(40.0);

// Colours
pub const GRIDLINE_COLOR: &str = "#f9f1e0";
pub const GUIDELINE_COLOR: &str = "#be639c";
pub const HOVERED_COLOR: &str = "#0093be";
pub const COMPONENT_COLOR: &str = "#00BE5B";
pub const PALETTE: [&str; 9] = [
    "aqua", "red", "lime", "fuchsia", "yellow", "maroon", "teal", "blue", "green",
];

// Layout
pub const VIEW_WIDTH: f64 = 800.0;
pub const VIEW_HEIGHT: f64 = 600.0;
pub const FILL_RATIO: f64 = 0.8;
/// Centre-to-centre spacing of bikes in grid layout
pub const GRID_PITCH: Length = Length::mm(2000.0);
/// Grid lines sit at every tenth of the viewport, edges excluded.
pub const GRID_DIVISIONS: usize = 10;
