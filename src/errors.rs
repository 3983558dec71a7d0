//! Error types with rich diagnostics using miette
//!
//! Routine "this bike cannot be drawn" outcomes are values (`NotDrawable`),
//! never panics; only malformed input documents are fatal (`LoadError`).

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::params::Field;
use crate::solver::FramePoint;

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source (filename or "<input>")
    pub name: String,
    /// The full source text
    pub source: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }

    /// Byte offset of a 1-based line/column pair, clamped to the source length.
    pub fn offset_of(&self, line: usize, column: usize) -> usize {
        let line_start: usize = self
            .source
            .split_inclusive('\n')
            .take(line.saturating_sub(1))
            .map(str::len)
            .sum();
        (line_start + column.saturating_sub(1)).min(self.source.len())
    }
}

// ============================================================================
// Parameter Errors
// ============================================================================

/// A single problem with one input field
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum FieldIssue {
    #[error("{field} is missing or not a number")]
    #[diagnostic(code(framegeo::params::missing_field))]
    Missing { field: Field },

    #[error("{field} is {value}, expected a finite number")]
    #[diagnostic(code(framegeo::params::non_finite))]
    NonFinite { field: Field, value: f64 },

    #[error("{field} is {value}, expected a positive length")]
    #[diagnostic(code(framegeo::params::not_positive))]
    NotPositive { field: Field, value: f64 },
}

impl FieldIssue {
    pub fn field(&self) -> Field {
        match self {
            FieldIssue::Missing { field }
            | FieldIssue::NonFinite { field, .. }
            | FieldIssue::NotPositive { field, .. } => *field,
        }
    }
}

// ============================================================================
// Geometry Errors
// ============================================================================

/// Why a derivation step could not produce a finite point
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Degeneracy {
    #[error("{field} of {degrees}° is outside the open interval (0°, 90°)")]
    AngleOutOfRange { field: Field, degrees: f64 },

    #[error("division by zero ({divisor})")]
    ZeroDivisor { divisor: &'static str },

    #[error("square root of negative value {radicand}")]
    NegativeRadicand { radicand: f64 },

    #[error("coordinate is not finite")]
    NonFinite,
}

// ============================================================================
// Drawability
// ============================================================================

/// Why a parameter set is not drawable
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum NotDrawable {
    #[error("{} frame parameter(s) missing or invalid", .issues.len())]
    #[diagnostic(
        code(framegeo::params::invalid),
        help("every geometry field must be present as a finite number")
    )]
    InvalidParameters {
        #[related]
        issues: Vec<FieldIssue>,
    },

    #[error("degenerate geometry at {point}: {reason}")]
    #[diagnostic(
        code(framegeo::geometry::degenerate),
        help("the parameter combination cannot describe a double-triangle frame")
    )]
    DegenerateGeometry { point: FramePoint, reason: Degeneracy },
}

impl NotDrawable {
    /// True when the record simply lacks data (as opposed to contradicting itself).
    pub fn is_missing_data(&self) -> bool {
        match self {
            NotDrawable::InvalidParameters { issues } => issues
                .iter()
                .any(|issue| matches!(issue, FieldIssue::Missing { .. })),
            NotDrawable::DegenerateGeometry { .. } => false,
        }
    }

    /// Fields reported as absent.
    pub fn missing_fields(&self) -> Vec<Field> {
        match self {
            NotDrawable::InvalidParameters { issues } => issues
                .iter()
                .filter(|issue| matches!(issue, FieldIssue::Missing { .. }))
                .map(FieldIssue::field)
                .collect(),
            NotDrawable::DegenerateGeometry { .. } => Vec::new(),
        }
    }
}

// ============================================================================
// Load Errors
// ============================================================================

/// Errors that occur while reading a bike data document
#[derive(Error, Diagnostic, Debug)]
pub enum LoadError {
    #[error("malformed bike data: {message}")]
    #[diagnostic(code(framegeo::load::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("parser stopped here")]
        span: SourceSpan,
    },

    #[error("bike data must be a JSON object or array, found {found}")]
    #[diagnostic(
        code(framegeo::load::unexpected_shape),
        help("use {{\"bike-id\": {{...}}}} or [{{...}}, ...]")
    )]
    UnexpectedShape { found: &'static str },

    #[error("record {id} is a JSON {found}, expected an object")]
    #[diagnostic(code(framegeo::load::record_not_object))]
    RecordNotObject { id: String, found: &'static str },
}

// ============================================================================
// Render Errors
// ============================================================================

/// Errors that occur during rendering
#[derive(Error, Diagnostic, Debug)]
pub enum RenderError {
    #[error("invalid viewport: {width}x{height}")]
    #[diagnostic(code(framegeo::render::invalid_viewport))]
    InvalidViewport { width: f64, height: f64 },

    #[error("invalid fill ratio: {value}")]
    #[diagnostic(
        code(framegeo::render::invalid_fill_ratio),
        help("the fill ratio must lie in (0, 1]")
    )]
    InvalidFillRatio { value: f64 },

    #[error("infinite or NaN in bounds")]
    #[diagnostic(code(framegeo::render::invalid_bounds))]
    InvalidBounds,

    #[error("XML serialization error: {message}")]
    #[diagnostic(code(framegeo::render::serialize))]
    Serialize { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_of_counts_lines_and_columns() {
        let ctx = SourceContext::new("bikes.json", "{\n  \"a\": 1,\n  oops\n}");
        assert_eq!(ctx.offset_of(1, 1), 0);
        assert_eq!(ctx.offset_of(2, 3), 4);
        assert_eq!(ctx.offset_of(3, 3), 14);
        assert_eq!(ctx.offset_of(99, 99), ctx.source.len());
    }

    #[test]
    fn missing_fields_are_reported() {
        let err = NotDrawable::InvalidParameters {
            issues: vec![
                FieldIssue::Missing { field: Field::HeadAngle },
                FieldIssue::NotPositive { field: Field::Chainstay, value: -4.0 },
            ],
        };
        assert!(err.is_missing_data());
        assert_eq!(err.missing_fields(), vec![Field::HeadAngle]);
        assert_eq!(err.to_string(), "2 frame parameter(s) missing or invalid");
        assert_eq!(err.related().map(|r| r.count()), Some(2));
    }

    #[test]
    fn degenerate_geometry_message_names_point() {
        let err = NotDrawable::DegenerateGeometry {
            point: FramePoint::SteeringAxisBottom,
            reason: Degeneracy::AngleOutOfRange { field: Field::HeadAngle, degrees: 0.0 },
        };
        assert!(!err.is_missing_data());
        assert_eq!(
            err.to_string(),
            "degenerate geometry at steering_axis_bottom: head_angle of 0° is outside the open interval (0°, 90°)"
        );
    }
}
