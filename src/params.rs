//! Frame geometry inputs.
//!
//! `RawFrameParameters` is whatever a data source managed to provide;
//! `FrameParameters` is the validated, typed record the solver consumes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{FieldIssue, NotDrawable};
use crate::types::{Angle, Length, NumericError};

/// The eleven named measurements of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Wheelbase,
    BbDrop,
    Chainstay,
    Stack,
    Reach,
    ForkRake,
    HeadAngle,
    HeadTube,
    SeatTubeLength,
    SeatAngle,
    WheelSize,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Wheelbase,
        Field::BbDrop,
        Field::Chainstay,
        Field::Stack,
        Field::Reach,
        Field::ForkRake,
        Field::HeadAngle,
        Field::HeadTube,
        Field::SeatTubeLength,
        Field::SeatAngle,
        Field::WheelSize,
    ];

    /// Key used in JSON bike records
    pub fn key(self) -> &'static str {
        match self {
            Field::Wheelbase => "wheelbase",
            Field::BbDrop => "bb_drop",
            Field::Chainstay => "chainstay",
            Field::Stack => "stack",
            Field::Reach => "reach",
            Field::ForkRake => "fork_rake",
            Field::HeadAngle => "head_angle",
            Field::HeadTube => "head_tube",
            Field::SeatTubeLength => "seat_tube_length",
            Field::SeatAngle => "seat_angle",
            Field::WheelSize => "wheel_size",
        }
    }

    pub fn is_angle(self) -> bool {
        matches!(self, Field::HeadAngle | Field::SeatAngle)
    }

    /// Lengths that only make sense when strictly positive.
    /// bb_drop may be negative (bottom-bracket rise); reach and rake may be zero.
    pub fn requires_positive(self) -> bool {
        matches!(
            self,
            Field::Wheelbase
                | Field::Chainstay
                | Field::Stack
                | Field::HeadTube
                | Field::SeatTubeLength
                | Field::WheelSize
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A possibly incomplete parameter record, as supplied by a loader or UI.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFrameParameters {
    pub wheelbase: Option<f64>,
    pub bb_drop: Option<f64>,
    pub chainstay: Option<f64>,
    pub stack: Option<f64>,
    pub reach: Option<f64>,
    pub fork_rake: Option<f64>,
    pub head_angle: Option<f64>,
    pub head_tube: Option<f64>,
    pub seat_tube_length: Option<f64>,
    pub seat_angle: Option<f64>,
    pub wheel_size: Option<f64>,
}

impl RawFrameParameters {
    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Wheelbase => self.wheelbase,
            Field::BbDrop => self.bb_drop,
            Field::Chainstay => self.chainstay,
            Field::Stack => self.stack,
            Field::Reach => self.reach,
            Field::ForkRake => self.fork_rake,
            Field::HeadAngle => self.head_angle,
            Field::HeadTube => self.head_tube,
            Field::SeatTubeLength => self.seat_tube_length,
            Field::SeatAngle => self.seat_angle,
            Field::WheelSize => self.wheel_size,
        }
    }

    pub fn set(&mut self, field: Field, value: Option<f64>) {
        let slot = match field {
            Field::Wheelbase => &mut self.wheelbase,
            Field::BbDrop => &mut self.bb_drop,
            Field::Chainstay => &mut self.chainstay,
            Field::Stack => &mut self.stack,
            Field::Reach => &mut self.reach,
            Field::ForkRake => &mut self.fork_rake,
            Field::HeadAngle => &mut self.head_angle,
            Field::HeadTube => &mut self.head_tube,
            Field::SeatTubeLength => &mut self.seat_tube_length,
            Field::SeatAngle => &mut self.seat_angle,
            Field::WheelSize => &mut self.wheel_size,
        };
        *slot = value;
    }

    /// Builder-style variant of [`set`](Self::set)
    pub fn with(mut self, field: Field, value: Option<f64>) -> Self {
        self.set(field, value);
        self
    }

    fn check(&self, field: Field) -> Result<f64, FieldIssue> {
        let value = self.get(field).ok_or(FieldIssue::Missing { field })?;
        let checked = if field.is_angle() {
            Angle::try_new(value).map(Angle::raw)
        } else if field.requires_positive() {
            Length::try_positive(value).map(Length::raw)
        } else {
            Length::try_new(value).map(Length::raw)
        };
        checked.map_err(|err| match err {
            NumericError::NaN | NumericError::Infinite => FieldIssue::NonFinite { field, value },
            NumericError::Zero | NumericError::Negative => FieldIssue::NotPositive { field, value },
        })
    }

    /// Validate every field, collecting all issues rather than stopping at the first.
    pub fn validate(&self) -> Result<FrameParameters, NotDrawable> {
        let mut values = [0.0; 11];
        let mut issues = Vec::new();
        for (slot, field) in values.iter_mut().zip(Field::ALL) {
            match self.check(field) {
                Ok(v) => *slot = v,
                Err(issue) => issues.push(issue),
            }
        }
        if !issues.is_empty() {
            return Err(NotDrawable::InvalidParameters { issues });
        }

        let [
            wheelbase,
            bb_drop,
            chainstay,
            stack,
            reach,
            fork_rake,
            head_angle,
            head_tube,
            seat_tube_length,
            seat_angle,
            wheel_size,
        ] = values;
        Ok(FrameParameters {
            wheelbase: Length(wheelbase),
            bb_drop: Length(bb_drop),
            chainstay: Length(chainstay),
            stack: Length(stack),
            reach: Length(reach),
            fork_rake: Length(fork_rake),
            head_angle: Angle(head_angle),
            head_tube: Length(head_tube),
            seat_tube_length: Length(seat_tube_length),
            seat_angle: Angle(seat_angle),
            wheel_size: Length(wheel_size),
        })
    }
}

impl From<FrameParameters> for RawFrameParameters {
    fn from(p: FrameParameters) -> Self {
        RawFrameParameters {
            wheelbase: Some(p.wheelbase.raw()),
            bb_drop: Some(p.bb_drop.raw()),
            chainstay: Some(p.chainstay.raw()),
            stack: Some(p.stack.raw()),
            reach: Some(p.reach.raw()),
            fork_rake: Some(p.fork_rake.raw()),
            head_angle: Some(p.head_angle.raw()),
            head_tube: Some(p.head_tube.raw()),
            seat_tube_length: Some(p.seat_tube_length.raw()),
            seat_angle: Some(p.seat_angle.raw()),
            wheel_size: Some(p.wheel_size.raw()),
        }
    }
}

/// Validated frame measurements. Every field is finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameParameters {
    /// Axle to axle
    pub wheelbase: Length,
    /// Bottom bracket below the axle line
    pub bb_drop: Length,
    /// Rear axle to bottom bracket centre
    pub chainstay: Length,
    /// Bottom bracket to head tube top, vertical
    pub stack: Length,
    /// Bottom bracket to head tube top, horizontal
    pub reach: Length,
    /// Front axle offset from the steering axis
    pub fork_rake: Length,
    pub head_angle: Angle,
    pub head_tube: Length,
    pub seat_tube_length: Length,
    pub seat_angle: Angle,
    /// Wheel radius; only used for drawing
    pub wheel_size: Length,
}

impl FrameParameters {
    /// Height of the head tube top above the axle line.
    pub fn stack_above_axles(&self) -> Length {
        self.stack - self.bb_drop
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// The reference road bike used throughout the test suite.
    pub(crate) fn reference_raw() -> RawFrameParameters {
        RawFrameParameters {
            wheelbase: Some(995.0),
            bb_drop: Some(70.0),
            chainstay: Some(410.0),
            stack: Some(543.0),
            reach: Some(390.0),
            fork_rake: Some(45.0),
            head_angle: Some(70.0),
            head_tube: Some(140.0),
            seat_tube_length: Some(520.0),
            seat_angle: Some(74.0),
            wheel_size: Some(340.0),
        }
    }

    pub(crate) fn reference() -> FrameParameters {
        reference_raw().validate().unwrap()
    }

    #[test]
    fn field_keys_are_unique() {
        let mut keys: Vec<_> = Field::ALL.iter().map(|f| f.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 11);
    }

    #[test]
    fn get_and_set_address_the_same_slot() {
        for field in Field::ALL {
            let raw = RawFrameParameters::default().with(field, Some(1.5));
            assert_eq!(raw.get(field), Some(1.5), "{field}");
            let others = Field::ALL.iter().filter(|f| **f != field);
            assert!(others.map(|f| raw.get(*f)).all(|v| v.is_none()));
        }
    }

    #[test]
    fn validate_reference_bike() {
        let params = reference();
        assert_eq!(params.wheelbase, Length(995.0));
        assert_eq!(params.head_angle, Angle(70.0));
        assert_eq!(params.stack_above_axles(), Length(473.0));
    }

    #[test]
    fn validate_reports_every_missing_field() {
        let raw = reference_raw()
            .with(Field::HeadAngle, None)
            .with(Field::WheelSize, None);
        let err = raw.validate().unwrap_err();
        assert_eq!(err.missing_fields(), vec![Field::HeadAngle, Field::WheelSize]);
    }

    #[test]
    fn validate_rejects_non_finite_values() {
        let raw = reference_raw().with(Field::Reach, Some(f64::NAN));
        match raw.validate() {
            Err(NotDrawable::InvalidParameters { issues }) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].field(), Field::Reach);
                assert!(matches!(issues[0], FieldIssue::NonFinite { .. }));
            }
            other => panic!("expected invalid parameters, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_non_positive_lengths() {
        let raw = reference_raw().with(Field::Chainstay, Some(0.0));
        let err = raw.validate().unwrap_err();
        assert_eq!(
            err,
            NotDrawable::InvalidParameters {
                issues: vec![FieldIssue::NotPositive { field: Field::Chainstay, value: 0.0 }],
            }
        );
    }

    #[test]
    fn validate_classifies_angles_and_negative_lengths() {
        let raw = reference_raw()
            .with(Field::HeadAngle, Some(f64::INFINITY))
            .with(Field::Wheelbase, Some(-995.0))
            .with(Field::SeatAngle, Some(-74.0));
        let err = raw.validate().unwrap_err();
        assert_eq!(
            err,
            NotDrawable::InvalidParameters {
                issues: vec![
                    FieldIssue::NotPositive { field: Field::Wheelbase, value: -995.0 },
                    FieldIssue::NonFinite { field: Field::HeadAngle, value: f64::INFINITY },
                ],
            }
        );
    }

    #[test]
    fn validate_allows_bottom_bracket_rise_and_zero_rake() {
        let raw = reference_raw()
            .with(Field::BbDrop, Some(-10.0))
            .with(Field::ForkRake, Some(0.0));
        assert!(raw.validate().is_ok());
    }

    #[test]
    fn raw_round_trips_through_validated() {
        let raw = RawFrameParameters::from(reference());
        assert_eq!(raw, reference_raw());
    }

    #[test]
    fn deserializes_partial_records() {
        let raw: RawFrameParameters =
            serde_json::from_str(r#"{"stack": 560, "reach": 385}"#).unwrap();
        assert_eq!(raw.stack, Some(560.0));
        assert_eq!(raw.reach, Some(385.0));
        assert_eq!(raw.head_angle, None);
    }
}
