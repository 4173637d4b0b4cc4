#![warn(missing_docs)]
//! Per-element propagation parameter record consumed by the wavefront propagator.
use crate::{
    elements::BounceDirection,
    error::{HermesError, HermesResult},
};
use nalgebra::{Vector2, Vector3};
use strum::{Display, EnumIter, IntoEnumIterator};
use uom::si::{angle::radian, f64::Angle};

/// Number of slots of a flat propagation parameter record.
pub const NB_PROPAGATION_PARAMETERS: usize = 17;

/// Treatment of the quadratic phase term during propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter)]
pub enum PhaseTreatment {
    /// plain angular spectrum propagation
    Standard,
    /// semi-analytical treatment of the quadratic phase term
    #[default]
    SemiAnalytical,
    /// semi-analytical treatment with a special handling of the wavefront radius
    SemiAnalyticalSpecial,
    /// propagation from a waist
    FromWaist,
    /// propagation to a waist
    ToWaist,
}
impl PhaseTreatment {
    /// Numeric code in the parameter record.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Standard => 0,
            Self::SemiAnalytical => 1,
            Self::SemiAnalyticalSpecial => 2,
            Self::FromWaist => 3,
            Self::ToWaist => 4,
        }
    }
}
impl TryFrom<f64> for PhaseTreatment {
    type Error = HermesError;

    fn try_from(code: f64) -> HermesResult<Self> {
        Self::iter()
            .find(|t| f64::from(t.code()) == code)
            .ok_or_else(|| HermesError::Beamline(format!("unknown phase treatment code {code}")))
    }
}

/// Propagation parameters of a single beamline element.
///
/// The record is exported in a fixed slot order (see [`PropagationParameters::to_array`]):
///
/// | slot  | meaning                                                  |
/// |-------|----------------------------------------------------------|
/// | 0     | auto-resize before propagation                           |
/// | 1     | auto-resize after propagation                            |
/// | 2     | relative precision for resizing                          |
/// | 3     | treatment of the quadratic phase term ([`PhaseTreatment`]) |
/// | 4     | resize on the Fourier side                               |
/// | 5, 6  | horizontal range / resolution scale factor               |
/// | 7, 8  | vertical range / resolution scale factor                 |
/// | 9     | shift type                                               |
/// | 10,11 | new horizontal / vertical center                         |
/// | 12-14 | output optical axis in the input frame                   |
/// | 15,16 | horizontal base vector of the output frame               |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationParameters {
    auto_resize_before: f64,
    auto_resize_after: f64,
    resize_precision: f64,
    phase_treatment: PhaseTreatment,
    resize_on_fourier_side: f64,
    horizontal_range: f64,
    horizontal_resolution: f64,
    vertical_range: f64,
    vertical_resolution: f64,
    shift_type: f64,
    new_center: Vector2<f64>,
    output_axis: Vector3<f64>,
    output_horizontal_base: Vector2<f64>,
}
impl Default for PropagationParameters {
    fn default() -> Self {
        Self {
            auto_resize_before: 0.0,
            auto_resize_after: 0.0,
            resize_precision: 1.0,
            phase_treatment: PhaseTreatment::default(),
            resize_on_fourier_side: 0.0,
            horizontal_range: 1.0,
            horizontal_resolution: 1.0,
            vertical_range: 1.0,
            vertical_resolution: 1.0,
            shift_type: 0.0,
            new_center: Vector2::zeros(),
            output_axis: Vector3::zeros(),
            output_horizontal_base: Vector2::zeros(),
        }
    }
}
impl PropagationParameters {
    /// Set the treatment of the quadratic phase term.
    #[must_use]
    pub const fn with_phase_treatment(mut self, treatment: PhaseTreatment) -> Self {
        self.phase_treatment = treatment;
        self
    }
    /// Set the range and resolution scale factors `(horizontal, vertical)`.
    ///
    /// # Errors
    ///
    /// This function will return an error if a factor is not positive and finite.
    pub fn with_range_resolution(
        mut self,
        range: (f64, f64),
        resolution: (f64, f64),
    ) -> HermesResult<Self> {
        for factor in [range.0, range.1, resolution.0, resolution.1] {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(HermesError::Beamline(
                    "range and resolution factors must be positive and finite".into(),
                ));
            }
        }
        (self.horizontal_range, self.vertical_range) = range;
        (self.horizontal_resolution, self.vertical_resolution) = resolution;
        Ok(self)
    }
    /// Rotate the output frame for an element deflecting the beam by `deflection` into `direction`.
    #[must_use]
    pub fn with_deflection(mut self, direction: BounceDirection, deflection: Angle) -> Self {
        let (sin, cos) = deflection.get::<radian>().sin_cos();
        self.output_axis = match direction {
            BounceDirection::Up => Vector3::new(0.0, sin, cos),
            BounceDirection::Down => Vector3::new(0.0, -sin, cos),
            BounceDirection::Right => Vector3::new(sin, 0.0, cos),
            BounceDirection::Left => Vector3::new(-sin, 0.0, cos),
        };
        self.output_horizontal_base = if direction.is_horizontal() {
            Vector2::new(cos, 0.0)
        } else {
            Vector2::new(1.0, 0.0)
        };
        self
    }
    /// Returns the treatment of the quadratic phase term.
    #[must_use]
    pub const fn phase_treatment(&self) -> PhaseTreatment {
        self.phase_treatment
    }
    /// Returns the `(horizontal, vertical)` resolution scale factors.
    #[must_use]
    pub const fn resolution(&self) -> (f64, f64) {
        (self.horizontal_resolution, self.vertical_resolution)
    }
    /// Returns the `(horizontal, vertical)` range scale factors.
    #[must_use]
    pub const fn range(&self) -> (f64, f64) {
        (self.horizontal_range, self.vertical_range)
    }
    /// Returns the output optical axis in the input frame (zero if the frame is not rotated).
    #[must_use]
    pub const fn output_axis(&self) -> &Vector3<f64> {
        &self.output_axis
    }
    /// Flat record in propagator slot order.
    #[must_use]
    pub fn to_array(&self) -> [f64; NB_PROPAGATION_PARAMETERS] {
        [
            self.auto_resize_before,
            self.auto_resize_after,
            self.resize_precision,
            f64::from(self.phase_treatment.code()),
            self.resize_on_fourier_side,
            self.horizontal_range,
            self.horizontal_resolution,
            self.vertical_range,
            self.vertical_resolution,
            self.shift_type,
            self.new_center.x,
            self.new_center.y,
            self.output_axis.x,
            self.output_axis.y,
            self.output_axis.z,
            self.output_horizontal_base.x,
            self.output_horizontal_base.y,
        ]
    }
}
impl TryFrom<&[f64]> for PropagationParameters {
    type Error = HermesError;

    fn try_from(record: &[f64]) -> HermesResult<Self> {
        let r: &[f64; NB_PROPAGATION_PARAMETERS] = record.try_into().map_err(|_| {
            HermesError::Beamline(format!(
                "propagation parameter record must have {NB_PROPAGATION_PARAMETERS} entries, got {}",
                record.len()
            ))
        })?;
        if !r.iter().all(|v| v.is_finite()) {
            return Err(HermesError::Beamline(
                "propagation parameter record must only contain finite values".into(),
            ));
        }
        Ok(Self {
            auto_resize_before: r[0],
            auto_resize_after: r[1],
            resize_precision: r[2],
            phase_treatment: PhaseTreatment::try_from(r[3])?,
            resize_on_fourier_side: r[4],
            horizontal_range: r[5],
            horizontal_resolution: r[6],
            vertical_range: r[7],
            vertical_resolution: r[8],
            shift_type: r[9],
            new_center: Vector2::new(r[10], r[11]),
            output_axis: Vector3::new(r[12], r[13], r[14]),
            output_horizontal_base: Vector2::new(r[15], r[16]),
        })
    }
}
impl TryFrom<Vec<f64>> for PropagationParameters {
    type Error = HermesError;

    fn try_from(record: Vec<f64>) -> HermesResult<Self> {
        Self::try_from(record.as_slice())
    }
}
