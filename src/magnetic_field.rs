#![warn(missing_docs)]
//! Undulator field description and its placement in a magnetic field container.
use crate::{
    electron_beam::ParticleBeam,
    error::{HermesError, HermesResult},
    photon::HC_EV_M,
};
use log::warn;
use nalgebra::Point3;
use strum::{AsRefStr, Display};
use uom::si::{
    angle::radian,
    energy::electronvolt,
    f64::{Angle, Energy, Length, MagneticFluxDensity},
    length::meter,
    magnetic_flux_density::tesla,
};

/// `e / (2π mₑ c)` in 1/(T·m), converts peak field times period into the deflection parameter.
const DEFLECTION_PARAMETER_FACTOR: f64 = 93.372_9;

/// Symmetry of the field of one undulator plane with respect to the longitudinal center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum FieldSymmetry {
    /// symmetric field (`+1`)
    Symmetric,
    /// anti-symmetric field (`-1`)
    AntiSymmetric,
}
impl FieldSymmetry {
    /// Numeric flag as understood by the field solver.
    #[must_use]
    pub const fn flag(self) -> i32 {
        match self {
            Self::Symmetric => 1,
            Self::AntiSymmetric => -1,
        }
    }
}
impl TryFrom<i32> for FieldSymmetry {
    type Error = HermesError;

    fn try_from(value: i32) -> HermesResult<Self> {
        match value {
            1 => Ok(Self::Symmetric),
            -1 => Ok(Self::AntiSymmetric),
            _ => Err(HermesError::MagneticField(format!(
                "symmetry flag must be 1 or -1, got {value}"
            ))),
        }
    }
}

/// Field of one undulator plane: peak field, phase and symmetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicField {
    /// peak magnetic field
    pub peak: MagneticFluxDensity,
    /// initial phase
    pub phase: Angle,
    /// longitudinal symmetry
    pub symmetry: FieldSymmetry,
}
impl HarmonicField {
    /// A field plane without any field.
    #[must_use]
    pub fn none() -> Self {
        Self {
            peak: MagneticFluxDensity::new::<tesla>(0.0),
            phase: Angle::new::<radian>(0.0),
            symmetry: FieldSymmetry::AntiSymmetric,
        }
    }
}

/// Periodic sinusoidal undulator.
#[derive(Debug, Clone, PartialEq)]
pub struct Undulator {
    period: Length,
    length: Length,
    horizontal: HarmonicField,
    vertical: HarmonicField,
}
impl Undulator {
    /// Creates a new sinusoidal [`Undulator`] with the given period, total length and field planes.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the period is not positive and finite.
    ///   - the length is shorter than one period or not finite.
    ///   - a peak field is not finite.
    pub fn new(
        period: Length,
        length: Length,
        horizontal: HarmonicField,
        vertical: HarmonicField,
    ) -> HermesResult<Self> {
        if !period.is_finite() || period.get::<meter>() <= 0.0 {
            return Err(HermesError::MagneticField(
                "undulator period must be positive and finite".into(),
            ));
        }
        if !length.is_finite() || length < period {
            return Err(HermesError::MagneticField(
                "undulator length must be finite and at least one period".into(),
            ));
        }
        if !(horizontal.peak.is_finite() && vertical.peak.is_finite()) {
            return Err(HermesError::MagneticField(
                "undulator peak fields must be finite".into(),
            ));
        }
        if horizontal.peak.get::<tesla>() == 0.0 && vertical.peak.get::<tesla>() == 0.0 {
            warn!("undulator without any magnetic field");
        }
        Ok(Self {
            period,
            length,
            horizontal,
            vertical,
        })
    }
    /// Creates a planar undulator with a vertical field only (horizontal deflection).
    ///
    /// # Errors
    ///
    /// This function will return an error under the same conditions as [`Undulator::new`].
    pub fn planar(
        period: Length,
        nb_periods: u32,
        peak_field: MagneticFluxDensity,
    ) -> HermesResult<Self> {
        Self::new(
            period,
            period * f64::from(nb_periods),
            HarmonicField::none(),
            HarmonicField {
                peak: peak_field,
                ..HarmonicField::none()
            },
        )
    }
    /// Returns the period of this [`Undulator`].
    #[must_use]
    pub const fn period(&self) -> Length {
        self.period
    }
    /// Returns the total length of this [`Undulator`].
    #[must_use]
    pub const fn length(&self) -> Length {
        self.length
    }
    /// Returns the horizontal field plane.
    #[must_use]
    pub const fn horizontal(&self) -> &HarmonicField {
        &self.horizontal
    }
    /// Returns the vertical field plane.
    #[must_use]
    pub const fn vertical(&self) -> &HarmonicField {
        &self.vertical
    }
    /// Number of periods (`length / period`).
    #[must_use]
    pub fn nb_periods(&self) -> f64 {
        (self.length / self.period).value
    }
    /// Deflection parameter `K = e·B·λu / (2π·mₑ·c)` combining both field planes.
    #[must_use]
    pub fn deflection_parameter(&self) -> f64 {
        let lambda_u = self.period.get::<meter>();
        let kx = DEFLECTION_PARAMETER_FACTOR * self.horizontal.peak.get::<tesla>() * lambda_u;
        let ky = DEFLECTION_PARAMETER_FACTOR * self.vertical.peak.get::<tesla>() * lambda_u;
        kx.hypot(ky)
    }
    /// Photon energy of the fundamental on axis, `E₁ = 2γ²hc / (λu(1 + K²/2))`.
    #[must_use]
    pub fn fundamental_energy(&self, beam: &ParticleBeam) -> Energy {
        let k = self.deflection_parameter();
        let gamma = beam.gamma();
        Energy::new::<electronvolt>(
            2.0 * gamma * gamma * HC_EV_M
                / (self.period.get::<meter>() * (1.0 + 0.5 * k * k)),
        )
    }
    /// Longitudinal position upstream of the undulator center where the trajectory calculation starts.
    ///
    /// The start lies `margin_periods` periods (split on both sides) outside the magnetic length:
    /// `-λu·(N + margin_periods)/2`.
    #[must_use]
    pub fn upstream_start(&self, margin_periods: f64) -> Length {
        -(self.period * (0.5 * (self.nb_periods() + margin_periods)))
    }
}

/// A magnetic field placed at a center position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedField {
    /// the field
    pub undulator: Undulator,
    /// center of the field
    pub center: Point3<Length>,
}

/// Container of (placed) magnetic fields consumed by the field solver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MagneticFieldContainer {
    fields: Vec<PlacedField>,
}
impl MagneticFieldContainer {
    /// Creates a container holding a single undulator centered at the origin.
    #[must_use]
    pub fn single(undulator: Undulator) -> Self {
        let origin = Length::new::<meter>(0.0);
        Self {
            fields: vec![PlacedField {
                undulator,
                center: Point3::new(origin, origin, origin),
            }],
        }
    }
    /// Add an undulator with the given center to this [`MagneticFieldContainer`].
    ///
    /// # Errors
    ///
    /// This function will return an error if a center coordinate is not finite.
    pub fn add(&mut self, undulator: Undulator, center: Point3<Length>) -> HermesResult<()> {
        if !(center.x.is_finite() && center.y.is_finite() && center.z.is_finite()) {
            return Err(HermesError::MagneticField(
                "center of a magnetic field must be finite".into(),
            ));
        }
        self.fields.push(PlacedField { undulator, center });
        Ok(())
    }
    /// Returns the fields of this [`MagneticFieldContainer`].
    #[must_use]
    pub fn fields(&self) -> &[PlacedField] {
        &self.fields
    }
    /// Returns `true` if this container holds no field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
