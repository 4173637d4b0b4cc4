#![warn(missing_docs)]
//! Precision parameters of the synchrotron radiation field calculation.
use crate::error::{HermesError, HermesResult};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use uom::si::{f64::Length, length::meter};

/// Method used by the field solver to integrate the synchrotron radiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SrMethod {
    /// manual integration with user defined bounds
    Manual,
    /// automatic integration tuned for undulator radiation
    #[default]
    AutoUndulator,
    /// automatic integration tuned for wiggler radiation
    AutoWiggler,
}
impl SrMethod {
    /// Numeric method code of the field solver.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Manual => 0,
            Self::AutoUndulator => 1,
            Self::AutoWiggler => 2,
        }
    }
}

/// Precision record of the synchrotron radiation calculation.
///
/// Exported as a 7-slot array (see [`SrPrecision::to_array`]).
#[derive(Debug, Clone, PartialEq)]
pub struct SrPrecision {
    method: SrMethod,
    relative_precision: f64,
    integration_start: Length,
    integration_end: Length,
    nb_trajectory_points: u32,
    use_terminating_terms: bool,
    sampling_factor: f64,
}
impl Default for SrPrecision {
    fn default() -> Self {
        Self {
            method: SrMethod::AutoUndulator,
            relative_precision: 0.01,
            integration_start: Length::new::<meter>(0.0),
            integration_end: Length::new::<meter>(0.0),
            nb_trajectory_points: 30_000,
            use_terminating_terms: true,
            sampling_factor: 0.2,
        }
    }
}
impl SrPrecision {
    /// Creates a new [`SrPrecision`] with the given method, relative precision and sampling factor.
    ///
    /// The remaining entries keep their default values.
    ///
    /// # Errors
    ///
    /// This function will return an error if the relative precision is not positive and finite or the
    /// sampling factor is negative or not finite.
    pub fn new(
        method: SrMethod,
        relative_precision: f64,
        sampling_factor: f64,
    ) -> HermesResult<Self> {
        if !relative_precision.is_finite() || relative_precision <= 0.0 {
            return Err(HermesError::Config(
                "relative precision must be positive and finite".into(),
            ));
        }
        if !sampling_factor.is_finite() || sampling_factor < 0.0 {
            return Err(HermesError::Config(
                "sampling factor must be positive and finite".into(),
            ));
        }
        Ok(Self {
            method,
            relative_precision,
            sampling_factor,
            ..Self::default()
        })
    }
    /// Restrict the longitudinal integration range (only effective if `start < end`).
    ///
    /// # Errors
    ///
    /// This function will return an error if a bound is not finite.
    pub fn with_integration_range(mut self, start: Length, end: Length) -> HermesResult<Self> {
        if !(start.is_finite() && end.is_finite()) {
            return Err(HermesError::Config(
                "integration bounds must be finite".into(),
            ));
        }
        self.integration_start = start;
        self.integration_end = end;
        Ok(self)
    }
    /// Set the number of points of the electron trajectory calculation.
    ///
    /// # Errors
    ///
    /// This function will return an error if the number is zero.
    pub fn with_trajectory_points(mut self, nb_points: u32) -> HermesResult<Self> {
        if nb_points == 0 {
            return Err(HermesError::Config(
                "number of trajectory points must be larger than zero".into(),
            ));
        }
        self.nb_trajectory_points = nb_points;
        Ok(self)
    }
    /// Enable or disable the "terminating terms" of the radiation integral.
    #[must_use]
    pub const fn with_terminating_terms(mut self, enabled: bool) -> Self {
        self.use_terminating_terms = enabled;
        self
    }
    /// Returns the integration method.
    #[must_use]
    pub const fn method(&self) -> SrMethod {
        self.method
    }
    /// Returns the relative precision.
    #[must_use]
    pub const fn relative_precision(&self) -> f64 {
        self.relative_precision
    }
    /// Returns the sampling factor for adjusting `nx`, `ny` (effective if > 0).
    #[must_use]
    pub const fn sampling_factor(&self) -> f64 {
        self.sampling_factor
    }
    /// Returns the number of trajectory points.
    #[must_use]
    pub const fn nb_trajectory_points(&self) -> u32 {
        self.nb_trajectory_points
    }
    /// Flat record in solver order: method, relative precision, integration start, integration end,
    /// number of trajectory points, terminating terms flag, sampling factor.
    #[must_use]
    pub fn to_array(&self) -> [f64; 7] {
        [
            f64::from(self.method.code()),
            self.relative_precision,
            self.integration_start.get::<meter>(),
            self.integration_end.get::<meter>(),
            f64::from(self.nb_trajectory_points),
            if self.use_terminating_terms { 1.0 } else { 0.0 },
            self.sampling_factor,
        ]
    }
}
