#![warn(missing_docs)]
//! Variable line spacing (VLS) reflection grating and the derived diffraction geometry.
//!
//! Angle conventions: `α` and `β` are measured from the grating normal, with the grating equation
//! written as `sin α + sin β = m·N·λ`. For the inside order used in soft X-ray monochromators
//! (`m = -1`) the diffracted beam leaves on the other side of the normal (`β < 0`). The fixed focus
//! constant is `cff = cos β / cos α`.
use super::PlaneMirror;
use crate::{
    error::{HermesError, HermesResult},
    photon::wavelength,
};
use std::f64::consts::FRAC_PI_2;
use uom::si::{
    angle::radian,
    f64::{Angle, Energy, Length, LinearNumberDensity},
    length::{meter, millimeter},
    linear_number_density::{per_meter, per_millimeter},
};

/// Groove density polynomial `n(s) = n0 + n1·s + n2·s² + n3·s³` with `s` the tangential position in mm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrooveDensity {
    /// central groove density
    pub n0: LinearNumberDensity,
    /// linear coefficient in lines/mm²
    pub n1: f64,
    /// quadratic coefficient in lines/mm³
    pub n2: f64,
    /// cubic coefficient in lines/mm⁴
    pub n3: f64,
}
impl GrooveDensity {
    /// A grating with constant line spacing.
    #[must_use]
    pub const fn constant(n0: LinearNumberDensity) -> Self {
        Self {
            n0,
            n1: 0.0,
            n2: 0.0,
            n3: 0.0,
        }
    }
    /// Local groove density at the tangential position `position` (measured from the grating center).
    #[must_use]
    pub fn at(&self, position: Length) -> LinearNumberDensity {
        let s = position.get::<millimeter>();
        let n = self
            .n3
            .mul_add(s, self.n2)
            .mul_add(s, self.n1)
            .mul_add(s, self.n0.get::<per_millimeter>());
        LinearNumberDensity::new::<per_millimeter>(n)
    }
    /// Coefficients in solver order (`[n0, n1, n2, n3]`, lines/mm^k).
    #[must_use]
    pub fn coefficients(&self) -> [f64; 4] {
        [self.n0.get::<per_millimeter>(), self.n1, self.n2, self.n3]
    }
}

/// Diffraction geometry of a grating at a given photon energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GratingDeflection {
    incidence: Angle,
    diffraction: Angle,
}
impl GratingDeflection {
    /// Solve the grating equation for the given order, central line density, grazing incidence angle and photon energy.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the grazing angle is not within `(0, π/2)`.
    ///   - the requested order does not propagate (`|sin β| > 1`).
    pub fn compute(
        order: i32,
        line_density: LinearNumberDensity,
        grazing: Angle,
        energy: Energy,
    ) -> HermesResult<Self> {
        let grazing_rad = grazing.get::<radian>();
        if !(grazing_rad > 0.0 && grazing_rad < FRAC_PI_2) {
            return Err(HermesError::Grating(
                "grazing angle must be within (0, 90°)".into(),
            ));
        }
        let alpha = FRAC_PI_2 - grazing_rad;
        let sin_beta =
            order_times_density_times_wavelength(order, line_density, energy) - alpha.sin();
        if !sin_beta.is_finite() || sin_beta.abs() > 1.0 {
            return Err(HermesError::Grating(format!(
                "diffraction order {order} does not propagate at this energy"
            )));
        }
        Ok(Self {
            incidence: Angle::new::<radian>(alpha),
            diffraction: Angle::new::<radian>(sin_beta.asin()),
        })
    }
    /// Incidence angle `α` from the grating normal.
    #[must_use]
    pub const fn incidence_angle(&self) -> Angle {
        self.incidence
    }
    /// Signed diffraction angle `β` from the grating normal.
    #[must_use]
    pub const fn diffraction_angle(&self) -> Angle {
        self.diffraction
    }
    /// Grazing angle of the diffracted beam with respect to the grating surface.
    #[must_use]
    pub fn diffraction_grazing_angle(&self) -> Angle {
        Angle::new::<radian>(FRAC_PI_2 - self.diffraction.get::<radian>().abs())
    }
    /// Grazing angle of the incident beam with respect to the grating surface.
    #[must_use]
    pub fn incidence_grazing_angle(&self) -> Angle {
        Angle::new::<radian>(FRAC_PI_2 - self.incidence.get::<radian>())
    }
    /// Fixed focus constant `cos β / cos α`.
    #[must_use]
    pub fn cff(&self) -> f64 {
        self.diffraction.get::<radian>().cos() / self.incidence.get::<radian>().cos()
    }
    /// Total deviation between incident and diffracted beam (sum of both grazing angles).
    #[must_use]
    pub fn deflection(&self) -> Angle {
        self.incidence_grazing_angle() + self.diffraction_grazing_angle()
    }
}

fn order_times_density_times_wavelength(
    order: i32,
    line_density: LinearNumberDensity,
    energy: Energy,
) -> f64 {
    f64::from(order) * line_density.get::<per_meter>() * wavelength(energy).get::<meter>()
}

/// Grazing incidence angle at which a grating of the given order and central line density reaches the fixed focus
/// constant `cff` at the photon energy `energy`.
///
/// # Errors
///
/// This function will return an error if `cff` is not positive and finite or no grazing angle within `(0, π/2)`
/// fulfills the grating equation.
pub fn grazing_angle_from_cff(
    order: i32,
    line_density: LinearNumberDensity,
    cff: f64,
    energy: Energy,
) -> HermesResult<Angle> {
    if !cff.is_finite() || cff <= 0.0 {
        return Err(HermesError::Grating("cff must be positive and finite".into()));
    }
    let k = order_times_density_times_wavelength(order, line_density, energy);
    // (cff² - 1)·sin²α + 2k·sin α + (1 - k² - cff²) = 0
    let a = cff.mul_add(cff, -1.0);
    let b = 2.0 * k;
    let c = 1.0 - k.mul_add(k, cff * cff);
    let candidates: Vec<f64> = if a.abs() < f64::EPSILON {
        if b == 0.0 {
            vec![]
        } else {
            vec![-c / b]
        }
    } else {
        let discriminant = b.mul_add(b, -4.0 * a * c);
        if discriminant < 0.0 {
            vec![]
        } else {
            let root = discriminant.sqrt();
            vec![(-b + root) / (2.0 * a), (-b - root) / (2.0 * a)]
        }
    };
    candidates
        .into_iter()
        .filter(|s| *s > 0.0 && *s < 1.0 && (k - s).abs() <= 1.0)
        .reduce(f64::max)
        .map(|sin_alpha| Angle::new::<radian>(FRAC_PI_2 - sin_alpha.asin()))
        .ok_or_else(|| {
            HermesError::Grating(format!(
                "no grazing angle reaches cff = {cff} in order {order} at this energy"
            ))
        })
}

/// Variable line spacing reflection grating on a plane substrate.
#[derive(Debug, Clone, PartialEq)]
pub struct VlsGrating {
    substrate: PlaneMirror,
    order: i32,
    groove_density: GrooveDensity,
    cff: f64,
    grazing: Angle,
}
impl VlsGrating {
    /// Creates a new [`VlsGrating`].
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the diffraction order is zero.
    ///   - the central groove density is not positive and finite or a polynomial coefficient is not finite.
    ///   - `cff` is not positive and finite.
    ///   - the grazing angle is not within `(0, π/2)`.
    pub fn new(
        substrate: PlaneMirror,
        order: i32,
        groove_density: GrooveDensity,
        cff: f64,
        grazing: Angle,
    ) -> HermesResult<Self> {
        if order == 0 {
            return Err(HermesError::OpticalElement(
                "zeroth order is a mirror, not a grating".into(),
            ));
        }
        let n0 = groove_density.n0.get::<per_millimeter>();
        if !n0.is_finite() || n0 <= 0.0 {
            return Err(HermesError::OpticalElement(
                "Only positive finite values are allowed for a grating line density".into(),
            ));
        }
        if !(groove_density.n1.is_finite()
            && groove_density.n2.is_finite()
            && groove_density.n3.is_finite())
        {
            return Err(HermesError::OpticalElement(
                "groove density coefficients must be finite".into(),
            ));
        }
        if !cff.is_finite() || cff <= 0.0 {
            return Err(HermesError::OpticalElement(
                "cff must be positive and finite".into(),
            ));
        }
        let grazing_rad = grazing.get::<radian>();
        if !(grazing_rad > 0.0 && grazing_rad < FRAC_PI_2) {
            return Err(HermesError::OpticalElement(
                "grazing angle must be within (0, 90°)".into(),
            ));
        }
        Ok(Self {
            substrate,
            order,
            groove_density,
            cff,
            grazing,
        })
    }
    /// Returns the substrate of this [`VlsGrating`].
    #[must_use]
    pub const fn substrate(&self) -> &PlaneMirror {
        &self.substrate
    }
    /// Returns the diffraction order.
    #[must_use]
    pub const fn order(&self) -> i32 {
        self.order
    }
    /// Returns the groove density polynomial.
    #[must_use]
    pub const fn groove_density(&self) -> &GrooveDensity {
        &self.groove_density
    }
    /// Returns the nominal fixed focus constant.
    #[must_use]
    pub const fn cff(&self) -> f64 {
        self.cff
    }
    /// Returns the grazing incidence angle.
    #[must_use]
    pub const fn grazing_angle(&self) -> Angle {
        self.grazing
    }
    /// Diffraction geometry of this grating at the photon energy `energy`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the order does not propagate at this energy.
    pub fn deflection(&self, energy: Energy) -> HermesResult<GratingDeflection> {
        GratingDeflection::compute(self.order, self.groove_density.n0, self.grazing, energy)
    }
}
