#![warn(missing_docs)]
//! Statistical description of the relativistic electron beam driving the undulator.
use crate::error::{HermesError, HermesResult};
use uom::si::{
    electric_current::ampere,
    energy::megaelectronvolt,
    f64::{ElectricCurrent, Energy, Length},
    length::meter,
};

/// Electron rest energy in MeV.
pub const ELECTRON_REST_ENERGY_MEV: f64 = 0.510_998_950;

/// Number of slots of the second order moment vector.
pub const NB_SECOND_MOMENTS: usize = 11;

/// Indices of the second order moments which hold variances and therefore must not be negative.
const VARIANCE_SLOTS: [usize; 5] = [0, 2, 3, 5, 10];

/// First order statistical moments (centroid) of the electron beam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstMoments {
    /// horizontal position
    pub x: Length,
    /// vertical position
    pub y: Length,
    /// longitudinal position
    pub z: Length,
    /// horizontal angle in rad
    pub xp: f64,
    /// vertical angle in rad
    pub yp: f64,
    /// relative energy (Lorentz factor)
    pub gamma: f64,
}

/// Electron beam given by its average current and its first and second order moments.
///
/// The second order moments are stored in a fixed vector of 11 slots:
///
/// | slot | moment |
/// |------|--------|
/// | 0 | `<(x-<x>)^2>` |
/// | 1 | `<(x-<x>)(x'-<x'>)>` |
/// | 2 | `<(x'-<x'>)^2>` |
/// | 3 | `<(y-<y>)^2>` |
/// | 4 | `<(y-<y>)(y'-<y'>)>` |
/// | 5 | `<(y'-<y'>)^2>` |
/// | 6 | `<(x-<x>)(y-<y>)>` |
/// | 7 | `<(x'-<x'>)(y-<y>)>` |
/// | 8 | `<(x-<x>)(y'-<y'>)>` |
/// | 9 | `<(x'-<x'>)(y'-<y'>)>` |
/// | 10 | `<(E-<E>)^2>/<E>^2` |
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleBeam {
    current: ElectricCurrent,
    first: FirstMoments,
    second: [f64; NB_SECOND_MOMENTS],
}

/// Calculate the Lorentz factor of an electron with the given total energy.
#[must_use]
pub fn lorentz_factor_from_energy(energy: Energy) -> f64 {
    energy.get::<megaelectronvolt>() / ELECTRON_REST_ENERGY_MEV
}

impl ParticleBeam {
    /// Creates a new [`ParticleBeam`] on axis with the given average current and Lorentz factor.
    ///
    /// All second order moments are initialized to zero (filament beam).
    ///
    /// # Errors
    ///
    /// This function will return an error if the current is negative or not finite or if `gamma` is not
    /// larger than 1.
    pub fn new(current: ElectricCurrent, gamma: f64) -> HermesResult<Self> {
        if !current.is_finite() || current.get::<ampere>() < 0.0 {
            return Err(HermesError::ElectronBeam(
                "average current must be positive and finite".into(),
            ));
        }
        if !gamma.is_finite() || gamma <= 1.0 {
            return Err(HermesError::ElectronBeam(
                "Lorentz factor must be finite and larger than 1".into(),
            ));
        }
        Ok(Self {
            current,
            first: FirstMoments {
                x: Length::new::<meter>(0.0),
                y: Length::new::<meter>(0.0),
                z: Length::new::<meter>(0.0),
                xp: 0.0,
                yp: 0.0,
                gamma,
            },
            second: [0.0; NB_SECOND_MOMENTS],
        })
    }
    /// Creates a new [`ParticleBeam`] from its total energy instead of the Lorentz factor.
    ///
    /// # Errors
    ///
    /// This function will return an error under the same conditions as [`ParticleBeam::new`].
    pub fn from_energy(current: ElectricCurrent, energy: Energy) -> HermesResult<Self> {
        Self::new(current, lorentz_factor_from_energy(energy))
    }
    /// Returns the average current of this [`ParticleBeam`].
    #[must_use]
    pub const fn current(&self) -> ElectricCurrent {
        self.current
    }
    /// Returns the first order moments of this [`ParticleBeam`].
    #[must_use]
    pub const fn first_moments(&self) -> &FirstMoments {
        &self.first
    }
    /// Returns the second order moments of this [`ParticleBeam`].
    #[must_use]
    pub const fn second_moments(&self) -> &[f64; NB_SECOND_MOMENTS] {
        &self.second
    }
    /// Returns the Lorentz factor of this [`ParticleBeam`].
    #[must_use]
    pub const fn gamma(&self) -> f64 {
        self.first.gamma
    }
    /// Returns the total electron energy.
    #[must_use]
    pub fn energy(&self) -> Energy {
        Energy::new::<megaelectronvolt>(self.first.gamma * ELECTRON_REST_ENERGY_MEV)
    }
    /// Set the initial longitudinal position of the beam centroid (start of the trajectory calculation).
    ///
    /// # Errors
    ///
    /// This function will return an error if the position is not finite.
    pub fn set_initial_position(&mut self, z: Length) -> HermesResult<()> {
        if !z.is_finite() {
            return Err(HermesError::ElectronBeam(
                "initial longitudinal position must be finite".into(),
            ));
        }
        self.first.z = z;
        Ok(())
    }
    /// Set the transverse centroid position `(x, y)` and angles `(x', y')` in rad.
    ///
    /// # Errors
    ///
    /// This function will return an error if a value is not finite.
    pub fn set_transverse_position(
        &mut self,
        (x, y): (Length, Length),
        (xp, yp): (f64, f64),
    ) -> HermesResult<()> {
        if !(x.is_finite() && y.is_finite() && xp.is_finite() && yp.is_finite()) {
            return Err(HermesError::ElectronBeam(
                "transverse centroid position and angles must be finite".into(),
            ));
        }
        self.first.x = x;
        self.first.y = y;
        self.first.xp = xp;
        self.first.yp = yp;
        Ok(())
    }
    /// Set all second order moments at once.
    ///
    /// # Errors
    ///
    /// This function will return an error if any value is not finite or if a variance slot is negative.
    /// The beam stays unchanged in this case.
    pub fn set_second_moments(&mut self, moments: [f64; NB_SECOND_MOMENTS]) -> HermesResult<()> {
        for (slot, value) in moments.iter().enumerate() {
            check_moment(slot, *value)?;
        }
        self.second = moments;
        Ok(())
    }
    /// Set a single second order moment.
    ///
    /// # Errors
    ///
    /// This function will return an error if the slot does not exist, the value is not finite or a
    /// variance slot would become negative.
    pub fn set_second_moment(&mut self, slot: usize, value: f64) -> HermesResult<()> {
        if slot >= NB_SECOND_MOMENTS {
            return Err(HermesError::ElectronBeam(format!(
                "second order moment slot {slot} does not exist"
            )));
        }
        check_moment(slot, value)?;
        self.second[slot] = value;
        Ok(())
    }
    /// Set the horizontal phase space moments `<x^2>` (m²), `<xx'>` (m·rad) and `<x'^2>` (rad²).
    ///
    /// # Errors
    ///
    /// This function will return an error if a value is not finite or a variance is negative.
    pub fn with_horizontal_moments(mut self, xx: f64, xxp: f64, xpxp: f64) -> HermesResult<Self> {
        let mut moments = self.second;
        moments[0] = xx;
        moments[1] = xxp;
        moments[2] = xpxp;
        self.set_second_moments(moments)?;
        Ok(self)
    }
    /// Set the vertical phase space moments `<y^2>` (m²), `<yy'>` (m·rad) and `<y'^2>` (rad²).
    ///
    /// # Errors
    ///
    /// This function will return an error if a value is not finite or a variance is negative.
    pub fn with_vertical_moments(mut self, yy: f64, yyp: f64, ypyp: f64) -> HermesResult<Self> {
        let mut moments = self.second;
        moments[3] = yy;
        moments[4] = yyp;
        moments[5] = ypyp;
        self.set_second_moments(moments)?;
        Ok(self)
    }
    /// Set the relative rms energy spread (`sigma_E / E`). Stored squared in slot 10.
    ///
    /// # Errors
    ///
    /// This function will return an error if the spread is negative or not finite.
    pub fn with_energy_spread(mut self, relative_spread: f64) -> HermesResult<Self> {
        if !relative_spread.is_finite() || relative_spread < 0.0 {
            return Err(HermesError::ElectronBeam(
                "relative energy spread must be positive and finite".into(),
            ));
        }
        self.set_second_moment(10, relative_spread * relative_spread)?;
        Ok(self)
    }
    /// Returns the relative rms energy spread.
    #[must_use]
    pub fn energy_spread(&self) -> f64 {
        self.second[10].sqrt()
    }
}

fn check_moment(slot: usize, value: f64) -> HermesResult<()> {
    if !value.is_finite() {
        return Err(HermesError::ElectronBeam(format!(
            "second order moment {slot} must be finite"
        )));
    }
    if VARIANCE_SLOTS.contains(&slot) && value < 0.0 {
        return Err(HermesError::ElectronBeam(format!(
            "second order moment {slot} is a variance and must not be negative"
        )));
    }
    Ok(())
}
