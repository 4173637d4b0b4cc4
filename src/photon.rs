//! Photon energy <-> wavelength conversion.
use uom::si::{
    energy::electronvolt,
    f64::{Energy, Length},
    length::meter,
};

/// Product of Planck's constant and the speed of light in eV·m.
pub const HC_EV_M: f64 = 1.239_841_984e-6;

/// Vacuum wavelength of a photon with the given energy.
#[must_use]
pub fn wavelength(energy: Energy) -> Length {
    Length::new::<meter>(HC_EV_M / energy.get::<electronvolt>())
}
/// Energy of a photon with the given vacuum wavelength.
#[must_use]
pub fn photon_energy(wavelength: Length) -> Energy {
    Energy::new::<electronvolt>(HC_EV_M / wavelength.get::<meter>())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{electronvolt, meter};
    use approx::assert_relative_eq;
    use uom::si::length::nanometer;
    #[test]
    fn soft_xray() {
        assert_relative_eq!(
            wavelength(electronvolt!(719.9)).get::<nanometer>(),
            1.722_242,
            epsilon = 1e-6
        );
    }
    #[test]
    fn inverse() {
        let e = photon_energy(meter!(1.0e-9));
        assert_relative_eq!(e.get::<electronvolt>(), 1239.841_984, epsilon = 1e-6);
    }
}
