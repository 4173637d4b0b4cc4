//! This is the documentation for the **HERMES** wavefront propagation package.
//!
//! The crate configures and drives a synchrotron-radiation wavefront-propagation simulation of the
//! HERMES soft X-ray undulator beamline: an electron beam, a planar undulator, the initial photon
//! wavefront mesh and the optical beamline (pupil, mirrors, entrance slit, VLS grating and drifts).
//! The field computation, propagation and multi-electron integration are delegated to an external
//! physics engine implementing [`engine::SrwEngine`].
#![allow(clippy::module_name_repetitions)]

pub mod beam_export;
pub mod beamline;
pub mod config;
pub mod console;
pub mod driver;
pub mod electron_beam;
pub mod elements;
pub mod engine;
pub mod error;
pub mod magnetic_field;
pub mod mesh;
pub mod photon;
pub mod precision;
pub mod propagation_parameters;
pub mod reporting;
pub mod utils;
pub mod wavefront;

pub use beamline::BeamlineComposite;
pub use config::SimulationConfig;
pub use driver::Simulation;

/// Return the version information of the currently built HERMES executable.
#[must_use]
pub fn get_version() -> String {
    format!("{} ({})", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_NAME"))
}
#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn get_ver() {
        let version_string = get_version();
        assert!(version_string.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(version_string.ends_with("(hermes)"));
    }
}
