#![warn(missing_docs)]
//! HERMES specific error structures
use std::{error::Error, fmt::Display};

/// HERMES application specific Result type
pub type HermesResult<T> = std::result::Result<T, HermesError>;

/// Errors that can be returned by various HERMES functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HermesError {
    /// invalid bounds or pixel counts of a radiation mesh
    Mesh(String),
    /// invalid electron beam moments
    ElectronBeam(String),
    /// invalid undulator or magnetic field container
    MagneticField(String),
    /// invalid geometry of an optical element
    OpticalElement(String),
    /// errors while composing a beamline (e.g. mismatching sequences)
    Beamline(String),
    /// errors of the grating deflection calculation (e.g. non-propagating order)
    Grating(String),
    /// errors while reading, writing or validating the simulation configuration
    Config(String),
    /// errors raised by the external physics engine
    Engine(String),
    /// errors while creating diagnostics or plots
    Report(String),
    /// errors while exporting ray data
    Export(String),
    /// errors console io
    Console(String),
    /// errors not falling in one of the categories above
    Other(String),
}

impl Display for HermesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mesh(m) => write!(f, "Mesh:{m}"),
            Self::ElectronBeam(m) => write!(f, "ElectronBeam:{m}"),
            Self::MagneticField(m) => write!(f, "MagneticField:{m}"),
            Self::OpticalElement(m) => write!(f, "OpticalElement:{m}"),
            Self::Beamline(m) => write!(f, "Beamline:{m}"),
            Self::Grating(m) => write!(f, "Grating:{m}"),
            Self::Config(m) => write!(f, "Config:{m}"),
            Self::Engine(m) => write!(f, "Engine:{m}"),
            Self::Report(m) => write!(f, "Report:{m}"),
            Self::Export(m) => write!(f, "Export:{m}"),
            Self::Console(m) => write!(f, "Console:{m}"),
            Self::Other(m) => write!(f, "Hermes Error:Other:{m}"),
        }
    }
}
impl Error for HermesError {}

impl std::convert::From<String> for HermesError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
