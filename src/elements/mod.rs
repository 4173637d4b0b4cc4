#![warn(missing_docs)]
//! This module contains the concrete optical element types of a beamline (apertures, mirrors, gratings, drifts).
mod aperture;
mod drift;
mod mirror;
mod vls_grating;

pub use aperture::{Aperture, ApertureKind, ApertureShape};
pub use drift::Drift;
pub use mirror::{BounceDirection, MirrorGeometry, MirrorOrientation, PlaneMirror, ToroidalMirror};
pub use vls_grating::{grazing_angle_from_cff, GratingDeflection, GrooveDensity, VlsGrating};

use strum::{AsRefStr, Display};

/// Closed set of optical elements which can be placed in a beamline.
#[derive(Debug, Clone, PartialEq, Display, AsRefStr)]
pub enum OpticalElement {
    /// rectangular or circular aperture / obstacle
    #[strum(serialize = "aperture")]
    Aperture(Aperture),
    /// flat mirror
    #[strum(serialize = "plane mirror")]
    PlaneMirror(PlaneMirror),
    /// toroidal mirror
    #[strum(serialize = "toroidal mirror")]
    ToroidalMirror(ToroidalMirror),
    /// variable line spacing grating on a plane substrate
    #[strum(serialize = "vls grating")]
    VlsGrating(VlsGrating),
    /// free space propagation
    #[strum(serialize = "drift")]
    Drift(Drift),
}
impl OpticalElement {
    /// Length along the optical axis covered by this element (non-zero only for drifts).
    #[must_use]
    pub fn axial_length(&self) -> Option<uom::si::f64::Length> {
        match self {
            Self::Drift(drift) => Some(drift.length()),
            Self::Aperture(_)
            | Self::PlaneMirror(_)
            | Self::ToroidalMirror(_)
            | Self::VlsGrating(_) => None,
        }
    }
}
impl From<Aperture> for OpticalElement {
    fn from(value: Aperture) -> Self {
        Self::Aperture(value)
    }
}
impl From<PlaneMirror> for OpticalElement {
    fn from(value: PlaneMirror) -> Self {
        Self::PlaneMirror(value)
    }
}
impl From<ToroidalMirror> for OpticalElement {
    fn from(value: ToroidalMirror) -> Self {
        Self::ToroidalMirror(value)
    }
}
impl From<VlsGrating> for OpticalElement {
    fn from(value: VlsGrating) -> Self {
        Self::VlsGrating(value)
    }
}
impl From<Drift> for OpticalElement {
    fn from(value: Drift) -> Self {
        Self::Drift(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{degree, meter, millimeter};
    #[test]
    fn display() {
        let drift: OpticalElement = Drift::new(meter!(1.0)).unwrap().into();
        assert_eq!(drift.to_string(), "drift");
        let aperture: OpticalElement =
            Aperture::rectangular(millimeter!(5.0), millimeter!(5.0)).unwrap().into();
        assert_eq!(aperture.as_ref(), "aperture");
    }
    #[test]
    fn mirror_name() {
        let geometry = MirrorGeometry::new(
            (millimeter!(200.0), millimeter!(18.0)),
            (100, 100),
            MirrorOrientation::from_bounce(BounceDirection::Right, degree!(2.5)),
        )
        .unwrap();
        let mirror: OpticalElement = PlaneMirror::new(geometry).into();
        assert_eq!(mirror.to_string(), "plane mirror");
        assert!(mirror.axial_length().is_none());
    }
    #[test]
    fn axial_length() {
        let drift: OpticalElement = Drift::new(meter!(0.6)).unwrap().into();
        assert_eq!(drift.axial_length(), Some(meter!(0.6)));
        let aperture: OpticalElement =
            Aperture::rectangular(millimeter!(5.0), millimeter!(5.0)).unwrap().into();
        assert!(aperture.axial_length().is_none());
    }
}
