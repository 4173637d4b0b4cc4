//! Grazing incidence mirrors (plane and toroidal) and their orientation in the beamline frame.
use crate::error::{HermesError, HermesResult};
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use uom::si::{
    angle::radian,
    f64::{Angle, Length},
    length::meter,
};

/// Direction into which a grazing incidence element deflects the beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BounceDirection {
    /// deflection towards negative x
    Left,
    /// deflection towards positive x
    Right,
    /// deflection towards positive y
    Up,
    /// deflection towards negative y
    Down,
}
impl BounceDirection {
    /// Returns `true` for deflections in the horizontal plane.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Orientation of a mirror surface: central normal vector and tangential vector (x, y components).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorOrientation {
    normal: Vector3<f64>,
    tangent: Vector2<f64>,
}
impl MirrorOrientation {
    /// Derive the orientation of a mirror hit under the grazing angle `grazing` and deflecting
    /// the beam into `direction`.
    #[must_use]
    pub fn from_bounce(direction: BounceDirection, grazing: Angle) -> Self {
        let (sin, cos) = grazing.get::<radian>().sin_cos();
        let normal = match direction {
            BounceDirection::Right => Vector3::new(cos, 0.0, -sin),
            BounceDirection::Left => Vector3::new(-cos, 0.0, -sin),
            BounceDirection::Up => Vector3::new(0.0, cos, -sin),
            BounceDirection::Down => Vector3::new(0.0, -cos, -sin),
        };
        let tangent = if direction.is_horizontal() {
            Vector2::new(-sin, 0.0)
        } else {
            Vector2::new(0.0, -sin)
        };
        Self { normal, tangent }
    }
    /// Create an orientation from explicit normal and tangential vectors.
    ///
    /// # Errors
    ///
    /// This function will return an error if the normal vector is zero or a component is not finite.
    pub fn new(normal: Vector3<f64>, tangent: Vector2<f64>) -> HermesResult<Self> {
        if !(normal.iter().chain(tangent.iter()).all(|c| c.is_finite())) {
            return Err(HermesError::OpticalElement(
                "mirror orientation vectors must be finite".into(),
            ));
        }
        if normal.norm() == 0.0 {
            return Err(HermesError::OpticalElement(
                "mirror normal vector must not be zero".into(),
            ));
        }
        Ok(Self { normal, tangent })
    }
    /// Returns the central normal vector `(nvx, nvy, nvz)`.
    #[must_use]
    pub const fn normal(&self) -> &Vector3<f64> {
        &self.normal
    }
    /// Returns the tangential vector `(tvx, tvy)`.
    #[must_use]
    pub const fn tangent(&self) -> &Vector2<f64> {
        &self.tangent
    }
}

/// Extent, sampling and orientation shared by all mirror-like surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorGeometry {
    size_tangential: Length,
    size_sagittal: Length,
    nb_points_tangential: usize,
    nb_points_sagittal: usize,
    orientation: MirrorOrientation,
}
impl MirrorGeometry {
    /// Creates a new [`MirrorGeometry`].
    ///
    /// # Errors
    ///
    /// This function will return an error if a size is not positive and finite or a number of points is zero.
    pub fn new(
        (size_tangential, size_sagittal): (Length, Length),
        (nb_points_tangential, nb_points_sagittal): (usize, usize),
        orientation: MirrorOrientation,
    ) -> HermesResult<Self> {
        if !(size_tangential.is_finite() && size_sagittal.is_finite())
            || size_tangential.get::<meter>() <= 0.0
            || size_sagittal.get::<meter>() <= 0.0
        {
            return Err(HermesError::OpticalElement(
                "mirror sizes must be positive and finite".into(),
            ));
        }
        if nb_points_tangential == 0 || nb_points_sagittal == 0 {
            return Err(HermesError::OpticalElement(
                "mirror surface sampling must have at least one point".into(),
            ));
        }
        Ok(Self {
            size_tangential,
            size_sagittal,
            nb_points_tangential,
            nb_points_sagittal,
            orientation,
        })
    }
    /// Returns the `(tangential, sagittal)` sizes.
    #[must_use]
    pub const fn size(&self) -> (Length, Length) {
        (self.size_tangential, self.size_sagittal)
    }
    /// Returns the `(tangential, sagittal)` number of sampling points.
    #[must_use]
    pub const fn nb_points(&self) -> (usize, usize) {
        (self.nb_points_tangential, self.nb_points_sagittal)
    }
    /// Returns the orientation.
    #[must_use]
    pub const fn orientation(&self) -> &MirrorOrientation {
        &self.orientation
    }
}

/// Flat grazing incidence mirror.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneMirror {
    geometry: MirrorGeometry,
}
impl PlaneMirror {
    /// Creates a new [`PlaneMirror`].
    #[must_use]
    pub const fn new(geometry: MirrorGeometry) -> Self {
        Self { geometry }
    }
    /// Returns the geometry of this [`PlaneMirror`].
    #[must_use]
    pub const fn geometry(&self) -> &MirrorGeometry {
        &self.geometry
    }
}

/// Toroidal grazing incidence mirror.
#[derive(Debug, Clone, PartialEq)]
pub struct ToroidalMirror {
    geometry: MirrorGeometry,
    radius_tangential: Length,
    radius_sagittal: Length,
}
impl ToroidalMirror {
    /// Creates a new [`ToroidalMirror`].
    ///
    /// # Errors
    ///
    /// This function will return an error if a radius is not positive and finite.
    pub fn new(
        geometry: MirrorGeometry,
        radius_tangential: Length,
        radius_sagittal: Length,
    ) -> HermesResult<Self> {
        if !(radius_tangential.is_finite() && radius_sagittal.is_finite())
            || radius_tangential.get::<meter>() <= 0.0
            || radius_sagittal.get::<meter>() <= 0.0
        {
            return Err(HermesError::OpticalElement(
                "toroid radii must be positive and finite".into(),
            ));
        }
        Ok(Self {
            geometry,
            radius_tangential,
            radius_sagittal,
        })
    }
    /// Returns the geometry of this [`ToroidalMirror`].
    #[must_use]
    pub const fn geometry(&self) -> &MirrorGeometry {
        &self.geometry
    }
    /// Returns the tangential radius.
    #[must_use]
    pub const fn radius_tangential(&self) -> Length {
        self.radius_tangential
    }
    /// Returns the sagittal radius.
    #[must_use]
    pub const fn radius_sagittal(&self) -> Length {
        self.radius_sagittal
    }
}
