#![warn(missing_docs)]
//! Radiation mesh: the photon energy and transverse sampling grid of a wavefront.
use crate::{
    error::{HermesError, HermesResult},
    utils::usize_to_f64,
};
use uom::si::f64::{Energy, Length};

/// Sampling grid (energy × horizontal × vertical) of a wavefront at a given longitudinal position.
///
/// All bounds are ordered (`start ≤ fin`) and all pixel counts are at least one. This is
/// checked on construction, so a [`RadMesh`] in hand is always valid.
#[derive(Debug, Clone, PartialEq)]
pub struct RadMesh {
    e_start: Energy,
    e_fin: Energy,
    ne: usize,
    x_start: Length,
    x_fin: Length,
    nx: usize,
    y_start: Length,
    y_fin: Length,
    ny: usize,
    z_start: Length,
}

fn check_axis<T: PartialOrd + Copy>(
    name: &str,
    start: T,
    fin: T,
    count: usize,
    is_finite: impl Fn(T) -> bool,
) -> HermesResult<()> {
    if !(is_finite(start) && is_finite(fin)) {
        return Err(HermesError::Mesh(format!("{name} bounds must be finite")));
    }
    if start > fin {
        return Err(HermesError::Mesh(format!(
            "{name} start must not be larger than {name} fin"
        )));
    }
    if count == 0 {
        return Err(HermesError::Mesh(format!(
            "number of {name} points must be at least 1"
        )));
    }
    Ok(())
}

impl RadMesh {
    /// Creates a new [`RadMesh`] from explicit bounds and point counts.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - any bound is not finite.
    ///   - a start value is larger than the corresponding fin value.
    ///   - any point count is zero.
    pub fn new(
        (e_start, e_fin, ne): (Energy, Energy, usize),
        (x_start, x_fin, nx): (Length, Length, usize),
        (y_start, y_fin, ny): (Length, Length, usize),
        z_start: Length,
    ) -> HermesResult<Self> {
        check_axis("energy", e_start, e_fin, ne, |v: Energy| v.is_finite())?;
        check_axis("x", x_start, x_fin, nx, |v: Length| v.is_finite())?;
        check_axis("y", y_start, y_fin, ny, |v: Length| v.is_finite())?;
        if !z_start.is_finite() {
            return Err(HermesError::Mesh(
                "longitudinal position must be finite".into(),
            ));
        }
        Ok(Self {
            e_start,
            e_fin,
            ne,
            x_start,
            x_fin,
            nx,
            y_start,
            y_fin,
            ny,
            z_start,
        })
    }
    /// Creates a monochromatic mesh centered on the optical axis.
    ///
    /// The mesh spans `[-range_x/2, range_x/2] × [-range_y/2, range_y/2]` with `nx × ny` points
    /// at the photon energy `energy` and the longitudinal position `z`.
    ///
    /// # Errors
    ///
    /// This function will return an error if a range is negative or not finite, or a point count is zero.
    pub fn centered(
        energy: Energy,
        (range_x, range_y): (Length, Length),
        (nx, ny): (usize, usize),
        z: Length,
    ) -> HermesResult<Self> {
        Self::new(
            (energy, energy, 1),
            (-(range_x * 0.5), range_x * 0.5, nx),
            (-(range_y * 0.5), range_y * 0.5, ny),
            z,
        )
    }
    /// Returns the first photon energy of this [`RadMesh`].
    #[must_use]
    pub const fn e_start(&self) -> Energy {
        self.e_start
    }
    /// Returns the last photon energy of this [`RadMesh`].
    #[must_use]
    pub const fn e_fin(&self) -> Energy {
        self.e_fin
    }
    /// Returns the number of photon energy points.
    #[must_use]
    pub const fn ne(&self) -> usize {
        self.ne
    }
    /// Returns the first horizontal position.
    #[must_use]
    pub const fn x_start(&self) -> Length {
        self.x_start
    }
    /// Returns the last horizontal position.
    #[must_use]
    pub const fn x_fin(&self) -> Length {
        self.x_fin
    }
    /// Returns the number of horizontal points.
    #[must_use]
    pub const fn nx(&self) -> usize {
        self.nx
    }
    /// Returns the first vertical position.
    #[must_use]
    pub const fn y_start(&self) -> Length {
        self.y_start
    }
    /// Returns the last vertical position.
    #[must_use]
    pub const fn y_fin(&self) -> Length {
        self.y_fin
    }
    /// Returns the number of vertical points.
    #[must_use]
    pub const fn ny(&self) -> usize {
        self.ny
    }
    /// Returns the longitudinal position of this [`RadMesh`].
    #[must_use]
    pub const fn z_start(&self) -> Length {
        self.z_start
    }
    /// Horizontal extent `x_fin - x_start`.
    #[must_use]
    pub fn range_x(&self) -> Length {
        self.x_fin - self.x_start
    }
    /// Vertical extent `y_fin - y_start`.
    #[must_use]
    pub fn range_y(&self) -> Length {
        self.y_fin - self.y_start
    }
    /// Horizontal pixel pitch `(x_fin - x_start) / (nx - 1)`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the mesh has a single horizontal point.
    pub fn pitch_x(&self) -> HermesResult<Length> {
        pitch(self.range_x(), self.nx, "x")
    }
    /// Vertical pixel pitch `(y_fin - y_start) / (ny - 1)`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the mesh has a single vertical point.
    pub fn pitch_y(&self) -> HermesResult<Length> {
        pitch(self.range_y(), self.ny, "y")
    }
    /// Total number of field samples (`ne * nx * ny`).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.ne * self.nx * self.ny
    }
    /// Always `false`, a valid mesh holds at least one sample.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

fn pitch(range: Length, count: usize, axis: &str) -> HermesResult<Length> {
    if count < 2 {
        return Err(HermesError::Mesh(format!(
            "pixel pitch along {axis} undefined for a single point"
        )));
    }
    Ok(range / usize_to_f64(count - 1))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{electronvolt, meter, micrometer, millimeter};
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use uom::si::length::{meter, micrometer};

    fn hermes_mesh() -> RadMesh {
        RadMesh::centered(
            electronvolt!(719.9),
            (millimeter!(5.0), millimeter!(5.0)),
            (100, 100),
            meter!(18.151),
        )
        .unwrap()
    }
    #[test]
    fn centered() {
        let mesh = hermes_mesh();
        assert_eq!(mesh.ne(), 1);
        assert_eq!(mesh.e_start(), mesh.e_fin());
        assert_relative_eq!(mesh.x_start().get::<meter>(), -2.5e-3);
        assert_relative_eq!(mesh.x_fin().get::<meter>(), 2.5e-3);
        assert_relative_eq!(mesh.y_start().get::<meter>(), -2.5e-3);
        assert_relative_eq!(mesh.z_start().get::<meter>(), 18.151);
        assert_eq!(mesh.len(), 10_000);
    }
    #[test]
    fn pixel_pitch() {
        let mesh = hermes_mesh();
        assert_relative_eq!(
            mesh.pitch_x().unwrap().get::<micrometer>(),
            50.505_050_505,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            mesh.pitch_y().unwrap().get::<micrometer>(),
            50.505_050_505,
            epsilon = 1e-6
        );
    }
    #[test]
    fn pitch_single_pixel() {
        let mesh = RadMesh::centered(
            electronvolt!(100.0),
            (millimeter!(1.0), millimeter!(1.0)),
            (1, 10),
            meter!(0.0),
        )
        .unwrap();
        assert_matches!(mesh.pitch_x(), Err(HermesError::Mesh(_)));
        assert_relative_eq!(
            mesh.pitch_y().unwrap().get::<micrometer>(),
            111.111_111,
            epsilon = 1e-3
        );
    }
    #[test]
    fn invalid_bounds() {
        let e = electronvolt!(100.0);
        assert!(RadMesh::new(
            (e, e, 1),
            (micrometer!(1.0), micrometer!(-1.0), 10),
            (micrometer!(-1.0), micrometer!(1.0), 10),
            meter!(0.0)
        )
        .is_err());
        assert!(RadMesh::new(
            (electronvolt!(200.0), electronvolt!(100.0), 2),
            (micrometer!(-1.0), micrometer!(1.0), 10),
            (micrometer!(-1.0), micrometer!(1.0), 10),
            meter!(0.0)
        )
        .is_err());
        assert!(RadMesh::new(
            (e, e, 1),
            (micrometer!(-1.0), micrometer!(1.0), 10),
            (micrometer!(-1.0), micrometer!(f64::NAN), 10),
            meter!(0.0)
        )
        .is_err());
        assert!(RadMesh::new(
            (e, e, 1),
            (micrometer!(-1.0), micrometer!(1.0), 10),
            (micrometer!(-1.0), micrometer!(1.0), 10),
            meter!(f64::INFINITY)
        )
        .is_err());
    }
    #[test]
    fn invalid_counts() {
        let e = electronvolt!(100.0);
        assert_matches!(
            RadMesh::new(
                (e, e, 0),
                (micrometer!(-1.0), micrometer!(1.0), 10),
                (micrometer!(-1.0), micrometer!(1.0), 10),
                meter!(0.0)
            ),
            Err(HermesError::Mesh(_))
        );
        assert!(RadMesh::centered(
            e,
            (millimeter!(1.0), millimeter!(1.0)),
            (10, 0),
            meter!(0.0)
        )
        .is_err());
    }
    #[test]
    fn degenerate_axis_allowed() {
        let e = electronvolt!(100.0);
        let mesh = RadMesh::centered(
            e,
            (millimeter!(0.0), millimeter!(1.0)),
            (1, 2),
            meter!(0.0),
        )
        .unwrap();
        assert_relative_eq!(mesh.range_x().get::<meter>(), 0.0);
        assert_relative_eq!(mesh.range_y().get::<meter>(), 1e-3);
    }
}
