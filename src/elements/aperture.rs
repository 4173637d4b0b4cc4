//! Rectangular or circular aperture (or obstacle) in the beam path.
use crate::error::{HermesError, HermesResult};
use strum::Display;
use uom::si::{f64::Length, length::meter};

/// Shape of an [`Aperture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ApertureShape {
    /// rectangle with full sizes `dx × dy`
    Rectangular,
    /// ellipse with diameters `dx × dy`
    Circular,
}
/// Whether the shape transmits (aperture) or blocks (obstacle) the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ApertureKind {
    /// light passes inside the shape
    Aperture,
    /// light is blocked inside the shape
    Obstacle,
}

/// Aperture or obstacle, defined by its full sizes and its center offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Aperture {
    shape: ApertureShape,
    kind: ApertureKind,
    dx: Length,
    dy: Length,
    x: Length,
    y: Length,
}
impl Aperture {
    /// Creates a new [`Aperture`].
    ///
    /// # Errors
    ///
    /// This function will return an error if a size is not positive and finite or an offset is not finite.
    pub fn new(
        shape: ApertureShape,
        kind: ApertureKind,
        (dx, dy): (Length, Length),
        (x, y): (Length, Length),
    ) -> HermesResult<Self> {
        if !(dx.is_finite() && dy.is_finite())
            || dx.get::<meter>() <= 0.0
            || dy.get::<meter>() <= 0.0
        {
            return Err(HermesError::OpticalElement(
                "aperture sizes must be positive and finite".into(),
            ));
        }
        if !(x.is_finite() && y.is_finite()) {
            return Err(HermesError::OpticalElement(
                "aperture center must be finite".into(),
            ));
        }
        Ok(Self {
            shape,
            kind,
            dx,
            dy,
            x,
            y,
        })
    }
    /// Creates a centered rectangular [`Aperture`] (e.g. a pupil or a slit).
    ///
    /// # Errors
    ///
    /// This function will return an error if a size is not positive and finite.
    pub fn rectangular(dx: Length, dy: Length) -> HermesResult<Self> {
        let zero = Length::new::<meter>(0.0);
        Self::new(
            ApertureShape::Rectangular,
            ApertureKind::Aperture,
            (dx, dy),
            (zero, zero),
        )
    }
    /// Returns the shape of this [`Aperture`].
    #[must_use]
    pub const fn shape(&self) -> ApertureShape {
        self.shape
    }
    /// Returns the kind of this [`Aperture`].
    #[must_use]
    pub const fn kind(&self) -> ApertureKind {
        self.kind
    }
    /// Returns the full sizes `(dx, dy)`.
    #[must_use]
    pub const fn size(&self) -> (Length, Length) {
        (self.dx, self.dy)
    }
    /// Returns the center offset `(x, y)`.
    #[must_use]
    pub const fn center(&self) -> (Length, Length) {
        (self.x, self.y)
    }
}
