#![warn(missing_docs)]
//! Wavefront container: mesh, electric field buffers and the electron beam that emitted them.
use crate::{
    electron_beam::ParticleBeam,
    error::{HermesError, HermesResult},
    mesh::RadMesh,
};
use uom::si::{f64::Length, length::meter};

/// Unit of the electric field stored in a [`Wavefront`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldUnit {
    /// arbitrary units
    Arbitrary,
    /// `sqrt(photons/s/0.1%bw/mm²)`
    #[default]
    SqrtPhotonFlux,
    /// `sqrt(J/eV/mm²)` or `sqrt(W/mm²)` depending on the representation
    SqrtEnergy,
}

/// Electric field sampled on a [`RadMesh`].
///
/// Both field components are stored as interleaved real/imaginary `f32` pairs, ordered by energy
/// (fastest), then x, then y. The wavefront is mutated in place by the field solver and the
/// propagator. Use `clone()` to keep a pristine copy before propagating.
#[derive(Debug, Clone, PartialEq)]
pub struct Wavefront {
    mesh: RadMesh,
    ex: Vec<f32>,
    ey: Vec<f32>,
    unit: FieldUnit,
    particle_beam: Option<ParticleBeam>,
    rx: Length,
    ry: Length,
}
impl Wavefront {
    /// Creates a new [`Wavefront`] with zeroed field buffers allocated for the given mesh.
    #[must_use]
    pub fn new(mesh: RadMesh) -> Self {
        let len = 2 * mesh.len();
        Self {
            mesh,
            ex: vec![0.0; len],
            ey: vec![0.0; len],
            unit: FieldUnit::default(),
            particle_beam: None,
            rx: Length::new::<meter>(0.0),
            ry: Length::new::<meter>(0.0),
        }
    }
    /// Returns a reference to the mesh of this [`Wavefront`].
    #[must_use]
    pub const fn mesh(&self) -> &RadMesh {
        &self.mesh
    }
    /// Returns the horizontal field component (interleaved re/im).
    #[must_use]
    pub fn ex(&self) -> &[f32] {
        &self.ex
    }
    /// Returns the vertical field component (interleaved re/im).
    #[must_use]
    pub fn ey(&self) -> &[f32] {
        &self.ey
    }
    /// Overwrite both field components.
    ///
    /// # Errors
    ///
    /// This function will return an error if a buffer does not hold `2 * ne * nx * ny` values.
    pub fn set_field(&mut self, ex: Vec<f32>, ey: Vec<f32>) -> HermesResult<()> {
        let expected = 2 * self.mesh.len();
        if ex.len() != expected || ey.len() != expected {
            return Err(HermesError::Engine(format!(
                "field buffers must hold {expected} values, got {} and {}",
                ex.len(),
                ey.len()
            )));
        }
        self.ex = ex;
        self.ey = ey;
        Ok(())
    }
    /// Returns the field unit.
    #[must_use]
    pub const fn unit(&self) -> FieldUnit {
        self.unit
    }
    /// Set the field unit.
    pub fn set_unit(&mut self, unit: FieldUnit) {
        self.unit = unit;
    }
    /// Returns the electron beam that emitted this [`Wavefront`] (if set).
    #[must_use]
    pub const fn particle_beam(&self) -> Option<&ParticleBeam> {
        self.particle_beam.as_ref()
    }
    /// Attach the emitting electron beam.
    pub fn set_particle_beam(&mut self, beam: ParticleBeam) {
        self.particle_beam = Some(beam);
    }
    /// Horizontal radius of curvature.
    #[must_use]
    pub const fn rx(&self) -> Length {
        self.rx
    }
    /// Vertical radius of curvature.
    #[must_use]
    pub const fn ry(&self) -> Length {
        self.ry
    }
    /// Set the radii of curvature (as reported by the engine).
    pub fn set_radii(&mut self, rx: Length, ry: Length) {
        self.rx = rx;
        self.ry = ry;
    }
}
