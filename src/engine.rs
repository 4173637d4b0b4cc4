#![warn(missing_docs)]
//! Interface to the physics engine performing the field calculation, propagation and intensity extraction.
//!
//! The engine is consumed as an opaque service through the [`SrwEngine`] trait. [`DryRunEngine`] is a
//! lightweight implementation which records all calls and fills the wavefront with a Gaussian test field.
use crate::{
    beamline::BeamlineComposite,
    electron_beam::ParticleBeam,
    error::{HermesError, HermesResult},
    magnetic_field::MagneticFieldContainer,
    mesh::RadMesh,
    precision::SrPrecision,
    utils::usize_to_f64,
    wavefront::Wavefront,
};
use log::info;
use std::path::PathBuf;
use strum::{Display, EnumIter};
use uom::si::{
    f64::{Energy, Length},
    length::meter,
};

/// Polarization component of an intensity request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Polarization {
    /// linear horizontal
    LinearHorizontal,
    /// linear vertical
    LinearVertical,
    /// linear 45°
    Linear45,
    /// linear 135°
    Linear135,
    /// circular right
    CircularRight,
    /// circular left
    CircularLeft,
    /// total
    Total,
}
impl Polarization {
    /// Numeric code of the engine.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::LinearHorizontal => 0,
            Self::LinearVertical => 1,
            Self::Linear45 => 2,
            Self::Linear135 => 3,
            Self::CircularRight => 4,
            Self::CircularLeft => 5,
            Self::Total => 6,
        }
    }
}

/// Quantity extracted from the electric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum IntensityKind {
    /// single electron intensity
    SingleElectron,
    /// multi electron intensity
    MultiElectron,
    /// single electron flux
    SingleElectronFlux,
    /// multi electron flux
    MultiElectronFlux,
    /// single electron radiation phase
    Phase,
    /// real part of the single electron field
    RealPart,
    /// imaginary part of the single electron field
    ImaginaryPart,
}
impl IntensityKind {
    /// Numeric code of the engine.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::SingleElectron => 0,
            Self::MultiElectron => 1,
            Self::SingleElectronFlux => 2,
            Self::MultiElectronFlux => 3,
            Self::Phase => 4,
            Self::RealPart => 5,
            Self::ImaginaryPart => 6,
        }
    }
}

/// Mesh dimensions the extracted quantity depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Dependence {
    /// photon energy
    Energy,
    /// horizontal position
    X,
    /// vertical position
    Y,
    /// horizontal and vertical position
    XY,
    /// photon energy and horizontal position
    EnergyX,
    /// photon energy and vertical position
    EnergyY,
    /// photon energy, horizontal and vertical position
    EnergyXY,
}
impl Dependence {
    /// Numeric code of the engine.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Energy => 0,
            Self::X => 1,
            Self::Y => 2,
            Self::XY => 3,
            Self::EnergyX => 4,
            Self::EnergyY => 5,
            Self::EnergyXY => 6,
        }
    }
    /// Number of values of a result depending on these mesh dimensions.
    #[must_use]
    pub const fn result_len(self, mesh: &RadMesh) -> usize {
        match self {
            Self::Energy => mesh.ne(),
            Self::X => mesh.nx(),
            Self::Y => mesh.ny(),
            Self::XY => mesh.nx() * mesh.ny(),
            Self::EnergyX => mesh.ne() * mesh.nx(),
            Self::EnergyY => mesh.ne() * mesh.ny(),
            Self::EnergyXY => mesh.len(),
        }
    }
}

/// Request for the extraction of an intensity, phase or field component from a [`Wavefront`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityRequest {
    /// polarization component
    pub polarization: Polarization,
    /// extracted quantity
    pub kind: IntensityKind,
    /// dependence on the mesh dimensions
    pub dependence: Dependence,
    /// photon energy (for results not depending on the energy)
    pub photon_energy: Energy,
    /// horizontal position (for results not depending on x)
    pub x: Length,
    /// vertical position (for results not depending on y)
    pub y: Length,
}
impl IntensityRequest {
    fn on_axis(
        polarization: Polarization,
        kind: IntensityKind,
        dependence: Dependence,
        photon_energy: Energy,
    ) -> Self {
        Self {
            polarization,
            kind,
            dependence,
            photon_energy,
            x: Length::new::<meter>(0.0),
            y: Length::new::<meter>(0.0),
        }
    }
    /// Total single electron intensity as function of x and y.
    #[must_use]
    pub fn intensity_map(photon_energy: Energy) -> Self {
        Self::on_axis(
            Polarization::Total,
            IntensityKind::SingleElectron,
            Dependence::XY,
            photon_energy,
        )
    }
    /// Total single electron intensity along a horizontal (`Dependence::X`) or vertical (`Dependence::Y`) cut
    /// through the optical axis.
    #[must_use]
    pub fn intensity_cut(photon_energy: Energy, dependence: Dependence) -> Self {
        Self::on_axis(
            Polarization::Total,
            IntensityKind::SingleElectron,
            dependence,
            photon_energy,
        )
    }
    /// Phase of the horizontally polarized field as function of x and y.
    #[must_use]
    pub fn phase_map(photon_energy: Energy) -> Self {
        Self::on_axis(
            Polarization::LinearHorizontal,
            IntensityKind::Phase,
            Dependence::XY,
            photon_energy,
        )
    }
}

/// Parameters of a multi-electron (partially coherent) emission and propagation run.
#[derive(Debug, Clone)]
pub struct MultiElectronJob<'a> {
    /// electron beam
    pub particle_beam: &'a ParticleBeam,
    /// magnetic field
    pub magnetic_field: &'a MagneticFieldContainer,
    /// mesh of the initial wavefront
    pub mesh: &'a RadMesh,
    /// precision of the field calculation (method, relative precision, sampling factor)
    pub precision: &'a SrPrecision,
    /// total number of macro electrons
    pub n_macro_elec: u64,
    /// number of macro electrons averaged by one worker before sending its result
    pub electrons_per_worker: u32,
    /// number of averaging iterations between two checkpoints of the output file
    pub checkpoint_period: u32,
    /// file receiving the accumulated Stokes parameters
    pub output_file: PathBuf,
    /// beamline the wavefront of each macro electron is propagated through
    pub beamline: &'a BeamlineComposite,
}

/// Services of a synchrotron radiation wavefront engine.
pub trait SrwEngine {
    /// Calculate the electric field emitted by the electron beam attached to `wavefront` in `magnetic_field`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the engine fails.
    fn calc_elec_field_sr(
        &mut self,
        wavefront: &mut Wavefront,
        magnetic_field: &MagneticFieldContainer,
        precision: &SrPrecision,
    ) -> HermesResult<()>;
    /// Propagate `wavefront` in place through `beamline`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the engine fails.
    fn propagate_elec_field(
        &mut self,
        wavefront: &mut Wavefront,
        beamline: &BeamlineComposite,
    ) -> HermesResult<()>;
    /// Extract an intensity, phase or field component from `wavefront`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the engine fails.
    fn calc_int_from_elec_field(
        &mut self,
        wavefront: &Wavefront,
        request: &IntensityRequest,
    ) -> HermesResult<Vec<f64>>;
    /// Run a multi-electron emission and propagation, accumulating the result in `job.output_file`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the engine fails.
    fn emit_prop_multi_e(&mut self, job: &MultiElectronJob<'_>) -> HermesResult<()>;
    /// Returns `true` if this process coordinates a (possibly distributed) run.
    fn is_primary(&self) -> bool {
        true
    }
}

/// Call received by a [`DryRunEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    /// field calculation on the given mesh
    CalcElecField {
        /// number of mesh points
        nb_points: usize,
    },
    /// single shot propagation
    Propagate {
        /// number of beamline elements
        nb_elements: usize,
    },
    /// intensity extraction
    Intensity(IntensityRequest),
    /// multi-electron run
    MultiElectron {
        /// number of macro electrons
        n_macro_elec: u64,
        /// output file
        output_file: PathBuf,
    },
}

/// Engine which records calls and produces a Gaussian test field instead of a physical simulation.
#[derive(Debug, Clone)]
pub struct DryRunEngine {
    primary: bool,
    calls: Vec<EngineCall>,
}
impl Default for DryRunEngine {
    fn default() -> Self {
        Self {
            primary: true,
            calls: Vec::new(),
        }
    }
}
impl DryRunEngine {
    /// Creates a new [`DryRunEngine`] taking the given process role.
    #[must_use]
    pub const fn new(primary: bool) -> Self {
        Self {
            primary,
            calls: Vec::new(),
        }
    }
    /// Returns the calls received so far.
    #[must_use]
    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }
}

fn axis_positions(start: Length, fin: Length, n: usize) -> Vec<f64> {
    let (start, fin) = (start.get::<meter>(), fin.get::<meter>());
    if n < 2 {
        return vec![start];
    }
    let step = (fin - start) / usize_to_f64(n - 1);
    (0..n).map(|i| usize_to_f64(i).mul_add(step, start)).collect()
}

fn nearest_index(positions: &[f64], value: f64) -> usize {
    positions
        .iter()
        .enumerate()
        .min_by(|a, b| (a.1 - value).abs().total_cmp(&(b.1 - value).abs()))
        .map_or(0, |(idx, _)| idx)
}

impl SrwEngine for DryRunEngine {
    fn calc_elec_field_sr(
        &mut self,
        wavefront: &mut Wavefront,
        magnetic_field: &MagneticFieldContainer,
        _precision: &SrPrecision,
    ) -> HermesResult<()> {
        if magnetic_field.is_empty() {
            return Err(HermesError::Engine(
                "no magnetic field to calculate the emission from".into(),
            ));
        }
        let mesh = wavefront.mesh().clone();
        info!("dry run: Gaussian field on {} mesh points", mesh.len());
        let xs = axis_positions(mesh.x_start(), mesh.x_fin(), mesh.nx());
        let ys = axis_positions(mesh.y_start(), mesh.y_fin(), mesh.ny());
        let sigma_x = (0.25 * mesh.range_x().get::<meter>()).max(f64::EPSILON);
        let sigma_y = (0.25 * mesh.range_y().get::<meter>()).max(f64::EPSILON);
        let mut ex = Vec::with_capacity(2 * mesh.len());
        for y in &ys {
            for x in &xs {
                let amplitude = (-0.25 * ((x / sigma_x).powi(2) + (y / sigma_y).powi(2))).exp();
                for _ in 0..mesh.ne() {
                    #[allow(clippy::cast_possible_truncation)]
                    ex.extend([amplitude as f32, 0.0]);
                }
            }
        }
        let ey = vec![0.0; ex.len()];
        wavefront.set_field(ex, ey)?;
        let distance = mesh.z_start() - magnetic_field.fields()[0].center.z;
        wavefront.set_radii(distance, distance);
        self.calls.push(EngineCall::CalcElecField {
            nb_points: mesh.len(),
        });
        Ok(())
    }
    fn propagate_elec_field(
        &mut self,
        wavefront: &mut Wavefront,
        beamline: &BeamlineComposite,
    ) -> HermesResult<()> {
        info!("dry run: propagation through {} elements", beamline.len());
        let length = beamline.total_length();
        wavefront.set_radii(wavefront.rx() + length, wavefront.ry() + length);
        self.calls.push(EngineCall::Propagate {
            nb_elements: beamline.len(),
        });
        Ok(())
    }
    fn calc_int_from_elec_field(
        &mut self,
        wavefront: &Wavefront,
        request: &IntensityRequest,
    ) -> HermesResult<Vec<f64>> {
        let mesh = wavefront.mesh();
        let xs = axis_positions(mesh.x_start(), mesh.x_fin(), mesh.nx());
        let ys = axis_positions(mesh.y_start(), mesh.y_fin(), mesh.ny());
        let ix0 = nearest_index(&xs, request.x.get::<meter>());
        let iy0 = nearest_index(&ys, request.y.get::<meter>());
        let value = |ie: usize, ix: usize, iy: usize| -> f64 {
            let idx = 2 * ((iy * mesh.nx() + ix) * mesh.ne() + ie);
            let (ex_re, ex_im) = (
                f64::from(wavefront.ex()[idx]),
                f64::from(wavefront.ex()[idx + 1]),
            );
            let (ey_re, ey_im) = (
                f64::from(wavefront.ey()[idx]),
                f64::from(wavefront.ey()[idx + 1]),
            );
            match (request.kind, request.polarization) {
                (IntensityKind::Phase, Polarization::LinearVertical) => ey_im.atan2(ey_re),
                (IntensityKind::Phase, _) => ex_im.atan2(ex_re),
                (IntensityKind::RealPart, _) => ex_re,
                (IntensityKind::ImaginaryPart, _) => ex_im,
                (_, Polarization::LinearHorizontal) => ex_re.mul_add(ex_re, ex_im * ex_im),
                (_, Polarization::LinearVertical) => ey_re.mul_add(ey_re, ey_im * ey_im),
                _ => ex_re.mul_add(ex_re, ex_im * ex_im) + ey_re.mul_add(ey_re, ey_im * ey_im),
            }
        };
        let values: Vec<f64> = match request.dependence {
            Dependence::Energy => (0..mesh.ne()).map(|ie| value(ie, ix0, iy0)).collect(),
            Dependence::X => (0..mesh.nx()).map(|ix| value(0, ix, iy0)).collect(),
            Dependence::Y => (0..mesh.ny()).map(|iy| value(0, ix0, iy)).collect(),
            Dependence::XY => (0..mesh.ny())
                .flat_map(|iy| (0..mesh.nx()).map(move |ix| (ix, iy)))
                .map(|(ix, iy)| value(0, ix, iy))
                .collect(),
            Dependence::EnergyX => (0..mesh.nx())
                .flat_map(|ix| (0..mesh.ne()).map(move |ie| (ie, ix)))
                .map(|(ie, ix)| value(ie, ix, iy0))
                .collect(),
            Dependence::EnergyY => (0..mesh.ny())
                .flat_map(|iy| (0..mesh.ne()).map(move |ie| (ie, iy)))
                .map(|(ie, iy)| value(ie, ix0, iy))
                .collect(),
            Dependence::EnergyXY => (0..mesh.len())
                .map(|i| {
                    value(
                        i % mesh.ne(),
                        (i / mesh.ne()) % mesh.nx(),
                        i / (mesh.ne() * mesh.nx()),
                    )
                })
                .collect(),
        };
        self.calls.push(EngineCall::Intensity(*request));
        Ok(values)
    }
    fn emit_prop_multi_e(&mut self, job: &MultiElectronJob<'_>) -> HermesResult<()> {
        info!(
            "dry run: {} macro electrons through {} elements into {}",
            job.n_macro_elec,
            job.beamline.len(),
            job.output_file.display()
        );
        self.calls.push(EngineCall::MultiElectron {
            n_macro_elec: job.n_macro_elec,
            output_file: job.output_file.clone(),
        });
        Ok(())
    }
    fn is_primary(&self) -> bool {
        self.primary
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ampere, electronvolt, magnetic_field::Undulator, meter, millimeter, tesla};
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use strum::IntoEnumIterator;

    fn wavefront(nx: usize, ny: usize) -> Wavefront {
        Wavefront::new(
            RadMesh::centered(
                electronvolt!(719.9),
                (millimeter!(5.0), millimeter!(5.0)),
                (nx, ny),
                meter!(18.151),
            )
            .unwrap(),
        )
    }
    fn field() -> MagneticFieldContainer {
        MagneticFieldContainer::single(
            Undulator::planar(millimeter!(64.0), 28, tesla!(0.176_894)).unwrap(),
        )
    }
    #[test]
    fn codes() {
        let codes: Vec<u8> = Polarization::iter().map(Polarization::code).collect();
        assert_eq!(codes, (0..7).collect::<Vec<u8>>());
        let codes: Vec<u8> = IntensityKind::iter().map(IntensityKind::code).collect();
        assert_eq!(codes, (0..7).collect::<Vec<u8>>());
        let codes: Vec<u8> = Dependence::iter().map(Dependence::code).collect();
        assert_eq!(codes, (0..7).collect::<Vec<u8>>());
    }
    #[test]
    fn requests() {
        let r = IntensityRequest::intensity_map(electronvolt!(719.9));
        assert_eq!(
            (r.polarization.code(), r.kind.code(), r.dependence.code()),
            (6, 0, 3)
        );
        let r = IntensityRequest::phase_map(electronvolt!(719.9));
        assert_eq!(
            (r.polarization.code(), r.kind.code(), r.dependence.code()),
            (0, 4, 3)
        );
        let r = IntensityRequest::intensity_cut(electronvolt!(719.9), Dependence::Y);
        assert_eq!(r.dependence.code(), 2);
    }
    #[test]
    fn result_len() {
        let wfr = wavefront(10, 20);
        assert_eq!(Dependence::XY.result_len(wfr.mesh()), 200);
        assert_eq!(Dependence::X.result_len(wfr.mesh()), 10);
        assert_eq!(Dependence::EnergyY.result_len(wfr.mesh()), 20);
    }
    #[test]
    fn dry_run_field() {
        let mut engine = DryRunEngine::default();
        let mut wfr = wavefront(11, 11);
        engine
            .calc_elec_field_sr(&mut wfr, &field(), &SrPrecision::default())
            .unwrap();
        assert_eq!(
            engine.calls(),
            &[EngineCall::CalcElecField { nb_points: 121 }]
        );
        assert_abs_diff_eq!(wfr.rx().get::<meter>(), 18.151);
        let map = engine
            .calc_int_from_elec_field(&wfr, &IntensityRequest::intensity_map(electronvolt!(719.9)))
            .unwrap();
        assert_eq!(map.len(), 121);
        assert_abs_diff_eq!(map[60], 1.0);
        assert!(map[0] < map[60]);
        let cut = engine
            .calc_int_from_elec_field(
                &wfr,
                &IntensityRequest::intensity_cut(electronvolt!(719.9), Dependence::X),
            )
            .unwrap();
        assert_eq!(cut.len(), 11);
        assert_abs_diff_eq!(cut[5], map[60]);
        let phase = engine
            .calc_int_from_elec_field(&wfr, &IntensityRequest::phase_map(electronvolt!(719.9)))
            .unwrap();
        assert!(phase.iter().all(|p| *p == 0.0));
    }
    #[test]
    fn dry_run_without_field() {
        let mut engine = DryRunEngine::default();
        let mut wfr = wavefront(2, 2);
        assert_matches!(
            engine.calc_elec_field_sr(
                &mut wfr,
                &MagneticFieldContainer::default(),
                &SrPrecision::default()
            ),
            Err(HermesError::Engine(_))
        );
        assert!(engine.calls().is_empty());
    }
    #[test]
    fn dry_run_propagation() {
        let mut engine = DryRunEngine::new(false);
        assert!(!engine.is_primary());
        let mut wfr = wavefront(2, 2);
        wfr.set_radii(meter!(1.0), meter!(2.0));
        engine
            .propagate_elec_field(&mut wfr, &BeamlineComposite::new())
            .unwrap();
        assert_eq!(engine.calls(), &[EngineCall::Propagate { nb_elements: 0 }]);
        assert_eq!(wfr.ry(), meter!(2.0));
    }
    #[test]
    fn dry_run_multi_electron() {
        let mut engine = DryRunEngine::default();
        let wfr = wavefront(2, 2);
        let beam = ParticleBeam::new(ampere!(0.5), 5381.6).unwrap();
        let job = MultiElectronJob {
            particle_beam: &beam,
            magnetic_field: &field(),
            mesh: wfr.mesh(),
            precision: &SrPrecision::default(),
            n_macro_elec: 1000,
            electrons_per_worker: 5,
            checkpoint_period: 20,
            output_file: PathBuf::from("results/mono_1k_ME.dat"),
            beamline: &BeamlineComposite::new(),
        };
        engine.emit_prop_multi_e(&job).unwrap();
        assert_matches!(
            &engine.calls()[0],
            EngineCall::MultiElectron { n_macro_elec: 1000, .. }
        );
    }
}
