#![warn(missing_docs)]
//! Simulation configuration file.
//!
//! A configuration is a YAML document with the sections `wavefront`, `electron_beam`, `undulator`,
//! `precision`, `beamline`, `execution` and `output`. Every entry has a default value describing the
//! HERMES soft X-ray beamline, so an empty document is a valid configuration.
use crate::{
    beamline::{Branch, BeamlineComposite},
    driver::ExecutionMode,
    electron_beam::{ParticleBeam, NB_SECOND_MOMENTS},
    elements::{BounceDirection, MirrorGeometry, MirrorOrientation},
    error::{HermesError, HermesResult},
    magnetic_field::{FieldSymmetry, HarmonicField, MagneticFieldContainer, Undulator},
    mesh::RadMesh,
    precision::{SrMethod, SrPrecision},
    reporting::PlotFormat,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use uom::si::{
    angle::{degree, radian},
    electric_current::ampere,
    energy::electronvolt,
    f64::{Angle, ElectricCurrent, Energy, Length, MagneticFluxDensity},
    length::{meter, millimeter},
    magnetic_flux_density::tesla,
};

/// Complete configuration of a simulation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// initial wavefront mesh
    pub wavefront: WavefrontConfig,
    /// electron beam
    pub electron_beam: ElectronBeamConfig,
    /// undulator source
    pub undulator: UndulatorConfig,
    /// precision of the field calculation
    pub precision: PrecisionConfig,
    /// optical beamline
    pub beamline: BeamlineConfig,
    /// execution mode
    pub execution: ExecutionConfig,
    /// output locations
    pub output: OutputConfig,
}
impl SimulationConfig {
    /// Read a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> HermesResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            HermesError::Config(format!("cannot read file {} : {}", path.display(), e))
        })?;
        let config = Self::from_yaml(&contents)?;
        info!("configuration read from {}", path.display());
        Ok(config)
    }
    /// Parse a configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// This function will return an error if the string is not a valid configuration.
    pub fn from_yaml(yaml: &str) -> HermesResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
            .map_err(|e| HermesError::Config(format!("parsing of configuration failed: {e}")))
    }
    /// Serialize this configuration into a YAML string.
    ///
    /// # Errors
    ///
    /// This function will return an error if the serialization fails.
    pub fn to_yaml(&self) -> HermesResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| HermesError::Config(format!("serialization of configuration failed: {e}")))
    }
    /// Photon energy of the initial wavefront.
    #[must_use]
    pub fn photon_energy(&self) -> Energy {
        Energy::new::<electronvolt>(self.wavefront.photon_energy_ev)
    }
    /// Build the initial wavefront mesh.
    ///
    /// # Errors
    ///
    /// This function will return an error if the mesh is invalid.
    pub fn mesh(&self) -> HermesResult<RadMesh> {
        let w = &self.wavefront;
        RadMesh::centered(
            self.photon_energy(),
            (
                Length::new::<millimeter>(w.range_mm.0),
                Length::new::<millimeter>(w.range_mm.1),
            ),
            w.nb_pixels,
            Length::new::<meter>(w.pupil_position_m),
        )
    }
    /// Build the undulator.
    ///
    /// # Errors
    ///
    /// This function will return an error if the undulator parameters are invalid.
    pub fn undulator(&self) -> HermesResult<Undulator> {
        let u = &self.undulator;
        let period = Length::new::<millimeter>(u.period_mm);
        Undulator::new(
            period,
            period * f64::from(u.nb_periods),
            HarmonicField {
                peak: MagneticFluxDensity::new::<tesla>(u.peak_field_t.0),
                phase: Angle::new::<radian>(u.phase_rad.0),
                symmetry: FieldSymmetry::try_from(u.symmetry.0)?,
            },
            HarmonicField {
                peak: MagneticFluxDensity::new::<tesla>(u.peak_field_t.1),
                phase: Angle::new::<radian>(u.phase_rad.1),
                symmetry: FieldSymmetry::try_from(u.symmetry.1)?,
            },
        )
    }
    /// Build the magnetic field container holding the undulator centered at the origin.
    ///
    /// # Errors
    ///
    /// This function will return an error if the undulator parameters are invalid.
    pub fn magnetic_field(&self) -> HermesResult<MagneticFieldContainer> {
        Ok(MagneticFieldContainer::single(self.undulator()?))
    }
    /// Build the electron beam. Its longitudinal start position is placed upstream of the undulator.
    ///
    /// # Errors
    ///
    /// This function will return an error if the beam or undulator parameters are invalid.
    pub fn particle_beam(&self) -> HermesResult<ParticleBeam> {
        let e = &self.electron_beam;
        let mut beam = ParticleBeam::new(ElectricCurrent::new::<ampere>(e.current_a), e.gamma)?;
        beam.set_transverse_position(
            (Length::new::<meter>(e.position_m.0), Length::new::<meter>(e.position_m.1)),
            e.angle_rad,
        )?;
        beam.set_second_moments(e.second_moments)?;
        let undulator = self.undulator()?;
        beam.set_initial_position(undulator.upstream_start(self.undulator.start_margin_periods))?;
        Ok(beam)
    }
    /// Build the precision record of the field calculation.
    ///
    /// # Errors
    ///
    /// This function will return an error if a precision parameter is invalid.
    pub fn precision(&self) -> HermesResult<SrPrecision> {
        let p = &self.precision;
        SrPrecision::new(p.method, p.relative_precision, p.sampling_factor)?
            .with_integration_range(
                Length::new::<meter>(p.integration_range_m.0),
                Length::new::<meter>(p.integration_range_m.1),
            )?
            .with_trajectory_points(p.trajectory_points)
            .map(|prec| prec.with_terminating_terms(p.terminating_terms))
    }
    /// Build the optical beamline of the configured branch.
    ///
    /// # Errors
    ///
    /// This function will return an error if an element is invalid or the grating order does not propagate.
    pub fn beamline(&self) -> HermesResult<BeamlineComposite> {
        let w = &self.wavefront;
        self.beamline.branch.build(
            &self.beamline,
            self.photon_energy(),
            (
                Length::new::<millimeter>(w.range_mm.0),
                Length::new::<millimeter>(w.range_mm.0),
            ),
        )
    }
    /// Execution mode derived from the configured number of macro electrons.
    ///
    /// # Errors
    ///
    /// This function will return an error if the number of macro electrons is not positive.
    pub fn execution_mode(&self) -> HermesResult<ExecutionMode> {
        ExecutionMode::try_from(self.execution.n_macro_elec)
    }
}

/// Initial wavefront mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WavefrontConfig {
    /// photon energy in eV
    pub photon_energy_ev: f64,
    /// number of pixels `(nx, ny)`
    pub nb_pixels: (usize, usize),
    /// full range `(x, y)` in mm
    pub range_mm: (f64, f64),
    /// longitudinal position of the pupil in m
    pub pupil_position_m: f64,
}
impl Default for WavefrontConfig {
    fn default() -> Self {
        Self {
            photon_energy_ev: 719.9,
            nb_pixels: (100, 100),
            range_mm: (5.0, 5.0),
            pupil_position_m: 18.151,
        }
    }
}

/// Electron beam moments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectronBeamConfig {
    /// average current in A
    pub current_a: f64,
    /// Lorentz factor
    pub gamma: f64,
    /// transverse centroid position `(x, y)` in m
    pub position_m: (f64, f64),
    /// centroid angles `(x', y')` in rad
    pub angle_rad: (f64, f64),
    /// second order moments (see [`ParticleBeam`])
    pub second_moments: [f64; NB_SECOND_MOMENTS],
}
impl Default for ElectronBeamConfig {
    fn default() -> Self {
        let mut second_moments = [0.0; NB_SECOND_MOMENTS];
        second_moments[0] = 5.287_354_968_415_840_4e-8;
        second_moments[1] = 1.637_674_905_198_019_8e-9;
        second_moments[2] = 9.363_301_879_518_787e-10;
        second_moments[3] = 1.666_155_257_425_742_6e-10;
        second_moments[4] = 4.177_394_430_693_069e-11;
        second_moments[5] = 2.321_201_599_884_592e-11;
        second_moments[10] = 0.001_025 * 0.001_025;
        Self {
            current_a: 0.5,
            gamma: 5_381.615_754_828_152,
            position_m: (0.0, 0.0),
            angle_rad: (0.0, 0.0),
            second_moments,
        }
    }
}

/// Planar / elliptical undulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndulatorConfig {
    /// period in mm
    pub period_mm: f64,
    /// number of periods
    pub nb_periods: u32,
    /// peak fields `(horizontal, vertical)` in T
    pub peak_field_t: (f64, f64),
    /// initial phases `(horizontal, vertical)` in rad
    pub phase_rad: (f64, f64),
    /// symmetry flags `(horizontal, vertical)`, `1` symmetric, `-1` anti-symmetric
    pub symmetry: (i32, i32),
    /// additional periods (split on both sides) before the electron trajectory starts
    pub start_margin_periods: f64,
}
impl Default for UndulatorConfig {
    fn default() -> Self {
        Self {
            period_mm: 64.0,
            nb_periods: 28,
            peak_field_t: (0.0, 0.176_894_092_624_692_5),
            phase_rad: (0.0, 0.0),
            symmetry: (-1, -1),
            start_margin_periods: 4.0,
        }
    }
}

/// Precision of the synchrotron radiation calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecisionConfig {
    /// integration method
    pub method: SrMethod,
    /// relative precision
    pub relative_precision: f64,
    /// longitudinal integration range `(start, end)` in m (effective if `start < end`)
    pub integration_range_m: (f64, f64),
    /// number of points of the trajectory calculation
    pub trajectory_points: u32,
    /// use the terminating terms of the radiation integral
    pub terminating_terms: bool,
    /// sampling factor for adjusting `nx`, `ny` (effective if > 0)
    pub sampling_factor: f64,
}
impl Default for PrecisionConfig {
    fn default() -> Self {
        Self {
            method: SrMethod::AutoUndulator,
            relative_precision: 0.01,
            integration_range_m: (0.0, 0.0),
            trajectory_points: 30_000,
            terminating_terms: true,
            sampling_factor: 0.2,
        }
    }
}

/// Grazing incidence mirror surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// deflection direction
    pub bounce: BounceDirection,
    /// grazing angle in degree
    pub grazing_deg: f64,
    /// `(tangential, sagittal)` size in mm
    pub size_mm: (f64, f64),
    /// `(tangential, sagittal)` number of surface points
    pub nb_points: (usize, usize),
}
impl MirrorConfig {
    /// Grazing angle of this surface.
    #[must_use]
    pub fn grazing_angle(&self) -> Angle {
        Angle::new::<degree>(self.grazing_deg)
    }
    /// Build the mirror geometry.
    ///
    /// # Errors
    ///
    /// This function will return an error if the sizes or sampling are invalid.
    pub fn geometry(&self) -> HermesResult<MirrorGeometry> {
        MirrorGeometry::new(
            (
                Length::new::<millimeter>(self.size_mm.0),
                Length::new::<millimeter>(self.size_mm.1),
            ),
            self.nb_points,
            MirrorOrientation::from_bounce(self.bounce, self.grazing_angle()),
        )
    }
}

/// Toroidal mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToroidConfig {
    /// mirror surface
    pub surface: MirrorConfig,
    /// `(tangential, sagittal)` radii in m
    pub radii_m: (f64, f64),
}

/// Variable line spacing grating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GratingConfig {
    /// substrate surface
    pub surface: MirrorConfig,
    /// groove density polynomial `[n0, n1, n2, n3]` in lines/mm^k
    pub groove_density: [f64; 4],
    /// diffraction order
    pub order: i32,
    /// fixed focus constant
    pub cff: f64,
}

/// Optical elements and distances of the beamline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamlineConfig {
    /// beamline branch
    pub branch: Branch,
    /// pupil aperture `(dx, dy)` in mm (defaults to the horizontal wavefront range)
    pub pupil_mm: Option<(f64, f64)>,
    /// first (plane) mirror
    pub m1a: MirrorConfig,
    /// distance between the first and the second mirror in m
    pub m1a_to_m1b_m: f64,
    /// second (toroidal) mirror
    pub m1b: ToroidConfig,
    /// distance between the second mirror and the monochromator entrance slit in m
    pub m1b_to_slit_m: f64,
    /// entrance slit `(dx, dy)` in mm (defaults to the horizontal wavefront range)
    pub slit_mm: Option<(f64, f64)>,
    /// distance between the entrance slit and the grating in m
    pub slit_to_grating_m: f64,
    /// monochromator grating
    pub grating: GratingConfig,
    /// drift after the grating in m
    pub grating_exit_m: f64,
}
impl Default for BeamlineConfig {
    fn default() -> Self {
        Self {
            branch: Branch::Mono,
            pupil_mm: None,
            m1a: MirrorConfig {
                bounce: BounceDirection::Right,
                grazing_deg: 2.5,
                size_mm: (200.0, 18.0),
                nb_points: (100, 100),
            },
            m1a_to_m1b_m: 0.470_422,
            m1b: ToroidConfig {
                surface: MirrorConfig {
                    bounce: BounceDirection::Left,
                    grazing_deg: 2.5,
                    size_mm: (200.0, 10.0),
                    nb_points: (1001, 1001),
                },
                radii_m: (126.7433, 1.802_572),
            },
            m1b_to_slit_m: 3.209_598_220_632_745_6,
            slit_mm: None,
            slit_to_grating_m: 0.6,
            grating: GratingConfig {
                surface: MirrorConfig {
                    bounce: BounceDirection::Up,
                    grazing_deg: 2.302_402,
                    size_mm: (80.0, 5.0),
                    nb_points: (1001, 1001),
                },
                groove_density: [
                    450.000_151_854_389_64,
                    -4.913_536_679_497_512_5,
                    -18.437_531_686_217_524,
                    4.958_000_341_989_1,
                ],
                order: -1,
                cff: 0.2,
            },
            grating_exit_m: 0.311_199,
        }
    }
}

/// Execution mode of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// number of macro electrons (`1`: coherent single electron, `> 1`: partially coherent)
    pub n_macro_elec: i64,
    /// number of macro electrons averaged by one worker before sending its result
    pub electrons_per_worker: u32,
    /// number of averaging iterations between two checkpoints of the output file
    pub checkpoint_period: u32,
}
impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            n_macro_elec: 1,
            electrons_per_worker: 5,
            checkpoint_period: 20,
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// directory for intensity / phase plots (no plots if not set)
    pub plot_dir: Option<PathBuf>,
    /// file format of the plots
    pub plot_format: PlotFormat,
    /// directory of the multi-electron result files
    pub results_dir: PathBuf,
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            plot_dir: None,
            plot_format: PlotFormat::Png,
            results_dir: PathBuf::from("results"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use uom::si::length::micrometer;

    #[test]
    fn empty_document() {
        assert_eq!(
            SimulationConfig::from_yaml("").unwrap(),
            SimulationConfig::default()
        );
        assert_eq!(
            SimulationConfig::from_yaml("{}").unwrap(),
            SimulationConfig::default()
        );
    }
    #[test]
    fn partial_document() {
        let config = SimulationConfig::from_yaml(
            "execution:\n  n_macro_elec: 50000\noutput:\n  plot_format: svg\n",
        )
        .unwrap();
        assert_eq!(config.execution.n_macro_elec, 50_000);
        assert_eq!(config.execution.checkpoint_period, 20);
        assert_eq!(config.output.plot_format, PlotFormat::Svg);
        assert_eq!(config.wavefront, WavefrontConfig::default());
    }
    #[test]
    fn invalid_document() {
        assert_matches!(
            SimulationConfig::from_yaml("wavefront: [1, 2"),
            Err(HermesError::Config(_))
        );
        assert!(SimulationConfig::from_yaml("execution:\n  n_macro_elec: many\n").is_err());
    }
    #[test]
    fn yaml_round_trip() {
        let mut config = SimulationConfig::default();
        config.output.plot_dir = Some(PathBuf::from("plots"));
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("photon_energy_ev: 719.9"));
        assert_eq!(SimulationConfig::from_yaml(&yaml).unwrap(), config);
    }
    #[test]
    fn from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "wavefront:\n  nb_pixels: [50, 40]\n").unwrap();
        let config = SimulationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.wavefront.nb_pixels, (50, 40));
        let result = SimulationConfig::from_file(Path::new("./invalid_file_path/invalid.yaml"));
        assert!(result
            .unwrap_err()
            .to_string()
            .starts_with("Config:cannot read file ./invalid_file_path/invalid.yaml"));
    }
    #[test]
    fn default_mesh() {
        let mesh = SimulationConfig::default().mesh().unwrap();
        assert_eq!((mesh.nx(), mesh.ny(), mesh.ne()), (100, 100, 1));
        assert_abs_diff_eq!(mesh.x_start().get::<millimeter>(), -2.5);
        assert_abs_diff_eq!(mesh.z_start().get::<meter>(), 18.151);
        assert_abs_diff_eq!(
            mesh.pitch_x().unwrap().get::<micrometer>(),
            50.505_050_5,
            epsilon = 1e-6
        );
    }
    #[test]
    fn default_particle_beam() {
        let beam = SimulationConfig::default().particle_beam().unwrap();
        assert_abs_diff_eq!(
            beam.first_moments().z.get::<meter>(),
            -1.024,
            epsilon = 1e-12
        );
        assert_eq!(beam.gamma(), 5_381.615_754_828_152);
        assert_abs_diff_eq!(beam.energy_spread(), 0.001_025, epsilon = 1e-12);
        assert_eq!(beam.second_moments()[3], 1.666_155_257_425_742_6e-10);
    }
    #[test]
    fn default_source_is_resonant() {
        let config = SimulationConfig::default();
        let undulator = config.undulator().unwrap();
        let beam = config.particle_beam().unwrap();
        let e1 = undulator.fundamental_energy(&beam).get::<electronvolt>();
        assert_abs_diff_eq!(e1, config.wavefront.photon_energy_ev, epsilon = 1.0);
        assert_eq!(config.magnetic_field().unwrap().fields().len(), 1);
    }
    #[test]
    fn invalid_symmetry() {
        let mut config = SimulationConfig::default();
        config.undulator.symmetry = (0, -1);
        assert_matches!(config.undulator(), Err(HermesError::MagneticField(_)));
    }
    #[test]
    fn default_precision() {
        assert_eq!(
            SimulationConfig::default().precision().unwrap(),
            SrPrecision::default()
        );
    }
    #[test]
    fn default_beamline() {
        let beamline = SimulationConfig::default().beamline().unwrap();
        assert_eq!(beamline.len(), 9);
    }
    #[test]
    fn execution_mode() {
        let mut config = SimulationConfig::default();
        assert_eq!(config.execution_mode().unwrap(), ExecutionMode::Coherent);
        config.execution.n_macro_elec = 0;
        assert_matches!(config.execution_mode(), Err(HermesError::Config(_)));
    }
}
