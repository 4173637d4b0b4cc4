#![warn(missing_docs)]
//! Execution of a simulation run: either a single coherent electron or a multi-electron partially coherent run.
use crate::{
    beamline::{BeamlineComposite, Branch},
    config::SimulationConfig,
    electron_beam::ParticleBeam,
    engine::{MultiElectronJob, SrwEngine},
    error::{HermesError, HermesResult},
    magnetic_field::MagneticFieldContainer,
    mesh::RadMesh,
    precision::SrPrecision,
    reporting::{PlotFormat, Reporter},
    utils::math_utils::u64_to_f64,
    wavefront::{FieldUnit, Wavefront},
};
use log::info;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

/// Execution mode selected by the number of macro electrons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// a single, fully coherent electron
    Coherent,
    /// averaging over the given number of macro electrons
    PartiallyCoherent(u64),
}
impl TryFrom<i64> for ExecutionMode {
    type Error = HermesError;

    fn try_from(n_macro_elec: i64) -> HermesResult<Self> {
        match n_macro_elec {
            1 => Ok(Self::Coherent),
            n if n > 1 => Ok(Self::PartiallyCoherent(n.unsigned_abs())),
            n => Err(HermesError::Config(format!(
                "number of macro electrons must be at least 1, got {n}"
            ))),
        }
    }
}

/// Result of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// wavefront before and after propagation through the beamline
    Coherent {
        /// wavefront at the pupil
        initial: Wavefront,
        /// wavefront after the last element
        propagated: Wavefront,
    },
    /// file holding the accumulated Stokes parameters
    PartiallyCoherent {
        /// output file of the multi-electron run
        output_file: PathBuf,
    },
}

/// Name of the multi-electron output file, e.g. `mono_50k_ME.dat`.
#[must_use]
pub fn results_file_name(branch: Branch, n_macro_elec: u64) -> String {
    let thousands = if n_macro_elec % 1000 == 0 {
        (n_macro_elec / 1000).to_string()
    } else {
        (u64_to_f64(n_macro_elec) / 1000.0).to_string()
    };
    format!("{branch}_{thousands}k_ME.dat")
}

/// A fully configured simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    mesh: RadMesh,
    particle_beam: ParticleBeam,
    magnetic_field: MagneticFieldContainer,
    precision: SrPrecision,
    branch: Branch,
    beamline: BeamlineComposite,
    mode: ExecutionMode,
    electrons_per_worker: u32,
    checkpoint_period: u32,
    results_dir: PathBuf,
    plot_dir: Option<PathBuf>,
    plot_format: PlotFormat,
}
impl Simulation {
    /// Build all simulation objects from a [`SimulationConfig`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the configuration is invalid.
    pub fn from_config(config: &SimulationConfig) -> HermesResult<Self> {
        let mode = config.execution_mode()?;
        info!("Generating the initial wavefront mesh");
        let mesh = config.mesh()?;
        info!("Generating the electron beam");
        let particle_beam = config.particle_beam()?;
        info!("Generating the magnetic structure");
        let magnetic_field = config.magnetic_field()?;
        let precision = config.precision()?;
        info!("Generating the {} beamline", config.beamline.branch);
        let beamline = config.beamline()?;
        Ok(Self {
            mesh,
            particle_beam,
            magnetic_field,
            precision,
            branch: config.beamline.branch,
            beamline,
            mode,
            electrons_per_worker: config.execution.electrons_per_worker,
            checkpoint_period: config.execution.checkpoint_period,
            results_dir: config.output.results_dir.clone(),
            plot_dir: config.output.plot_dir.clone(),
            plot_format: config.output.plot_format,
        })
    }
    /// Returns the execution mode.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }
    /// Returns the beamline.
    #[must_use]
    pub const fn beamline(&self) -> &BeamlineComposite {
        &self.beamline
    }
    /// Run the simulation on the given engine. Wavefront diagnostics are written to `out`.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the engine fails.
    ///   - the results directory cannot be created.
    ///   - the reporting fails.
    pub fn run<E: SrwEngine + ?Sized>(
        &self,
        engine: &mut E,
        out: &mut dyn Write,
    ) -> HermesResult<RunOutcome> {
        match self.mode {
            ExecutionMode::Coherent => self.run_coherent(engine, out),
            ExecutionMode::PartiallyCoherent(n) => self.run_partially_coherent(engine, n),
        }
    }
    fn run_coherent<E: SrwEngine + ?Sized>(
        &self,
        engine: &mut E,
        out: &mut dyn Write,
    ) -> HermesResult<RunOutcome> {
        let reporter = Reporter::new(engine.is_primary(), self.plot_dir.clone(), self.plot_format);
        let mut initial = Wavefront::new(self.mesh.clone());
        initial.set_unit(FieldUnit::SqrtPhotonFlux);
        initial.set_particle_beam(self.particle_beam.clone());
        info!("Undulator initial electric field calculation");
        engine.calc_elec_field_sr(&mut initial, &self.magnetic_field, &self.precision)?;
        reporter.report(engine, &initial, "before", out)?;

        let mut propagated = initial.clone();
        info!("Simulating electric field propagation");
        engine.propagate_elec_field(&mut propagated, &self.beamline)?;
        reporter.report(engine, &propagated, "after", out)?;
        Ok(RunOutcome::Coherent {
            initial,
            propagated,
        })
    }
    fn run_partially_coherent<E: SrwEngine + ?Sized>(
        &self,
        engine: &mut E,
        n_macro_elec: u64,
    ) -> HermesResult<RunOutcome> {
        let output_file = prepare_output_file(&self.results_dir, self.branch, n_macro_elec)?;
        let job = MultiElectronJob {
            particle_beam: &self.particle_beam,
            magnetic_field: &self.magnetic_field,
            mesh: &self.mesh,
            precision: &self.precision,
            n_macro_elec,
            electrons_per_worker: self.electrons_per_worker,
            checkpoint_period: self.checkpoint_period,
            output_file: output_file.clone(),
            beamline: &self.beamline,
        };
        info!(
            "Simulating partially coherent propagation of {n_macro_elec} macro electrons into {}",
            output_file.display()
        );
        engine.emit_prop_multi_e(&job)?;
        Ok(RunOutcome::PartiallyCoherent { output_file })
    }
}

/// Create the results directory (if needed) and return the path of the multi-electron output file.
fn prepare_output_file(
    results_dir: &Path,
    branch: Branch,
    n_macro_elec: u64,
) -> HermesResult<PathBuf> {
    fs::create_dir_all(results_dir).map_err(|e| {
        HermesError::Other(format!(
            "cannot create results directory {} : {}",
            results_dir.display(),
            e
        ))
    })?;
    Ok(results_dir.join(results_file_name(branch, n_macro_elec)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::{DryRunEngine, EngineCall};
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    fn config(n_macro_elec: i64, results_dir: &Path) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.wavefront.nb_pixels = (10, 10);
        config.execution.n_macro_elec = n_macro_elec;
        config.output.results_dir = results_dir.to_path_buf();
        config
    }
    #[test]
    fn execution_mode() {
        assert_eq!(ExecutionMode::try_from(1).unwrap(), ExecutionMode::Coherent);
        assert_eq!(
            ExecutionMode::try_from(50_000).unwrap(),
            ExecutionMode::PartiallyCoherent(50_000)
        );
        assert_matches!(ExecutionMode::try_from(0), Err(HermesError::Config(_)));
        assert!(ExecutionMode::try_from(-5).is_err());
    }
    #[test]
    fn file_name() {
        assert_eq!(results_file_name(Branch::Mono, 50_000), "mono_50k_ME.dat");
        assert_eq!(results_file_name(Branch::Mono, 1000), "mono_1k_ME.dat");
        assert_eq!(results_file_name(Branch::Mono, 500), "mono_0.5k_ME.dat");
        assert_eq!(results_file_name(Branch::Mono, 2_500), "mono_2.5k_ME.dat");
    }
    #[test]
    fn invalid_mode_rejected_at_construction() {
        let dir = TempDir::new().unwrap();
        assert_matches!(
            Simulation::from_config(&config(0, dir.path())),
            Err(HermesError::Config(_))
        );
    }
    #[test]
    fn coherent_run() {
        let dir = TempDir::new().unwrap();
        let results_dir = dir.path().join("results");
        let simulation = Simulation::from_config(&config(1, &results_dir)).unwrap();
        assert_eq!(simulation.mode(), ExecutionMode::Coherent);
        let mut engine = DryRunEngine::default();
        let mut out = Vec::new();
        let outcome = simulation.run(&mut engine, &mut out).unwrap();
        assert_eq!(
            engine.calls(),
            &[
                EngineCall::CalcElecField { nb_points: 100 },
                EngineCall::Propagate { nb_elements: 9 }
            ]
        );
        let RunOutcome::Coherent {
            initial,
            propagated,
        } = outcome
        else {
            panic!("coherent run without wavefronts");
        };
        assert!(initial.particle_beam().is_some());
        assert!(propagated.rx() > initial.rx());
        assert!(!results_dir.exists());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Wavefront information:").count(), 2);
    }
    #[test]
    fn partially_coherent_run() {
        let dir = TempDir::new().unwrap();
        let results_dir = dir.path().join("results");
        let simulation = Simulation::from_config(&config(50_000, &results_dir)).unwrap();
        let mut engine = DryRunEngine::default();
        let mut out = Vec::new();
        let outcome = simulation.run(&mut engine, &mut out).unwrap();
        let expected = results_dir.join("mono_50k_ME.dat");
        assert_eq!(
            outcome,
            RunOutcome::PartiallyCoherent {
                output_file: expected.clone()
            }
        );
        assert_eq!(
            engine.calls(),
            &[EngineCall::MultiElectron {
                n_macro_elec: 50_000,
                output_file: expected
            }]
        );
        assert!(results_dir.is_dir());
        assert!(out.is_empty());
    }
    #[test]
    fn results_dir_not_creatable() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        assert_matches!(
            prepare_output_file(&blocker.join("results"), Branch::Mono, 2000),
            Err(HermesError::Other(_))
        );
    }
    #[test]
    fn non_primary_coherent_run_is_silent() {
        let dir = TempDir::new().unwrap();
        let simulation = Simulation::from_config(&config(1, dir.path())).unwrap();
        let mut engine = DryRunEngine::new(false);
        let mut out = Vec::new();
        simulation.run(&mut engine, &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(engine.calls().len(), 2);
    }
}
