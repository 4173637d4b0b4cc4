//! Handling the HERMES CLI
//!
//! This module handles the command line parsing as well as basic information (e.g. help dialog, version information, etc.).
use crate::{
    config::SimulationConfig,
    error::{HermesError, HermesResult},
    get_version,
    reporting::PlotFormat,
};
use clap::{builder::Str, Parser, Subcommand};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

/// Command line arguments for the HERMES application.
#[derive(Debug)]
pub struct Args {
    /// the selected action
    pub command: Command,
}

/// Fully evaluated action of the HERMES application.
#[derive(Debug)]
pub enum Command {
    /// run a simulation with the given (effective) configuration
    Run(SimulationConfig),
    /// print the effective configuration as YAML
    ShowConfig(SimulationConfig),
    /// convert a ray table into a CSV file
    ExportBeam {
        /// whitespace separated ray table
        table: PathBuf,
        /// destination CSV file
        output: PathBuf,
    },
}

/// Raw command line as parsed by clap, before validation.
#[derive(Parser, Debug)]
#[command(author, version = Str::from(&get_version()), about, long_about = None)]
pub struct PartialArgs {
    #[command(subcommand)]
    command: Option<PartialCommand>,
}

#[derive(Subcommand, Debug)]
enum PartialCommand {
    /// simulate the beamline (coherent or partially coherent)
    Run {
        #[command(flatten)]
        config: ConfigArgs,
        /// number of macro electrons. 1 runs a single coherent electron
        #[arg(short, long)]
        n_macro_elec: Option<i64>,
        /// directory of the intensity and phase plots. no plots are created if not given
        #[arg(short, long)]
        plot_dir: Option<String>,
        /// file format of the plots (png or svg)
        #[arg(short = 'f', long)]
        plot_format: Option<String>,
        /// directory of the multi-electron results
        #[arg(short, long)]
        results_dir: Option<String>,
    },
    /// print the effective configuration
    ShowConfig {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// export columns of a ray table into a CSV file
    ExportBeam {
        /// whitespace separated ray table (one ray per line)
        table: String,
        /// destination CSV file
        output: String,
    },
}

#[derive(clap::Args, Debug)]
struct ConfigArgs {
    /// YAML configuration file. the HERMES defaults are used if not given
    #[arg(short, long)]
    config: Option<String>,
}

/// Checks if the passed file path points to an existing YAML file.
fn file_path_is_valid(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

fn eval_plot_format_input(format_input: &str) -> Option<PlotFormat> {
    PlotFormat::iter().find(|f| f.as_ref() == format_input)
}

fn read_config(config_args: &ConfigArgs) -> HermesResult<SimulationConfig> {
    let Some(file_path) = config_args.config.as_deref() else {
        return Ok(SimulationConfig::default());
    };
    let path = Path::new(file_path);
    if !file_path_is_valid(path) {
        return Err(HermesError::Console(format!(
            "invalid configuration file: {file_path}"
        )));
    }
    SimulationConfig::from_file(path)
}

impl TryFrom<PartialArgs> for Args {
    type Error = HermesError;

    fn try_from(part_args: PartialArgs) -> HermesResult<Self> {
        let command = match part_args.command {
            None => Command::Run(SimulationConfig::default()),
            Some(PartialCommand::Run {
                config,
                n_macro_elec,
                plot_dir,
                plot_format,
                results_dir,
            }) => {
                let mut config = read_config(&config)?;
                if let Some(n) = n_macro_elec {
                    if n < 1 {
                        return Err(HermesError::Console(format!(
                            "number of macro electrons must be at least 1, got {n}"
                        )));
                    }
                    config.execution.n_macro_elec = n;
                }
                if let Some(plot_dir) = plot_dir {
                    config.output.plot_dir = Some(PathBuf::from(plot_dir));
                }
                if let Some(plot_format) = plot_format {
                    config.output.plot_format = eval_plot_format_input(&plot_format)
                        .ok_or_else(|| {
                            HermesError::Console(format!("invalid plot format: {plot_format}"))
                        })?;
                }
                if let Some(results_dir) = results_dir {
                    config.output.results_dir = PathBuf::from(results_dir);
                }
                Command::Run(config)
            }
            Some(PartialCommand::ShowConfig { config }) => {
                Command::ShowConfig(read_config(&config)?)
            }
            Some(PartialCommand::ExportBeam { table, output }) => {
                let table = PathBuf::from(table);
                if !table.is_file() {
                    return Err(HermesError::Console(format!(
                        "ray table not found: {}",
                        table.display()
                    )));
                }
                Command::ExportBeam {
                    table,
                    output: PathBuf::from(output),
                }
            }
        };
        Ok(Self { command })
    }
}

/// Creates the HERMES intro text.
#[must_use]
pub fn create_intro() -> String {
    format!(
        "{: ^80}\n{: ^80}\n",
        "HERMES - wavefront propagation for the HERMES soft X-ray beamline",
        format!("version {}", get_version())
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::TempDir;

    fn args(cmd: &[&str]) -> HermesResult<Args> {
        let partial = PartialArgs::try_parse_from(cmd).unwrap();
        Args::try_from(partial)
    }
    #[test]
    fn no_subcommand() {
        let args = args(&["hermes"]).unwrap();
        assert_matches!(
            args.command,
            Command::Run(c) if c == SimulationConfig::default()
        );
    }
    #[test]
    fn run_overrides() {
        let args = args(&[
            "hermes", "run", "-n", "50000", "-p", "plots", "-f", "svg", "-r", "out",
        ])
        .unwrap();
        let Command::Run(config) = args.command else {
            panic!("wrong command");
        };
        assert_eq!(config.execution.n_macro_elec, 50_000);
        assert_eq!(config.output.plot_dir, Some(PathBuf::from("plots")));
        assert_eq!(config.output.plot_format, PlotFormat::Svg);
        assert_eq!(config.output.results_dir, PathBuf::from("out"));
    }
    #[test]
    fn run_invalid() {
        assert_matches!(
            args(&["hermes", "run", "-n", "0"]),
            Err(HermesError::Console(_))
        );
        assert_matches!(
            args(&["hermes", "run", "-f", "jpg"]),
            Err(HermesError::Console(_))
        );
        assert_matches!(
            args(&["hermes", "run", "-c", "./invalid_file.yaml"]),
            Err(HermesError::Console(_))
        );
    }
    #[test]
    fn config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("setup.yaml");
        fs::write(&path, "execution:\n  n_macro_elec: 1000\n").unwrap();
        let parsed = args(&["hermes", "show-config", "-c", path.to_str().unwrap()]).unwrap();
        let Command::ShowConfig(config) = parsed.command else {
            panic!("wrong command");
        };
        assert_eq!(config.execution.n_macro_elec, 1000);
        let wrong_ext = dir.path().join("setup.txt");
        fs::write(&wrong_ext, "").unwrap();
        assert_matches!(
            args(&["hermes", "run", "-c", wrong_ext.to_str().unwrap()]),
            Err(HermesError::Console(_))
        );
    }
    #[test]
    fn export_beam() {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("rays.dat");
        fs::write(&table, "").unwrap();
        let parsed = args(&["hermes", "export-beam", table.to_str().unwrap(), "beam.csv"]).unwrap();
        assert_matches!(
            parsed.command,
            Command::ExportBeam { output, .. } if output == PathBuf::from("beam.csv")
        );
        assert_matches!(
            args(&["hermes", "export-beam", "missing.dat", "beam.csv"]),
            Err(HermesError::Console(_))
        );
    }
    #[test]
    fn plot_format_input() {
        assert_eq!(eval_plot_format_input("png"), Some(PlotFormat::Png));
        assert_eq!(eval_plot_format_input("svg"), Some(PlotFormat::Svg));
        assert_eq!(eval_plot_format_input("pdf"), None);
    }
    #[test]
    fn intro() {
        assert!(create_intro().contains(&get_version()));
    }
}
