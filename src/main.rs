use clap::Parser;
use hermes::{
    beam_export::{save_beam_data_to_csv, TextRayTable},
    config::SimulationConfig,
    console::{create_intro, Args, Command, PartialArgs},
    driver::{RunOutcome, Simulation},
    engine::DryRunEngine,
    error::{HermesError, HermesResult},
};
use std::io::{self, Write};
use std::path::Path;

fn run_simulation(config: &SimulationConfig) -> HermesResult<()> {
    let simulation = Simulation::from_config(config)?;
    let mut engine = DryRunEngine::default();
    let mut stdout = io::stdout().lock();
    let written = match simulation.run(&mut engine, &mut stdout)? {
        RunOutcome::Coherent { .. } => {
            writeln!(stdout, "\nCoherent propagation finished")
        }
        RunOutcome::PartiallyCoherent { output_file } => writeln!(
            stdout,
            "\nPartially coherent propagation written to {}",
            output_file.display()
        ),
    };
    written.map_err(|e| HermesError::Console(format!("cannot write to console: {e}")))
}

fn show_config(config: &SimulationConfig) -> HermesResult<()> {
    print!("{}", config.to_yaml()?);
    Ok(())
}

fn export_beam(table: &Path, output: &Path) -> HermesResult<()> {
    print!("\nReading ray table...");
    let _ = io::stdout().flush();
    let table = TextRayTable::from_file(table)?;
    println!("Success");
    print!("Write beam data to {}...", output.display());
    let _ = io::stdout().flush();
    save_beam_data_to_csv(&table, output)?;
    println!("Success");
    Ok(())
}

fn main() -> HermesResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    //parse CLI arguments
    let hermes_args = Args::try_from(PartialArgs::parse())?;
    match hermes_args.command {
        Command::Run(config) => {
            println!("{}", create_intro());
            run_simulation(&config)
        }
        Command::ShowConfig(config) => show_config(&config),
        Command::ExportBeam { table, output } => export_beam(&table, &output),
    }
}
