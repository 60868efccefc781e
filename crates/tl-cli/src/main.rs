//! Command-line host for the transmission-loss solver.
//!
//! Loads a saved session, runs the sweep and writes a comma-separated table.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tl_core::{Environment, LayerStack, Session, SimulationResult, StackModel};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tl-sim")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Transmission loss of layered acoustic treatments", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep a session and write frequency, TL and absorption
    Run {
        /// Session JSON file
        session: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the incidence angle in degrees
        #[arg(long)]
        angle: Option<f64>,
    },
    /// Validate a session without sweeping
    Check {
        /// Session JSON file
        session: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            session,
            output,
            angle,
        } => run(&session, output.as_deref(), angle),
        Commands::Check { session } => check(&session),
    }
}

fn load(path: &Path, angle: Option<f64>) -> Result<(LayerStack, Environment)> {
    let session = Session::load(path)
        .with_context(|| format!("failed to read session {}", path.display()))?;
    let (stack, mut environment) = session.to_inputs()?;
    if let Some(angle) = angle {
        environment.incidence_deg = angle;
    }
    Ok((stack, environment))
}

fn run(path: &Path, output: Option<&Path>, angle: Option<f64>) -> Result<()> {
    let (stack, environment) = load(path, angle)?;
    let result = tl_core::compute(&stack, &environment)?;

    match output {
        Some(out) => {
            let file = File::create(out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            write_table(BufWriter::new(file), path, &environment, &result)?;
            info!(path = %out.display(), bins = result.len(), "results written");
        }
        None => write_table(io::stdout().lock(), path, &environment, &result)?,
    }
    Ok(())
}

fn check(path: &Path) -> Result<()> {
    let (stack, environment) = load(path, None)?;
    let model = StackModel::new(&stack, &environment)?;
    println!(
        "{}: {} layers in {} bonded segments, incidence {}°",
        path.display(),
        stack.len(),
        model.segments().len(),
        environment.incidence_deg
    );
    Ok(())
}

/// Metadata rows prefixed with `#`, then one row per frequency bin.
fn write_table<W: Write>(
    mut w: W,
    source: &Path,
    environment: &Environment,
    result: &SimulationResult,
) -> Result<()> {
    let legend = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    writeln!(w, "# legend,{legend}")?;
    writeln!(w, "# source,{}", source.display())?;
    writeln!(w, "# date,{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(w, "# angle_deg,{}", environment.incidence_deg)?;
    writeln!(w, "frequency_hz,transmission_loss_db,absorption_coefficient")?;
    for i in 0..result.len() {
        writeln!(
            w,
            "{:.6},{:.6},{:.6}",
            result.frequency_hz[i], result.transmission_loss_db[i], result.absorption_coefficient[i]
        )?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_layout() {
        let result = SimulationResult {
            frequency_hz: vec![100.0, 200.0],
            transmission_loss_db: vec![12.5, f64::INFINITY],
            absorption_coefficient: vec![0.25, 0.0],
            complex_transmission: vec![Default::default(); 2],
            reflection: vec![Default::default(); 2],
        };
        let mut buf = Vec::new();
        let source = Path::new("stacks/panel.json");
        write_table(&mut buf, source, &Environment::default(), &result).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "# legend,panel");
        assert_eq!(lines[1], "# source,stacks/panel.json");
        assert!(lines[2].starts_with("# date,"));
        assert_eq!(lines[3], "# angle_deg,0");
        assert_eq!(lines[4], "frequency_hz,transmission_loss_db,absorption_coefficient");
        assert_eq!(lines[5], "100.000000,12.500000,0.250000");
        assert_eq!(lines[6], "200.000000,inf,0.000000");
        assert_eq!(lines.len(), 7);
    }
}
