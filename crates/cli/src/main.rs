//! Slicing floorplanner CLI

use anyhow::{anyhow, Context};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use u_floorplan_cli::{save_json, save_plot_file, write_modules_table, ModuleFileParser};
use u_floorplan_core::{AttemptReport, SaConfig, SaRunner};

const USAGE_HINT: &str =
    "Provide input module file as input with format: <module_name> <area> <aspect_ratio>";

#[derive(Parser)]
#[command(name = "sa-floorplan")]
#[command(about = "Slicing floorplanner using Simulated Annealing")]
#[command(version)]
struct Cli {
    /// Module file with lines `<module_name> <area> <aspect_ratio>`
    input: Option<PathBuf>,

    /// Annealing configuration (JSON); flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Starting temperature
    #[arg(long)]
    max_temp: Option<f64>,

    /// Temperature floor
    #[arg(long)]
    min_temp: Option<f64>,

    /// Geometric cooling factor
    #[arg(long)]
    cooling_rate: Option<f64>,

    /// Moves per attempt, per module
    #[arg(short = 'k', long)]
    run_multiplier: Option<usize>,

    /// Wall-clock limit in seconds (0 = unlimited)
    #[arg(short, long)]
    time_limit: Option<u64>,

    /// Output file for plot data
    #[arg(long, default_value = "plot_data.txt")]
    plot_file: PathBuf,

    /// Output file for the result summary (JSON)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn sa_config(&self, parser: &ModuleFileParser) -> anyhow::Result<SaConfig> {
        let mut config = match &self.config {
            Some(path) => parser
                .load_config(path)
                .with_context(|| format!("Unable to load config {}", path.display()))?,
            None => SaConfig::default(),
        };

        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(temp) = self.max_temp {
            config = config.with_max_temperature(temp);
        }
        if let Some(temp) = self.min_temp {
            config = config.with_min_temperature(temp);
        }
        if let Some(rate) = self.cooling_rate {
            config = config.with_cooling_rate(rate);
        }
        if let Some(multiplier) = self.run_multiplier {
            config = config.with_run_multiplier(multiplier);
        }
        match self.time_limit {
            Some(0) => config = config.without_time_limit(),
            Some(secs) => config = config.with_time_limit(Duration::from_secs(secs)),
            None => {}
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let input = cli.input.as_ref().ok_or_else(|| anyhow!(USAGE_HINT))?;

    let parser = ModuleFileParser::new();
    let catalog = parser
        .parse_file(input)
        .with_context(|| format!("Unable to load module file {}", input.display()))?;
    let config = cli.sa_config(&parser)?;

    let runner = SaRunner::new(config, catalog)?;
    println!("Initial random solution area: {}", runner.initial_cost()?);

    let result = runner.run_with_progress(Box::new(|report: &AttemptReport| {
        println!("Attempt #{}: Cost Value = {}", report.attempt, report.best_cost);
    }))?;

    let placements = result.placements();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out)?;
    write_modules_table(&mut out, &placements)?;
    writeln!(out)?;
    writeln!(out, "Best polish expression found:")?;
    writeln!(out, "{}", result.best_expression.display(&result.catalog))?;
    writeln!(out)?;
    writeln!(out, "Best area: {}", result.best_cost)?;
    writeln!(out, "Utilization: {:.1}%", result.utilization() * 100.0)?;

    save_plot_file(&cli.plot_file, &placements)
        .with_context(|| format!("Unable to write plot file {}", cli.plot_file.display()))?;
    writeln!(
        out,
        "Generated plot data file {} to use with the floorplan plotter",
        cli.plot_file.display()
    )?;

    if let Some(path) = &cli.json {
        save_json(path, &result.summary())
            .with_context(|| format!("Unable to write {}", path.display()))?;
        writeln!(out, "Results saved to: {}", path.display())?;
    }

    Ok(())
}
