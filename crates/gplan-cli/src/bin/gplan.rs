use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gplan_cli::{load_problem, parse_waypoint, save_problem, Config, DEFAULT_LOG_DIRECTIVES};
use gplan_core::{Scenario, WaypointPath};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a JSON scenario into a binary problem record
    Encode {
        scenario: PathBuf,
        output: PathBuf,
    },
    /// Print a binary problem record as a JSON scenario
    Dump { problem: PathBuf },
    /// Score a waypoint path against a problem (.json scenario or binary record)
    Evaluate {
        problem: PathBuf,

        /// Waypoint as LAT,LON or LAT,LON,ALT (repeatable, in flight order)
        #[arg(long = "waypoint", short = 'w')]
        waypoints: Vec<String>,

        /// Sample spacing along each leg in meters
        #[arg(long)]
        spacing: Option<f64>,

        /// Altitude for waypoints given without one
        #[arg(long)]
        altitude: Option<f64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in DEFAULT_LOG_DIRECTIVES {
        let directive: tracing_subscriber::filter::Directive = directive.parse()?;
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let args = Args::parse();
    let mut config = Config::from_env();

    match args.command {
        Command::Encode { scenario, output } => {
            let text = fs::read_to_string(&scenario)
                .with_context(|| format!("reading scenario {}", scenario.display()))?;
            let problem = Scenario::from_json(&text)?.to_problem()?;
            let written = save_problem(&problem, &output)?;
            tracing::info!(
                "Encoded {} areas / {} tasks into {} ({} bytes)",
                problem.area_count(),
                problem.task_count(),
                output.display(),
                written
            );
        }
        Command::Dump { problem } => {
            let problem = load_problem(&problem)?;
            println!("{}", Scenario::from_problem(&problem).to_json_pretty()?);
        }
        Command::Evaluate {
            problem,
            waypoints,
            spacing,
            altitude,
            json,
        } => {
            if let Some(spacing) = spacing {
                config.sample_spacing_m = spacing;
            }
            if let Some(altitude) = altitude {
                config.altitude_m = altitude;
            }

            let problem = load_problem(&problem)?;
            if !problem.is_ready() {
                tracing::warn!("Problem has no start position; fitness is always 0");
            }

            let evaluation = config.evaluation();
            let waypoints = waypoints
                .iter()
                .map(|w| parse_waypoint(w, &evaluation))
                .collect::<Result<Vec<_>>>()?;
            let path = WaypointPath::new(waypoints, &evaluation);
            let report = problem.evaluate(&path);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Samples: {} ({:.1} m)",
                    report.trajectory_len, report.path_length_m
                );
                for score in &report.task_scores {
                    println!(
                        "  {} task {} ({}): {:.3}",
                        score.area, score.index, score.task_type, score.score
                    );
                }
                println!("Task total: {:.3}", report.task_total);
                println!(
                    "Shortness bonus: {:.3} ({})",
                    report.shortness_bonus,
                    if report.bonus_applied { "applied" } else { "withheld" }
                );
                println!("Fitness: {:.3}", report.total);
            }
        }
    }

    Ok(())
}
