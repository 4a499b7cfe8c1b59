//! `gazeflow` command line: replays recorded or simulated gaze through the
//! engine and writes the session CSV logs.

pub mod driver;
pub mod replay;
pub mod scene;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gazeflow_config::AppConfig;
use gazeflow_core::log::stamped_file_name;
use gazeflow_core::script::{load_script, ScriptTick};
use gazeflow_core::{
    CursorLogger, FixationLogger, GazeInputs, MosaicSession, Point3D, ScanSimulator, StarTest,
};

use driver::{drive, Pacing, RunReport};
use replay::{CursorReplay, FixationReplay, MosaicReplay, Replay, StarReplay};

#[derive(Parser, Debug)]
#[command(
    name = "gazeflow",
    version,
    about = "Gaze dwell and reaction-time sessions with CSV logs"
)]
pub struct Cli {
    /// Config file (default: $GAZEFLOW_CONFIG, ./gazeflow.toml, platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for CSV logs
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// Pace ticks in wall-clock time instead of running flat out
    #[arg(long, global = true)]
    pub realtime: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dwell-activated tile session
    Mosaic {
        /// JSON Lines gaze recording
        #[arg(long)]
        script: PathBuf,
    },
    /// Star reaction-time test
    Stars {
        #[arg(long)]
        script: PathBuf,
    },
    /// Eye-controlled cursor sample log
    Cursor {
        #[arg(long)]
        script: PathBuf,
    },
    /// Head fixation on one point
    Fixation {
        #[arg(long)]
        script: PathBuf,
        /// Watched point as x,y,z
        #[arg(long, value_parser = parse_point)]
        target: Point3D,
    },
    /// Run a session on a simulated scan of its targets
    Simulate {
        #[arg(value_enum)]
        mode: SimulateMode,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulateMode {
    Mosaic,
    Stars,
}

pub fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "gazeflow=info,gazeflow_core=info,gazeflow_config=info",
        1 => "gazeflow=debug,gazeflow_core=debug,gazeflow_config=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .init();
}

/// Parse `x,y,z`
pub fn parse_point(s: &str) -> Result<Point3D, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected x,y,z but got '{}'", s));
    }
    let mut coords = [0.0f32; 3];
    for (slot, part) in coords.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("invalid coordinate '{}' in '{}'", part, s))?;
    }
    Ok(Point3D::new(coords[0], coords[1], coords[2]))
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::load(),
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let out_dir = cli.out.clone().unwrap_or_else(|| config.output_dir());

    let report = match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            return Ok(());
        }
        Command::Mosaic { script } => {
            let ticks = read_ticks(&script)?;
            let mut replay = mosaic_replay(&config);
            let pacing = script_pacing(cli.realtime);
            drive(&mut replay, ticks, pacing, &out_dir).await?
        }
        Command::Stars { script } => {
            let ticks = read_ticks(&script)?;
            let mut replay = star_replay(&config);
            drive(&mut replay, ticks, script_pacing(cli.realtime), &out_dir).await?
        }
        Command::Cursor { script } => {
            let ticks = read_ticks(&script)?;
            let mut replay = CursorReplay {
                logger: CursorLogger::new((&config).into()),
                file_name: config.output.cursor_file.clone(),
            };
            drive(&mut replay, ticks, script_pacing(cli.realtime), &out_dir).await?
        }
        Command::Fixation { script, target } => {
            let ticks = read_ticks(&script)?;
            let mut replay = FixationReplay {
                logger: FixationLogger::new(target, (&config).into()),
                file_name: config.output.fixation_file.clone(),
            };
            drive(&mut replay, ticks, script_pacing(cli.realtime), &out_dir).await?
        }
        Command::Simulate { mode } => simulate(&config, mode, cli.realtime, &out_dir).await?,
    };

    print_report(&report);
    Ok(())
}

fn read_ticks(path: &Path) -> Result<Vec<(f64, GazeInputs)>> {
    let script = load_script(path)
        .with_context(|| format!("Failed to load gaze script {}", path.display()))?;
    info!("Loaded {} ticks from {}", script.len(), path.display());
    Ok(script
        .into_iter()
        .map(|ScriptTick { t, inputs }| (t, inputs))
        .collect())
}

fn script_pacing(realtime: bool) -> Pacing {
    if realtime {
        Pacing::Timestamps
    } else {
        Pacing::Off
    }
}

fn mosaic_replay(config: &AppConfig) -> MosaicReplay {
    let targets = scene::mosaic_targets(config);
    MosaicReplay {
        session: MosaicSession::new(targets, config.into(), 0.0),
        file_name: stamped_file_name(&config.output.mosaic_prefix, Local::now().naive_local()),
    }
}

fn star_replay(config: &AppConfig) -> StarReplay {
    StarReplay {
        test: StarTest::new(scene::star_targets(config), config.into()),
        file_name: config.output.stars_file.clone(),
    }
}

async fn simulate(
    config: &AppConfig,
    mode: SimulateMode,
    realtime: bool,
    out_dir: &Path,
) -> Result<RunReport> {
    let mut replay: Box<dyn Replay> = match mode {
        SimulateMode::Mosaic => Box::new(mosaic_replay(config)),
        SimulateMode::Stars => Box::new(star_replay(config)),
    };
    let targets = match mode {
        SimulateMode::Mosaic => scene::mosaic_targets(config),
        SimulateMode::Stars => scene::star_targets(config),
    };
    let points: Vec<Point3D> = targets.iter().map(|t| t.bounds.center()).collect();

    let sim = ScanSimulator::new(points, config.simulation.fixation)
        .with_gap(config.simulation.gap)
        .with_tick_rate(config.simulation.tick_rate);
    let pacing = if realtime {
        Pacing::Fixed(Duration::from_secs_f64(1.0 / sim.tick_rate()))
    } else {
        Pacing::Off
    };

    let ticks: Vec<(f64, GazeInputs)> = sim.ticks().collect();
    drive(replay.as_mut(), ticks, pacing, out_dir).await
}

fn print_report(report: &RunReport) {
    if report.interrupted {
        println!("Interrupted at t={:.3}", report.last_time);
    }
    if let Some(summary) = &report.summary {
        println!("{}", summary);
    }
    println!("Log written to {}", report.path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("0, 1.5,-2").unwrap(), Point3D::new(0.0, 1.5, -2.0));
        assert!(parse_point("1,2").is_err());
        assert!(parse_point("1,x,2").is_err());
    }

    #[test]
    fn test_cli_parses_fixation() {
        let cli = Cli::try_parse_from([
            "gazeflow",
            "--out",
            "logs",
            "fixation",
            "--script",
            "gaze.jsonl",
            "--target",
            "0,0,3",
        ])
        .unwrap();
        assert_eq!(cli.out, Some(PathBuf::from("logs")));
        match cli.command {
            Command::Fixation { target, .. } => assert_eq!(target, Point3D::new(0.0, 0.0, 3.0)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_simulate_mode() {
        let cli = Cli::try_parse_from(["gazeflow", "simulate", "stars", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Simulate { mode: SimulateMode::Stars }));
    }

    #[tokio::test]
    async fn test_simulated_mosaic_completes_tiles() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.mosaic.tile_count = 4;

        let report = simulate(&config, SimulateMode::Mosaic, false, temp_dir.path())
            .await
            .unwrap();
        let text = std::fs::read_to_string(&report.path).unwrap();
        assert!(text.starts_with("tileIndex,firstLookTime,dwellDuration\n"));
        assert_eq!(text.lines().count(), 5);
        assert!(report.summary.unwrap().contains("4 / 4"));
    }

    #[tokio::test]
    async fn test_script_replay_writes_cursor_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let script = temp_dir.path().join("gaze.jsonl");
        let pose = r#"{"position":{"x":0.0,"y":0.0,"z":0.0},"forward":{"x":0.0,"y":0.0,"z":1.0}}"#;
        let lines: Vec<String> = [0.0, 0.25, 0.5]
            .iter()
            .map(|t| format!("{{\"t\":{},\"left\":{pose},\"right\":{pose}}}", t, pose = pose))
            .collect();
        std::fs::write(&script, lines.join("\n")).unwrap();

        let out = temp_dir.path().join("out");
        let cli = Cli::try_parse_from([
            "gazeflow",
            "--out",
            out.to_str().unwrap(),
            "cursor",
            "--script",
            script.to_str().unwrap(),
        ])
        .unwrap();
        run(cli).await.unwrap();

        let text = std::fs::read_to_string(out.join("eye_control_log.csv")).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
