use std::{fs::File, io, io::BufWriter, path::PathBuf, time::Duration};

use clap::Parser;
use color_eyre::eyre::WrapErr;
use common::parse::parse_vector;
use coordinator::{playback, render, CsvSink, PlaybackConfig, TableSink};
use normal_modes::{ModalDecomposer, SpringChain, TrajectoryEvaluator};
use tracing_subscriber::EnvFilter;

/// Simulates masses on a line, joined by springs to each other and to two walls, by normal-mode
/// decomposition.
#[derive(Debug, Parser)]
#[command(name = "springs", version)]
struct Args {
    /// The masses, left to right.
    #[arg(long, default_value = "[0.5, 1.5]")]
    masses: String,

    /// The spring constants, left wall to right wall. One more than there are masses.
    #[arg(long, default_value = "[1, 2, 3]")]
    springs: String,

    /// The displacement of each mass from equilibrium at t = 0.
    #[arg(long, default_value = "[0.1, 0.2]")]
    initial: String,

    /// The velocity of each mass at t = 0. Released from rest if omitted.
    #[arg(long)]
    velocity: Option<String>,

    /// Time between frames.
    #[arg(long, default_value_t = coordinator::DEFAULT_DT)]
    dt: f64,

    /// Number of frames to play.
    #[arg(long, default_value_t = coordinator::DEFAULT_FRAMES, conflicts_with = "forever")]
    frames: usize,

    /// Play until interrupted.
    #[arg(long)]
    forever: bool,

    /// Wall-clock pause between frames, in milliseconds.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Write every frame to this CSV file instead of the terminal.
    #[arg(long, conflicts_with = "forever")]
    csv: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let masses = parse_vector::<f64>(&args.masses).wrap_err("invalid --masses")?;
    let springs = parse_vector::<f64>(&args.springs).wrap_err("invalid --springs")?;
    let initial = parse_vector::<f64>(&args.initial).wrap_err("invalid --initial")?;
    let velocity = args
        .velocity
        .as_deref()
        .map(parse_vector::<f64>)
        .transpose()
        .wrap_err("invalid --velocity")?;

    let chain = SpringChain::build()
        .masses(masses)
        .springs(springs)
        .finalize()
        .wrap_err("invalid spring chain")?;
    let decomposition = ModalDecomposer::new()
        .decompose_system(&chain)
        .wrap_err("failed to decompose spring chain")?;

    for mode in 0..decomposition.len() {
        log::info!(
            "mode {mode}: ω² = {:.6}, period = {}, shape = {:?}",
            decomposition.eigenvalues()[mode],
            decomposition
                .period(mode)
                .map_or_else(|| "∞".to_owned(), |period| format!("{period:.6}")),
            decomposition.mode_shapes()[mode].as_slice(),
        );
    }

    let trajectory = match &velocity {
        Some(velocity) => TrajectoryEvaluator::with_velocity(&decomposition, &initial, velocity),
        None => TrajectoryEvaluator::new(&decomposition, &initial),
    }
    .wrap_err("invalid initial conditions")?;

    let mut config = PlaybackConfig::build()
        .dt(args.dt)
        .frame_delay(Duration::from_millis(args.delay_ms));
    config = if args.forever {
        config.unbounded()
    } else {
        config.frames(args.frames)
    };
    let config = config.finalize();

    let frames = match args.csv {
        Some(path) => {
            let file = File::create(&path)
                .wrap_err_with(|| format!("failed to create {}", path.display()))?;
            let frames = render(&trajectory, &config, &mut CsvSink::new(BufWriter::new(file)))?;
            log::info!("wrote {frames} frames to {}", path.display());
            frames
        }
        None => playback(&trajectory, &config, &mut TableSink::new(io::stdout().lock()))?,
    };
    log::debug!("done after {frames} frames");

    Ok(())
}
