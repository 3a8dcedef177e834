// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use args::Args;
use clap::Parser;
use ipu3_aiq::{
    driver::{Cadence, ControlLoop, FrameReport},
    encoder::Passthrough,
    ia::{AicConfig, IaAiq, Ipu3StatsConverter},
    session::{Session, SessionConfig},
};
use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

mod args;

fn init_logging(verbose: bool) -> Result<(), Box<dyn Error>> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let stdout_log = tracing_subscriber::fmt::layer().with_filter(env_filter);

    let journald = match tracing_journald::layer() {
        Ok(layer) => Some(layer.with_filter(level)),
        Err(_) => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(stdout_log)
        .with(journald);
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    Ok(())
}

fn stats_files(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut files = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}

fn log_report(report: &FrameReport, elapsed: std::time::Duration) {
    if report.statistics.is_ok() && report.parameters.is_ok() {
        info!(
            frame = report.frame,
            target = report.target,
            "frame processed in {:?}",
            elapsed
        );
    } else {
        warn!(
            frame = report.frame,
            target = report.target,
            statistics = %report.statistics,
            parameters = %report.parameters,
            "frame processed with failures"
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("IPU3 3A Control Loop");

    let config = SessionConfig::try_from(&args)?;
    let cadence = Cadence::from(args.cadence);

    let engine = IaAiq::load(&args.library)?;
    let session = Session::new(&args.camera_name, engine, Ipu3StatsConverter, Passthrough);

    let aiq = ControlLoop::start(session, &config, cadence)?;

    let mut params = AicConfig::default();
    match &args.stats_dir {
        Some(dir) => {
            for (frame, path) in stats_files(dir)?.iter().enumerate() {
                let stats = match fs::read(path) {
                    Ok(stats) => stats,
                    Err(e) => {
                        warn!("Skipping {}: {e}", path.display());
                        continue;
                    }
                };
                let now = Instant::now();
                let report = aiq.process_frame(frame as u32, &stats, &mut params);
                log_report(&report, now.elapsed());
            }
        }
        None => {
            let stats: Vec<u8> = Vec::new();
            for frame in 0..args.frames {
                let now = Instant::now();
                let report = aiq.process_frame(frame, &stats, &mut params);
                log_report(&report, now.elapsed());
            }
        }
    }

    if !aiq.has_statistics() {
        warn!("No statistics accepted, parameters carry the initial decision only");
    }

    let counters = aiq.stop();
    info!(
        frames = counters.frames_processed,
        accepted = counters.statistics_accepted,
        dropped = counters.statistics_dropped,
        undelivered = counters.statistics_failures,
        stale = counters.stale_frames,
        produced = counters.parameters_produced,
        failed = counters.parameter_failures,
        "control loop stopped"
    );

    Ok(())
}
