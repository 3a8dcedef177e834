// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::{error::ErrorKind, Parser};
use ipu3_aiq::{
    driver::Cadence,
    session::{SessionConfig, CALIBRATION_DIR, DEFAULT_SENSOR},
};
use std::path::{Path, PathBuf};

/// Frame cadence between statistics and parameters.
///
/// Selects which frame the parameters computed from a frame's statistics
/// are applied to, which depends on the latency of the capture pipeline.
#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Copy)]
pub enum CadenceSetting {
    /// Parameters apply to the frame the statistics came from
    Same,
    /// Parameters apply to the following frame
    Next,
}

impl From<CadenceSetting> for Cadence {
    fn from(setting: CadenceSetting) -> Self {
        match setting {
            CadenceSetting::Same => Cadence::SameFrame,
            CadenceSetting::Next => Cadence::NextFrame,
        }
    }
}

/// Command-line arguments for the IPU3 3A bring-up tool.
///
/// Loads the IA AIQ library, initializes a session from the deployment's
/// calibration data and drives the control loop over recorded statistics.
/// Arguments can be specified via command line or environment variables.
///
/// # Example
///
/// ```bash
/// # Via command line
/// ipu3-aiq --sensor 00imx258 --stats-dir /data/stats --cadence next
///
/// # Via environment variables
/// export SENSOR=00imx258
/// export FRAMES=120
/// ipu3-aiq
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// IA AIQ shared library to load
    #[arg(long, env = "IA_AIQ_LIBRARY", default_value = "libia_aiq.so")]
    pub library: PathBuf,

    /// Camera name used to tag log output
    #[arg(long, env = "CAMERA_NAME", default_value = "ipu3")]
    pub camera_name: String,

    /// Sensor identifier selecting the calibration blob
    #[arg(long, env = "SENSOR", default_value = DEFAULT_SENSOR)]
    pub sensor: String,

    /// Calibration blob (AIQB), overrides the sensor's default path
    #[arg(long, env = "CALIBRATION")]
    pub calibration: Option<PathBuf>,

    /// Module NVM data
    #[arg(long, env = "NVM")]
    pub nvm: Option<PathBuf>,

    /// Adaptive data (AIQD) from a previous run
    #[arg(long, env = "AIQD")]
    pub aiqd: Option<PathBuf>,

    /// Maximum statistics grid resolution (width height)
    #[arg(
        long,
        env = "STATS_SIZE",
        default_value = "1920 1080",
        value_delimiter = ' ',
        num_args = 2
    )]
    pub stats_size: Vec<u32>,

    /// Maximum statistics buffers per decision step
    #[arg(long, env = "MAX_STATS", default_value = "4")]
    pub max_stats: u32,

    /// Cadence between statistics and parameters
    #[arg(long, env = "CADENCE", default_value = "next", value_enum)]
    pub cadence: CadenceSetting,

    /// Directory of recorded statistics payloads, one file per frame in name
    /// order
    #[arg(long, env = "STATS_DIR")]
    pub stats_dir: Option<PathBuf>,

    /// Frames to run with empty statistics when no statistics directory is
    /// given
    #[arg(long, env = "FRAMES", default_value = "30")]
    pub frames: u32,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl TryFrom<&Args> for SessionConfig {
    type Error = clap::Error;

    /// Builds the session configuration, rejecting a statistics size which
    /// is not exactly a width and a height. clap cannot enforce this on the
    /// `STATS_SIZE` environment value.
    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        let [stats_max_width, stats_max_height] = args.stats_size[..] else {
            return Err(clap::Error::raw(
                ErrorKind::WrongNumberOfValues,
                format!(
                    "--stats-size expects a width and a height, got {:?}\n",
                    args.stats_size
                ),
            ));
        };

        let calibration = args.calibration.clone().unwrap_or_else(|| {
            Path::new(CALIBRATION_DIR).join(format!("{}.aiqb", args.sensor))
        });

        Ok(SessionConfig {
            calibration,
            nvm: args.nvm.clone(),
            adaptive: args.aiqd.clone(),
            stats_max_width,
            stats_max_height,
            max_stats_in: args.max_stats,
        })
    }
}
