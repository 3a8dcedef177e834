// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! # IPU3 3A Control Loop Library
//!
//! This library binds the Intel IPU3 image pipeline to the closed 3A
//! (auto-exposure, auto-white-balance, auto-focus) decision engine. It loads
//! the sensor calibration blobs the engine is initialized from, owns the
//! engine instance for the lifetime of a camera pipeline, feeds it per-frame
//! statistics and turns its decisions into ISP parameter buffers.
//!
//! ## Features
//!
//! - **Binary Resources**: Load calibration, NVM and adaptive data blobs into
//!   owned buffers whose size is guaranteed to match the file.
//! - **Session Lifecycle**: Initialize, feed and tear down an engine instance
//!   with the handle released exactly once on every path.
//! - **Control Loop**: Sequence statistics ingestion and parameter production
//!   per frame, serialized across threads, without stopping the pipeline on a
//!   single bad frame.
//! - **IA AIQ Backend**: Drive the Intel IA AIQ library, loaded at runtime.
//!
//! ## Example
//!
//! ```no_run
//! use ipu3_aiq::{
//!     driver::{Cadence, ControlLoop},
//!     encoder::Passthrough,
//!     ia::{AicConfig, IaAiq, Ipu3StatsConverter},
//!     session::{Session, SessionConfig},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = IaAiq::load_default()?;
//! let session = Session::new("ipu3", engine, Ipu3StatsConverter, Passthrough);
//! let config = SessionConfig::for_sensor("00imx258");
//! let aiq = ControlLoop::start(session, &config, Cadence::NextFrame)?;
//!
//! let mut params = AicConfig::default();
//! aiq.queue_statistics(0, &[0u8; 64]);
//! aiq.fill_parameters(1, &mut params);
//! # Ok(())
//! # }
//! ```
//!
//! ## Safety
//!
//! The IA AIQ backend calls into a vendor C library through `ia-aiq-sys`.
//! All unsafe operations are isolated to the [`ia`] module and wrapped with
//! safe APIs.

pub mod binary;
pub mod driver;
pub mod encoder;
pub mod engine;
pub mod ia;
pub mod session;
