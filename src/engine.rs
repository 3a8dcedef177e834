// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::binary::BinaryView;
use thiserror::Error;

/// Status reported by a decision engine call which did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({code})")]
pub struct EngineError {
    pub code: i32,
    pub message: String,
}

impl EngineError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Arguments of the engine's native initializer.
///
/// The binary views borrow the resources loaded by the session, which keeps
/// them alive for as long as the engine handle exists.
#[derive(Debug, Clone, Copy)]
pub struct EngineInit<'a> {
    /// Sensor calibration blob (AIQB), possibly empty.
    pub calibration: BinaryView<'a>,
    /// Module non-volatile memory data, possibly empty.
    pub nvm: BinaryView<'a>,
    /// Adaptive data saved from a previous run (AIQD), possibly empty.
    pub adaptive: BinaryView<'a>,
    pub stats_max_width: u32,
    pub stats_max_height: u32,
    /// Upper bound on statistics buffers handed in per decision step.
    pub max_stats_in: u32,
}

/// The closed 3A decision engine.
///
/// Implementations wrap the vendor library, the session guarantees the
/// following calling discipline:
///
/// - [`init`](DecisionEngine::init) is only called while no handle is live
/// - [`statistics_set`](DecisionEngine::statistics_set) and
///   [`run`](DecisionEngine::run) only receive a live handle
/// - every handle returned by `init` is passed to
///   [`deinit`](DecisionEngine::deinit) exactly once
/// - calls are never concurrent
pub trait DecisionEngine {
    /// Opaque instance handle, released by moving it into `deinit`.
    type Handle;

    /// Engine-native statistics input.
    type Statistics;

    /// Engine-native outcome of one decision step. The default value is the
    /// engine's initial decision.
    type Config: Default;

    /// Creates an engine instance, `None` if the engine refused.
    fn init(&mut self, init: &EngineInit<'_>) -> Option<Self::Handle>;

    fn statistics_set(
        &mut self,
        handle: &mut Self::Handle,
        stats: &Self::Statistics,
    ) -> Result<(), EngineError>;

    /// Runs the decision step for `frame`, writing its outcome to `config`.
    fn run(&mut self, handle: &mut Self::Handle, frame: u32, config: &mut Self::Config);

    fn deinit(&mut self, handle: Self::Handle);
}
