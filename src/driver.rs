// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    encoder::{ParameterEncoder, StatisticsConverter},
    engine::DecisionEngine,
    session::{Session, SessionConfig, SessionError, SessionState},
};
use parking_lot::Mutex;
use std::fmt;
use tracing::{debug, error, warn};

/// Which frame the parameters computed after ingesting frame N apply to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cadence {
    /// Parameters are produced for frame N itself.
    SameFrame,
    /// Parameters are produced for frame N + 1.
    #[default]
    NextFrame,
}

impl Cadence {
    pub fn target(self, frame: u32) -> u32 {
        match self {
            Cadence::SameFrame => frame,
            Cadence::NextFrame => frame.wrapping_add(1),
        }
    }
}

/// Outcome of one step of the loop for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Ok,
    /// The engine rejected the statistics, they were dropped.
    StatisticsDropped,
    /// The statistics were older than ones already ingested and were
    /// dropped without reaching the engine.
    Stale,
    /// The session had no live engine instance.
    Failed,
}

impl FrameStatus {
    pub fn is_ok(self) -> bool {
        self == FrameStatus::Ok
    }
}

impl fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            FrameStatus::Ok => "ok",
            FrameStatus::StatisticsDropped => "statistics dropped",
            FrameStatus::Stale => "stale",
            FrameStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of [`ControlLoop::process_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame whose statistics were ingested.
    pub frame: u32,
    /// Frame the parameter buffer was produced for.
    pub target: u32,
    pub statistics: FrameStatus,
    pub parameters: FrameStatus,
}

/// Running totals of the loop's per-frame outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopCounters {
    /// Steps run through [`ControlLoop::process_frame`].
    pub frames_processed: u64,
    pub statistics_accepted: u64,
    /// Statistics the engine rejected.
    pub statistics_dropped: u64,
    /// Statistics which could not be delivered, the session had no live
    /// engine instance.
    pub statistics_failures: u64,
    pub stale_frames: u64,
    pub parameters_produced: u64,
    pub parameter_failures: u64,
}

struct Inner<E, V, P>
where
    E: DecisionEngine,
{
    session: Session<E, V, P>,
    last_stats_frame: Option<u32>,
    counters: LoopCounters,
}

/// Drives one [`Session`] from the capture pipeline's frame callbacks.
///
/// All calls into the session are serialized through a lock held by the
/// loop, so a `ControlLoop` may be shared between the threads delivering
/// statistics and requesting parameters. A failure on one frame is logged
/// and reported, it never stops the loop.
///
/// # Example
///
/// ```no_run
/// use ipu3_aiq::{
///     driver::{Cadence, ControlLoop},
///     encoder::Passthrough,
///     ia::{AicConfig, IaAiq, Ipu3StatsConverter},
///     session::{Session, SessionConfig},
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = IaAiq::load("libia_aiq.so")?;
/// let session = Session::new("ipu3", engine, Ipu3StatsConverter, Passthrough);
/// let aiq = ControlLoop::start(session, &SessionConfig::default(), Cadence::NextFrame)?;
///
/// let stats: Vec<u8> = vec![0; 1024];
/// let mut params = AicConfig::default();
/// let report = aiq.process_frame(0, &stats, &mut params);
/// println!("frame {} -> {}: {}", report.frame, report.target, report.parameters);
/// # Ok(())
/// # }
/// ```
pub struct ControlLoop<E, V, P>
where
    E: DecisionEngine,
{
    inner: Mutex<Inner<E, V, P>>,
    cadence: Cadence,
}

impl<E, V, P> ControlLoop<E, V, P>
where
    E: DecisionEngine,
{
    /// Initializes and configures `session`, then takes ownership of it.
    ///
    /// # Errors
    ///
    /// Fails if the session cannot be initialized, the capture pipeline is
    /// expected to abort startup in that case.
    pub fn start(
        mut session: Session<E, V, P>,
        config: &SessionConfig,
        cadence: Cadence,
    ) -> Result<Self, SessionError> {
        session.initialize(config)?;
        session.configure()?;
        debug!(?cadence, "Control loop started");
        Ok(Self {
            inner: Mutex::new(Inner {
                session,
                last_stats_frame: None,
                counters: LoopCounters::default(),
            }),
            cadence,
        })
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().session.state()
    }

    /// Whether the engine has accepted statistics for at least one frame.
    /// Until then parameter buffers only carry the engine's initial decision.
    pub fn has_statistics(&self) -> bool {
        self.inner.lock().counters.statistics_accepted > 0
    }

    pub fn counters(&self) -> LoopCounters {
        self.inner.lock().counters
    }

    /// Hands the statistics of `frame` to the engine.
    pub fn queue_statistics<S>(&self, frame: u32, stats: &S) -> FrameStatus
    where
        V: StatisticsConverter<S, Native = E::Statistics>,
    {
        let mut inner = self.inner.lock();
        inner.queue_statistics(frame, stats)
    }

    /// Produces the parameter buffer for `frame`.
    pub fn fill_parameters(&self, frame: u32, params: &mut P::Params) -> FrameStatus
    where
        P: ParameterEncoder<E::Config>,
    {
        let mut inner = self.inner.lock();
        inner.fill_parameters(frame, params)
    }

    /// Ingests the statistics of `frame` and produces the parameter buffer
    /// of the frame selected by the loop's [`Cadence`], as one step.
    pub fn process_frame<S>(&self, frame: u32, stats: &S, params: &mut P::Params) -> FrameReport
    where
        V: StatisticsConverter<S, Native = E::Statistics>,
        P: ParameterEncoder<E::Config>,
    {
        let target = self.cadence.target(frame);
        let mut inner = self.inner.lock();
        inner.counters.frames_processed += 1;
        let statistics = inner.queue_statistics(frame, stats);
        let parameters = inner.fill_parameters(target, params);
        FrameReport {
            frame,
            target,
            statistics,
            parameters,
        }
    }

    /// Tears the session down while the loop may still be shared. Frames
    /// delivered afterwards report [`FrameStatus::Failed`].
    pub fn shutdown(&self) {
        self.inner.lock().session.teardown();
    }

    /// Tears the session down and returns the final counters.
    pub fn stop(self) -> LoopCounters {
        let mut inner = self.inner.into_inner();
        inner.session.teardown();
        inner.counters
    }
}

impl<E, V, P> Inner<E, V, P>
where
    E: DecisionEngine,
{
    fn queue_statistics<S>(&mut self, frame: u32, stats: &S) -> FrameStatus
    where
        V: StatisticsConverter<S, Native = E::Statistics>,
    {
        if let Some(last) = self.last_stats_frame {
            if frame < last {
                warn!(frame, last, "Dropping out of order statistics");
                self.counters.stale_frames += 1;
                return FrameStatus::Stale;
            }
        }

        match self.session.set_statistics(frame, stats) {
            Ok(()) => {
                self.last_stats_frame = Some(frame);
                self.counters.statistics_accepted += 1;
                FrameStatus::Ok
            }
            Err(e) if e.is_soft() => {
                self.last_stats_frame = Some(frame);
                self.counters.statistics_dropped += 1;
                FrameStatus::StatisticsDropped
            }
            Err(e) => {
                error!(frame, "{e}");
                self.counters.statistics_failures += 1;
                FrameStatus::Failed
            }
        }
    }

    fn fill_parameters(&mut self, frame: u32, params: &mut P::Params) -> FrameStatus
    where
        P: ParameterEncoder<E::Config>,
    {
        match self.session.run(frame, params) {
            Ok(()) => {
                self.counters.parameters_produced += 1;
                FrameStatus::Ok
            }
            Err(e) => {
                error!(frame, "{e}");
                self.counters.parameter_failures += 1;
                FrameStatus::Failed
            }
        }
    }
}

impl<E, V, P> fmt::Debug for ControlLoop<E, V, P>
where
    E: DecisionEngine,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ControlLoop")
            .field("cadence", &self.cadence)
            .field("counters", &self.counters())
            .finish_non_exhaustive()
    }
}
