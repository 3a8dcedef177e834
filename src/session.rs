// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    binary::BinaryResource,
    encoder::{ParameterEncoder, StatisticsConverter},
    engine::{DecisionEngine, EngineError, EngineInit},
};
use std::{
    fmt, mem,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Span};

/// Directory holding the per-sensor calibration blobs.
pub const CALIBRATION_DIR: &str = "/etc/camera/ipu3";

/// Sensor whose calibration is used when none is named.
pub const DEFAULT_SENSOR: &str = "00imx258";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to initialise aiq library")]
    EngineInitFailed,

    #[error("session is not initialized")]
    NotInitialized,

    #[error("session is already initialized")]
    AlreadyInitialized,

    #[error("session has been destroyed")]
    Destroyed,

    #[error("failed to set statistics for frame {frame}: {source}")]
    StatisticsRejected {
        frame: u32,
        #[source]
        source: EngineError,
    },
}

impl SessionError {
    /// Whether the error only affects the current frame and the session can
    /// keep going.
    pub fn is_soft(&self) -> bool {
        matches!(self, SessionError::StatisticsRejected { .. })
    }
}

/// Deployment paths and statistics bounds fixed for a session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Sensor calibration blob (AIQB). A missing file is tolerated.
    pub calibration: PathBuf,
    /// Module NVM dump, skipped when `None`.
    pub nvm: Option<PathBuf>,
    /// Adaptive data (AIQD), skipped when `None`.
    pub adaptive: Option<PathBuf>,
    pub stats_max_width: u32,
    pub stats_max_height: u32,
    pub max_stats_in: u32,
}

impl SessionConfig {
    /// Configuration using the calibration blob of `sensor` from
    /// [`CALIBRATION_DIR`].
    pub fn for_sensor(sensor: &str) -> Self {
        Self {
            calibration: Path::new(CALIBRATION_DIR).join(format!("{sensor}.aiqb")),
            ..Default::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            calibration: Path::new(CALIBRATION_DIR).join(format!("{DEFAULT_SENSOR}.aiqb")),
            nvm: None,
            adaptive: None,
            stats_max_width: 1920,
            stats_max_height: 1080,
            max_stats_in: 4,
        }
    }
}

/// Lifecycle stage of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
    Destroyed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initialized => "initialized",
            SessionState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Blobs the engine was initialized from. They stay loaded, unmodified, for
/// as long as the handle lives.
#[derive(Debug, Default)]
struct Resources {
    calibration: BinaryResource,
    nvm: BinaryResource,
    adaptive: BinaryResource,
}

enum State<H> {
    Uninitialized,
    Initialized { handle: H, resources: Resources },
    Destroyed,
}

/// One instance of the 3A decision engine together with the collaborators
/// that translate its inputs and outputs.
///
/// The session owns the engine handle from a successful
/// [`initialize`](Session::initialize) until [`teardown`](Session::teardown)
/// or drop, whichever comes first, and releases it exactly once. It performs
/// no locking of its own, callers sharing a session between threads must
/// serialize access (see [`ControlLoop`](crate::driver::ControlLoop)).
pub struct Session<E, V, P>
where
    E: DecisionEngine,
{
    engine: E,
    converter: V,
    encoder: P,
    state: State<E::Handle>,
    span: Span,
}

impl<E, V, P> Session<E, V, P>
where
    E: DecisionEngine,
{
    /// Creates an uninitialized session, `camera` identifies it in logs.
    pub fn new(camera: &str, engine: E, converter: V, encoder: P) -> Self {
        let span = info_span!("aiq", camera = %camera);
        span.in_scope(|| info!("Creating AIQ session"));
        Self {
            engine,
            converter,
            encoder,
            state: State::Uninitialized,
            span,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.state {
            State::Uninitialized => SessionState::Uninitialized,
            State::Initialized { .. } => SessionState::Initialized,
            State::Destroyed => SessionState::Destroyed,
        }
    }

    /// Length of the calibration blob handed to the engine, `None` unless
    /// initialized.
    pub fn calibration_len(&self) -> Option<usize> {
        match &self.state {
            State::Initialized { resources, .. } => Some(resources.calibration.len()),
            _ => None,
        }
    }

    /// Loads the configured blobs and creates the engine instance.
    ///
    /// Blobs which fail to load are logged and handed to the engine empty,
    /// it is up to the engine whether it can run without them.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EngineInitFailed`] if the engine refuses to
    /// initialize, the session then stays uninitialized. Calling this on an
    /// initialized or destroyed session fails without touching the engine.
    pub fn initialize(&mut self, config: &SessionConfig) -> Result<(), SessionError> {
        let span = self.span.clone();
        let _enter = span.enter();

        match self.state {
            State::Uninitialized => {}
            State::Initialized { .. } => return Err(SessionError::AlreadyInitialized),
            State::Destroyed => return Err(SessionError::Destroyed),
        }

        let resources = Resources {
            calibration: load_blob("calibration", Some(&config.calibration)),
            nvm: load_blob("nvm", config.nvm.as_deref()),
            adaptive: load_blob("aiqd", config.adaptive.as_deref()),
        };

        let init = EngineInit {
            calibration: resources.calibration.view(),
            nvm: resources.nvm.view(),
            adaptive: resources.adaptive.view(),
            stats_max_width: config.stats_max_width,
            stats_max_height: config.stats_max_height,
            max_stats_in: config.max_stats_in,
        };

        let Some(handle) = self.engine.init(&init) else {
            error!("Failed to initialise aiq library");
            return Err(SessionError::EngineInitFailed);
        };

        info!(
            stats_max_width = config.stats_max_width,
            stats_max_height = config.stats_max_height,
            max_stats_in = config.max_stats_in,
            "AIQ initialized"
        );
        self.state = State::Initialized { handle, resources };
        Ok(())
    }

    /// Per-configuration engine setup, currently nothing to do.
    pub fn configure(&mut self) -> Result<(), SessionError> {
        self.span.in_scope(|| debug!("Configure AIQ"));
        Ok(())
    }

    /// Hands the statistics of `frame` to the engine.
    ///
    /// # Errors
    ///
    /// Fails with [`SessionError::NotInitialized`] or
    /// [`SessionError::Destroyed`] before reaching the engine when there is
    /// no live handle. An engine rejection is returned as the soft error
    /// [`SessionError::StatisticsRejected`], the session stays usable and
    /// the frame's statistics are dropped.
    pub fn set_statistics<S>(&mut self, frame: u32, stats: &S) -> Result<(), SessionError>
    where
        V: StatisticsConverter<S, Native = E::Statistics>,
    {
        let _enter = self.span.enter();
        debug!(frame, "Set Statistics");

        let handle = match &mut self.state {
            State::Initialized { handle, .. } => handle,
            State::Uninitialized => return Err(SessionError::NotInitialized),
            State::Destroyed => return Err(SessionError::Destroyed),
        };

        let native = self.converter.convert(frame, stats);
        self.engine
            .statistics_set(handle, &native)
            .map_err(|source| {
                error!(frame, "Failed to set statistics: {source}");
                SessionError::StatisticsRejected { frame, source }
            })
    }

    /// Runs the decision step and encodes its outcome into `params`.
    ///
    /// Before any statistics have been accepted `params` receives the
    /// encoding of the engine's initial decision.
    pub fn run(&mut self, frame: u32, params: &mut P::Params) -> Result<(), SessionError>
    where
        P: ParameterEncoder<E::Config>,
    {
        let _enter = self.span.enter();

        let handle = match &mut self.state {
            State::Initialized { handle, .. } => handle,
            State::Uninitialized => return Err(SessionError::NotInitialized),
            State::Destroyed => return Err(SessionError::Destroyed),
        };

        let mut config = E::Config::default();
        self.engine.run(handle, frame, &mut config);
        self.encoder.encode(&config, params);
        debug!(frame, "Parameters encoded");
        Ok(())
    }

    /// Releases the engine instance of an initialized session, which is then
    /// destroyed. Safe to call any number of times. A session which was never
    /// initialized is left as it is and may still be initialized later.
    pub fn teardown(&mut self) {
        let _enter = self.span.enter();
        match self.state {
            State::Initialized { .. } => {}
            State::Uninitialized => {
                debug!("Teardown of uninitialized session");
                return;
            }
            State::Destroyed => return,
        }

        if let State::Initialized { handle, resources } =
            mem::replace(&mut self.state, State::Destroyed)
        {
            info!("Destroying AIQ session");
            self.engine.deinit(handle);
            drop(resources);
        }
    }
}

impl<E, V, P> Drop for Session<E, V, P>
where
    E: DecisionEngine,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<E, V, P> fmt::Debug for Session<E, V, P>
where
    E: DecisionEngine,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn load_blob(kind: &str, path: Option<&Path>) -> BinaryResource {
    let Some(path) = path else {
        return BinaryResource::default();
    };
    BinaryResource::load(path).unwrap_or_else(|_| {
        warn!("No {kind} data, not quitting");
        BinaryResource::default()
    })
}
