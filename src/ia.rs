// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Decision engine backed by the Intel IA AIQ library.

use crate::{
    binary::BinaryView,
    encoder::StatisticsConverter,
    engine::{DecisionEngine, EngineError, EngineInit},
};
use ia_aiq_sys::{
    ia_aiq, ia_aiq_lib, ia_aiq_statistics_input_params, ia_binary_data, ia_err_decode,
    ia_err_none, IA_AIQ_LIBRARY,
};
use std::{error::Error, ffi::OsStr, ptr::NonNull};
use tracing::{debug, info};

/// Live `ia_aiq` instance.
#[derive(Debug)]
pub struct AiqHandle(NonNull<ia_aiq>);

// SAFETY: the library keeps no thread affinity for an instance, the session
// guarantees calls on one handle are never concurrent.
unsafe impl Send for AiqHandle {}

/// Outcome of one AIQ decision step, the input of the IPU3 parameter
/// encoder.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AicConfig {
    /// Frame the decision was made for.
    pub frame: u32,
}

/// The IA AIQ library loaded at runtime.
pub struct IaAiq {
    lib: ia_aiq_lib,
}

impl IaAiq {
    /// Loads the library from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the library cannot be loaded or lacks one of the
    /// required entry points.
    pub fn load<P: AsRef<OsStr>>(path: P) -> Result<Self, Box<dyn Error>> {
        let lib = unsafe { ia_aiq_lib::new(path.as_ref()) }?;
        match lib.version() {
            Some(version) => info!("IA AIQ library version {version}"),
            None => info!("IA AIQ library loaded"),
        }
        Ok(Self { lib })
    }

    /// Loads the library from the default search path.
    pub fn load_default() -> Result<Self, Box<dyn Error>> {
        Self::load(IA_AIQ_LIBRARY)
    }
}

fn binary_data(view: &BinaryView<'_>) -> ia_binary_data {
    ia_binary_data {
        data: view.as_ptr() as *mut _,
        // The loader refuses blobs whose length does not fit.
        size: view.len() as u32,
    }
}

impl DecisionEngine for IaAiq {
    type Handle = AiqHandle;
    type Statistics = ia_aiq_statistics_input_params;
    type Config = AicConfig;

    fn init(&mut self, init: &EngineInit<'_>) -> Option<AiqHandle> {
        let aiqb = binary_data(&init.calibration);
        let nvm = binary_data(&init.nvm);
        let aiqd = binary_data(&init.adaptive);

        // SAFETY: the views borrow resources kept alive by the session for
        // the lifetime of the handle, the library only reads through them.
        let aiq = unsafe {
            self.lib.ia_aiq_init(
                &aiqb,
                &nvm,
                &aiqd,
                init.stats_max_width,
                init.stats_max_height,
                init.max_stats_in,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        NonNull::new(aiq).map(AiqHandle)
    }

    fn statistics_set(
        &mut self,
        handle: &mut AiqHandle,
        stats: &ia_aiq_statistics_input_params,
    ) -> Result<(), EngineError> {
        // SAFETY: handle is live and stats outlives the call.
        let err = unsafe { self.lib.ia_aiq_statistics_set(handle.0.as_ptr(), stats) };
        if err != ia_err_none {
            return Err(EngineError::new(err, ia_err_decode(err)));
        }
        Ok(())
    }

    fn run(&mut self, _handle: &mut AiqHandle, frame: u32, config: &mut AicConfig) {
        // TODO: bind ia_aiq_ae_run, ia_aiq_awb_run and ia_aiq_af_run and
        // collect their results into AicConfig.
        config.frame = frame;
        debug!(frame, "Run AIQ");
    }

    fn deinit(&mut self, handle: AiqHandle) {
        // SAFETY: the handle came from ia_aiq_init on this library and is
        // consumed here.
        unsafe { self.lib.ia_aiq_deinit(handle.0.as_ptr()) };
    }
}

/// Statistics conversion for IPU3 `ipu3_uapi_stats_3a` payloads.
///
/// Produces an input record stamped with the frame id which carries no
/// grids, the engine treats it as a frame without measurements.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ipu3StatsConverter;

impl<S> StatisticsConverter<S> for Ipu3StatsConverter {
    type Native = ia_aiq_statistics_input_params;

    fn convert(&self, frame: u32, _stats: &S) -> ia_aiq_statistics_input_params {
        ia_aiq_statistics_input_params {
            frame_id: u64::from(frame),
            ..Default::default()
        }
    }
}
