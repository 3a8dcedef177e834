// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Runtime-loaded bindings for the Intel IA AIQ library (`libia_aiq.so`).
//!
//! The vendor library is resolved with `libloading` when [`ia_aiq_lib::new`]
//! is called rather than linked at build time, so crates depending on these
//! bindings build on hosts which do not ship the library.

#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]

use libc::{c_char, c_int, c_uint, c_ulonglong, c_void};
use std::{ffi::OsStr, fmt};

/// Default shared object name of the IA AIQ library.
pub const IA_AIQ_LIBRARY: &str = "libia_aiq.so";

/// Status code returned by the IA library entry points.
pub type ia_err = c_int;

pub const ia_err_none: ia_err = 0;
pub const ia_err_general: ia_err = 1 << 1;
pub const ia_err_nomemory: ia_err = 1 << 2;
pub const ia_err_data: ia_err = 1 << 3;
pub const ia_err_internal: ia_err = 1 << 4;
pub const ia_err_argument: ia_err = 1 << 5;

/// Human readable description of an [`ia_err`] code.
pub fn ia_err_decode(err: ia_err) -> &'static str {
    match err {
        ia_err_none => "No error",
        ia_err_general => "General error",
        ia_err_nomemory => "Out of memory",
        ia_err_data => "Corrupted data",
        ia_err_internal => "Error in code",
        ia_err_argument => "Invalid argument for a function",
        _ => "Unknown error",
    }
}

/// Camera orientation reported alongside the statistics.
pub type ia_aiq_camera_orientation = c_uint;

pub const ia_aiq_camera_orientation_unknown: ia_aiq_camera_orientation = 0;

/// Opaque AIQ instance.
#[repr(C)]
pub struct ia_aiq {
    _private: [u8; 0],
}

/// Opaque camera module characterization handle.
#[repr(C)]
pub struct ia_cmc_t {
    _private: [u8; 0],
}

/// Opaque maker note handle.
#[repr(C)]
pub struct ia_mkn {
    _private: [u8; 0],
}

/// Binary blob handed to the library, `data` is null when `size` is zero.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct ia_binary_data {
    /// `void *data`
    pub data: *mut c_void,
    /// `unsigned int size`
    pub size: c_uint,
}

impl Default for ia_binary_data {
    fn default() -> Self {
        Self {
            data: std::ptr::null_mut(),
            size: 0,
        }
    }
}

/// Statistics input of `ia_aiq_statistics_set`.
///
/// All pointer members refer to structures owned by the caller for the
/// duration of the call. A zeroed value carries no statistics.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct ia_aiq_statistics_input_params {
    /// `unsigned long long frame_id`
    pub frame_id: c_ulonglong,
    /// `unsigned long long frame_timestamp`
    pub frame_timestamp: c_ulonglong,
    /// `const ia_aiq_ae_results *frame_ae_parameters`
    pub frame_ae_parameters: *const c_void,
    /// `const ia_aiq_af_results *frame_af_parameters`
    pub frame_af_parameters: *const c_void,
    /// `const ia_aiq_rgbs_grid **rgbs_grids`
    pub rgbs_grids: *const *const c_void,
    /// `unsigned int num_rgbs_grids`
    pub num_rgbs_grids: c_uint,
    /// `const ia_aiq_hdr_rgbs_grid *hdr_rgbs_grid`
    pub hdr_rgbs_grid: *const c_void,
    /// `const ia_aiq_af_grid **af_grids`
    pub af_grids: *const *const c_void,
    /// `unsigned int num_af_grids`
    pub num_af_grids: c_uint,
    /// `const ia_aiq_histogram **external_histograms`
    pub external_histograms: *const *const c_void,
    /// `unsigned int num_external_histograms`
    pub num_external_histograms: c_uint,
    /// `const ia_aiq_pa_results *frame_pa_parameters`
    pub frame_pa_parameters: *const c_void,
    /// `const ia_face_state *faces`
    pub faces: *const c_void,
    /// `ia_aiq_camera_orientation camera_orientation`
    pub camera_orientation: ia_aiq_camera_orientation,
    /// `const ia_aiq_awb_results *awb_results`
    pub awb_results: *const c_void,
    /// `const ia_aiq_sa_results *frame_sa_parameters`
    pub frame_sa_parameters: *const c_void,
    /// `const ia_aiq_depth_grid **depth_grids`
    pub depth_grids: *const *const c_void,
    /// `unsigned int num_depth_grids`
    pub num_depth_grids: c_uint,
}

impl Default for ia_aiq_statistics_input_params {
    fn default() -> Self {
        // SAFETY: every member is an integer or a raw pointer, all-zero is
        // the documented "no statistics" value.
        unsafe { std::mem::zeroed() }
    }
}

type ia_aiq_init_fn = unsafe extern "C" fn(
    aiqb_data: *const ia_binary_data,
    nvm_data: *const ia_binary_data,
    aiqd_data: *const ia_binary_data,
    stats_max_width: c_uint,
    stats_max_height: c_uint,
    max_num_stats_in: c_uint,
    ia_cmc: *mut ia_cmc_t,
    ia_mkn: *mut ia_mkn,
) -> *mut ia_aiq;

type ia_aiq_deinit_fn = unsafe extern "C" fn(ia_aiq: *mut ia_aiq);

type ia_aiq_statistics_set_fn = unsafe extern "C" fn(
    ia_aiq: *mut ia_aiq,
    statistics: *const ia_aiq_statistics_input_params,
) -> ia_err;

type ia_aiq_get_version_fn = unsafe extern "C" fn() -> *const c_char;

/// Entry points of a loaded IA AIQ library.
///
/// The library stays loaded for as long as this value lives, every handle
/// created through it must be released before it is dropped.
pub struct ia_aiq_lib {
    __library: libloading::Library,
    ia_aiq_init: ia_aiq_init_fn,
    ia_aiq_deinit: ia_aiq_deinit_fn,
    ia_aiq_statistics_set: ia_aiq_statistics_set_fn,
    ia_aiq_get_version: Option<ia_aiq_get_version_fn>,
}

impl ia_aiq_lib {
    /// Loads the library at `path` and resolves the required entry points.
    ///
    /// # Safety
    ///
    /// Loading a shared library runs its initialisers. The caller must trust
    /// the library at `path` to be a genuine IA AIQ implementation whose
    /// symbols match the signatures declared here.
    pub unsafe fn new<P>(path: P) -> Result<Self, libloading::Error>
    where
        P: AsRef<OsStr>,
    {
        let library = libloading::Library::new(path)?;
        let ia_aiq_init = *library.get::<ia_aiq_init_fn>(b"ia_aiq_init\0")?;
        let ia_aiq_deinit = *library.get::<ia_aiq_deinit_fn>(b"ia_aiq_deinit\0")?;
        let ia_aiq_statistics_set =
            *library.get::<ia_aiq_statistics_set_fn>(b"ia_aiq_statistics_set\0")?;
        let ia_aiq_get_version = library
            .get::<ia_aiq_get_version_fn>(b"ia_aiq_get_version\0")
            .ok()
            .map(|sym| *sym);

        Ok(Self {
            __library: library,
            ia_aiq_init,
            ia_aiq_deinit,
            ia_aiq_statistics_set,
            ia_aiq_get_version,
        })
    }

    /// # Safety
    ///
    /// The binary data pointers must be valid for reads of their declared
    /// size for the duration of the call.
    #[allow(clippy::too_many_arguments)]
    pub unsafe fn ia_aiq_init(
        &self,
        aiqb_data: *const ia_binary_data,
        nvm_data: *const ia_binary_data,
        aiqd_data: *const ia_binary_data,
        stats_max_width: c_uint,
        stats_max_height: c_uint,
        max_num_stats_in: c_uint,
        ia_cmc: *mut ia_cmc_t,
        ia_mkn: *mut ia_mkn,
    ) -> *mut ia_aiq {
        (self.ia_aiq_init)(
            aiqb_data,
            nvm_data,
            aiqd_data,
            stats_max_width,
            stats_max_height,
            max_num_stats_in,
            ia_cmc,
            ia_mkn,
        )
    }

    /// # Safety
    ///
    /// `ia_aiq` must come from [`Self::ia_aiq_init`] on this library and must
    /// not be used afterwards.
    pub unsafe fn ia_aiq_deinit(&self, ia_aiq: *mut ia_aiq) {
        (self.ia_aiq_deinit)(ia_aiq)
    }

    /// # Safety
    ///
    /// `ia_aiq` must be a live handle from this library and every pointer in
    /// `statistics` must be null or valid for the duration of the call.
    pub unsafe fn ia_aiq_statistics_set(
        &self,
        ia_aiq: *mut ia_aiq,
        statistics: *const ia_aiq_statistics_input_params,
    ) -> ia_err {
        (self.ia_aiq_statistics_set)(ia_aiq, statistics)
    }

    /// Version string reported by the library, if it exports one.
    pub fn version(&self) -> Option<String> {
        let get_version = self.ia_aiq_get_version?;
        // SAFETY: the library returns a static NUL terminated string.
        let version = unsafe { get_version() };
        if version.is_null() {
            return None;
        }
        let version = unsafe { std::ffi::CStr::from_ptr(version) };
        Some(version.to_string_lossy().into_owned())
    }
}

impl fmt::Debug for ia_aiq_lib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ia_aiq_lib")
            .field("library", &self.__library)
            .finish_non_exhaustive()
    }
}
