// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

/// Maps an engine decision onto the device parameter buffer consumed by the
/// ISP for a following frame.
///
/// Encoding is total over valid configurations and writes into memory owned
/// by the caller.
pub trait ParameterEncoder<C> {
    type Params;

    fn encode(&self, config: &C, params: &mut Self::Params);
}

/// Converts a device statistics payload into the engine's native input.
///
/// The payload is only borrowed for the duration of the call, the returned
/// value must not refer back into it.
pub trait StatisticsConverter<S> {
    type Native;

    fn convert(&self, frame: u32, stats: &S) -> Self::Native;
}

/// Encoder whose parameter buffer is the engine configuration itself.
///
/// Used where the raw decision is consumed directly, such as bring-up
/// tooling and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl<C: Clone> ParameterEncoder<C> for Passthrough {
    type Params = C;

    fn encode(&self, config: &C, params: &mut C) {
        params.clone_from(config);
    }
}
