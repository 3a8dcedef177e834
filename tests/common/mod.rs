// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

#![allow(dead_code)]

use ipu3_aiq::{
    binary::Storage,
    encoder::{Passthrough, StatisticsConverter},
    engine::{DecisionEngine, EngineError, EngineInit},
    session::Session,
};
use parking_lot::Mutex;
use std::{
    io::{self, Cursor},
    path::Path,
    sync::Arc,
};

/// Everything the mock engine was asked to do.
#[derive(Debug, Default)]
pub struct Calls {
    pub init: u32,
    pub deinit: u32,
    pub calibration: Vec<u8>,
    pub nvm: Vec<u8>,
    pub adaptive: Vec<u8>,
    pub calibration_null: bool,
    pub geometry: Option<(u32, u32, u32)>,
    pub statistics: Vec<u64>,
    pub runs: Vec<u32>,
}

pub type Recorder = Arc<Mutex<Calls>>;

#[derive(Debug)]
pub struct MockHandle(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockStats {
    pub frame: u64,
    pub sum: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MockConfig {
    pub frame: u32,
    pub statistics_seen: usize,
}

pub const ERR_DATA: i32 = 1 << 3;

/// Decision engine which records its calls.
pub struct MockEngine {
    pub calls: Recorder,
    pub accept_init: bool,
    pub reject_frames: Vec<u64>,
    next_handle: u32,
}

impl MockEngine {
    pub fn new() -> (Self, Recorder) {
        let calls = Recorder::default();
        let engine = Self {
            calls: calls.clone(),
            accept_init: true,
            reject_frames: Vec::new(),
            next_handle: 1,
        };
        (engine, calls)
    }

    pub fn refusing() -> (Self, Recorder) {
        let (mut engine, calls) = Self::new();
        engine.accept_init = false;
        (engine, calls)
    }

    pub fn rejecting(frames: &[u64]) -> (Self, Recorder) {
        let (mut engine, calls) = Self::new();
        engine.reject_frames = frames.to_vec();
        (engine, calls)
    }
}

impl DecisionEngine for MockEngine {
    type Handle = MockHandle;
    type Statistics = MockStats;
    type Config = MockConfig;

    fn init(&mut self, init: &EngineInit<'_>) -> Option<MockHandle> {
        let mut calls = self.calls.lock();
        calls.init += 1;
        calls.calibration = init.calibration.as_bytes().to_vec();
        calls.calibration_null = init.calibration.as_ptr().is_null();
        calls.nvm = init.nvm.as_bytes().to_vec();
        calls.adaptive = init.adaptive.as_bytes().to_vec();
        calls.geometry = Some((
            init.stats_max_width,
            init.stats_max_height,
            init.max_stats_in,
        ));

        if !self.accept_init {
            return None;
        }
        let handle = MockHandle(self.next_handle);
        self.next_handle += 1;
        Some(handle)
    }

    fn statistics_set(
        &mut self,
        _handle: &mut MockHandle,
        stats: &MockStats,
    ) -> Result<(), EngineError> {
        if self.reject_frames.contains(&stats.frame) {
            return Err(EngineError::new(ERR_DATA, "Corrupted data"));
        }
        self.calls.lock().statistics.push(stats.frame);
        Ok(())
    }

    fn run(&mut self, _handle: &mut MockHandle, frame: u32, config: &mut MockConfig) {
        let mut calls = self.calls.lock();
        calls.runs.push(frame);
        config.frame = frame;
        config.statistics_seen = calls.statistics.len();
    }

    fn deinit(&mut self, _handle: MockHandle) {
        self.calls.lock().deinit += 1;
    }
}

/// Sums the payload bytes so tests can see the payload was read.
#[derive(Debug, Default, Clone, Copy)]
pub struct SumConverter;

impl StatisticsConverter<Vec<u8>> for SumConverter {
    type Native = MockStats;

    fn convert(&self, frame: u32, stats: &Vec<u8>) -> MockStats {
        MockStats {
            frame: u64::from(frame),
            sum: stats.iter().map(|b| u64::from(*b)).sum(),
        }
    }
}

pub type MockSession = Session<MockEngine, SumConverter, Passthrough>;

pub fn session(engine: MockEngine) -> MockSession {
    Session::new("test", engine, SumConverter, Passthrough)
}

/// Storage serving one in-memory blob with a configurable reported size.
pub struct FakeStorage {
    pub content: Vec<u8>,
    pub declared: Option<u64>,
    pub exists: bool,
    pub open_error: Option<io::ErrorKind>,
}

impl FakeStorage {
    pub fn new(content: &[u8]) -> Self {
        Self {
            content: content.to_vec(),
            declared: Some(content.len() as u64),
            exists: true,
            open_error: None,
        }
    }
}

impl Storage for FakeStorage {
    type Reader = Cursor<Vec<u8>>;

    fn exists(&self, _path: &Path) -> bool {
        self.exists
    }

    fn open(&self, _path: &Path) -> io::Result<Self::Reader> {
        match self.open_error {
            Some(kind) => Err(io::Error::from(kind)),
            None => Ok(Cursor::new(self.content.clone())),
        }
    }

    fn size(&self, _reader: &Self::Reader) -> Option<u64> {
        self.declared
    }
}
