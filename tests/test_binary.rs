// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

mod common;

use common::FakeStorage;
use ipu3_aiq::binary::{BinaryResource, BinaryView, LoadError};
use std::{error::Error, io::Write, path::Path};

#[test]
fn test_load() -> Result<(), Box<dyn Error>> {
    let content: Vec<u8> = (0..4096u32).map(|i| (i * 7 % 251) as u8).collect();
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(&content)?;
    file.flush()?;

    let res = BinaryResource::load(file.path())?;
    let view = res.view();

    assert_eq!(res.len(), content.len());
    assert_eq!(view.len(), content.len());
    assert_eq!(view.as_bytes(), content.as_slice());
    assert!(!view.as_ptr().is_null());

    Ok(())
}

#[test]
fn test_load_empty_file() -> Result<(), Box<dyn Error>> {
    let file = tempfile::NamedTempFile::new()?;

    let res = BinaryResource::load(file.path())?;
    assert!(res.is_empty());
    assert!(res.view().as_ptr().is_null());

    Ok(())
}

#[test]
fn test_load_is_not_cached() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("00imx258.aiqb");

    std::fs::write(&path, b"first")?;
    let first = BinaryResource::load(&path)?;
    std::fs::write(&path, b"second blob")?;
    let second = BinaryResource::load(&path)?;

    assert_eq!(first.view().as_bytes(), b"first");
    assert_eq!(second.view().as_bytes(), b"second blob");

    Ok(())
}

#[test]
fn test_not_found() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("missing.aiqb");

    let err = BinaryResource::load(&path).unwrap_err();
    assert!(matches!(err, LoadError::NotFound { .. }));
    assert_eq!(err.path(), path.as_path());

    let res = BinaryResource::load(&path).unwrap_or_default();
    assert!(res.is_empty());
    assert_eq!(res.view(), BinaryView::empty());

    Ok(())
}

#[test]
fn test_size_unknown() -> Result<(), Box<dyn Error>> {
    // A directory opens read-only on Linux but has no meaningful length.
    let dir = tempfile::tempdir()?;

    let err = BinaryResource::load(dir.path()).unwrap_err();
    assert!(matches!(err, LoadError::SizeUnknown { .. }));

    let mut storage = FakeStorage::new(b"blob");
    storage.declared = None;
    let err = BinaryResource::load_from(&storage, "/etc/camera/ipu3/fifo").unwrap_err();
    assert!(matches!(err, LoadError::SizeUnknown { .. }));

    Ok(())
}

#[test]
fn test_short_read() {
    let mut storage = FakeStorage::new(&[0xaa; 100]);
    storage.declared = Some(160);

    let err = BinaryResource::load_from(&storage, "/etc/camera/ipu3/short.aiqb").unwrap_err();
    match err {
        LoadError::ShortRead {
            expected, actual, ..
        } => {
            assert_eq!(expected, 160);
            assert_eq!(actual, 100);
        }
        e => panic!("unexpected error {e}"),
    }
}

#[test]
fn test_open_failed() {
    let mut storage = FakeStorage::new(b"blob");
    storage.open_error = Some(std::io::ErrorKind::PermissionDenied);

    let err = BinaryResource::load_from(&storage, "/etc/camera/ipu3/locked.aiqb").unwrap_err();
    assert!(matches!(err, LoadError::OpenFailed { .. }));
    assert!(err.source().is_some());
}

#[test]
fn test_not_found_storage() {
    let mut storage = FakeStorage::new(b"blob");
    storage.exists = false;

    let err = BinaryResource::load_from(&storage, Path::new("/nowhere")).unwrap_err();
    assert!(matches!(err, LoadError::NotFound { .. }));
}

#[test]
fn test_too_large() {
    let mut storage = FakeStorage::new(b"blob");
    storage.declared = Some(u64::from(u32::MAX) + 1);

    let err = BinaryResource::load_from(&storage, "/etc/camera/ipu3/huge.aiqb").unwrap_err();
    assert!(matches!(err, LoadError::TooLarge { .. }));
}

#[test]
fn test_storage_longer_than_declared() -> Result<(), Box<dyn Error>> {
    let mut storage = FakeStorage::new(b"0123456789");
    storage.declared = Some(4);

    let res = BinaryResource::load_from(&storage, "/etc/camera/ipu3/grown.aiqb")?;
    assert_eq!(res.view().as_bytes(), b"0123");

    Ok(())
}
