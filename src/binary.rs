// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::{
    fs::File,
    io::{self, ErrorKind, Read},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{error, info};

/// Failure to load a [`BinaryResource`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to find file: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to open: {}", .path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to determine file size: {}", .path.display())]
    SizeUnknown { path: PathBuf },

    #[error("file too large for the engine ({size} bytes): {}", .path.display())]
    TooLarge { path: PathBuf, size: u64 },

    #[error("failed to read file: {} ({actual} of {expected} bytes)", .path.display())]
    ShortRead {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::NotFound { path }
            | LoadError::OpenFailed { path, .. }
            | LoadError::SizeUnknown { path }
            | LoadError::TooLarge { path, .. }
            | LoadError::ShortRead { path, .. } => path,
        }
    }
}

/// File access primitives used by the loader.
///
/// [`Filesystem`] is the implementation used in deployments, other
/// implementations let callers serve blobs from elsewhere.
pub trait Storage {
    type Reader: Read;

    fn exists(&self, path: &Path) -> bool;

    /// Opens `path` read-only.
    fn open(&self, path: &Path) -> io::Result<Self::Reader>;

    /// Length in bytes of the opened source, `None` when the medium cannot
    /// report one.
    fn size(&self, reader: &Self::Reader) -> Option<u64>;
}

/// The local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct Filesystem;

impl Storage for Filesystem {
    type Reader = File;

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn open(&self, path: &Path) -> io::Result<File> {
        File::open(path)
    }

    fn size(&self, reader: &File) -> Option<u64> {
        // Pipes, sockets and devices report a length of zero which says
        // nothing about how much they hold.
        match reader.metadata() {
            Ok(meta) if meta.is_file() => Some(meta.len()),
            _ => None,
        }
    }
}

/// A calibration or firmware blob held in one owned, contiguous buffer.
///
/// A resource is either empty or holds the complete contents of the file it
/// was loaded from, it is never partially filled. The contents are immutable
/// once loaded.
///
/// # Example
///
/// ```no_run
/// use ipu3_aiq::binary::BinaryResource;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let aiqb = BinaryResource::load("/etc/camera/ipu3/00imx258.aiqb")?;
/// println!("loaded {} bytes", aiqb.view().len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BinaryResource {
    data: Vec<u8>,
}

impl BinaryResource {
    /// Loads the file at `path` from the local filesystem.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        Self::load_from(&Filesystem, path)
    }

    /// Loads `path` through `storage`.
    ///
    /// # Errors
    ///
    /// - [`LoadError::NotFound`] if the path does not exist
    /// - [`LoadError::OpenFailed`] if it cannot be opened for reading
    /// - [`LoadError::SizeUnknown`] if the source cannot report its length
    /// - [`LoadError::TooLarge`] if the length does not fit the engine's
    ///   32-bit size field
    /// - [`LoadError::ShortRead`] if fewer bytes than the reported length
    ///   could be read
    pub fn load_from<S, P>(storage: &S, path: P) -> Result<Self, LoadError>
    where
        S: Storage + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let res = read_exact_size(storage, path);
        match &res {
            Ok(data) => info!(path = %path.display(), size = data.len(), "Successfully loaded"),
            Err(err) => error!("{err}"),
        }
        res.map(|data| Self { data })
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Borrowed view of the contents, valid while the resource lives.
    pub fn view(&self) -> BinaryView<'_> {
        BinaryView { data: &self.data }
    }
}

fn read_exact_size<S>(storage: &S, path: &Path) -> Result<Vec<u8>, LoadError>
where
    S: Storage + ?Sized,
{
    if !storage.exists(path) {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = storage.open(path).map_err(|source| LoadError::OpenFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let size = storage.size(&reader).ok_or_else(|| LoadError::SizeUnknown {
        path: path.to_path_buf(),
    })?;
    if size > u64::from(u32::MAX) {
        return Err(LoadError::TooLarge {
            path: path.to_path_buf(),
            size,
        });
    }

    let expected = size as usize;
    let mut data = vec![0u8; expected];
    let mut actual = 0;
    while actual < expected {
        match reader.read(&mut data[actual..]) {
            Ok(0) => break,
            Ok(n) => actual += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(_) => break,
        }
    }

    if actual != expected {
        return Err(LoadError::ShortRead {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }

    Ok(data)
}

/// Pointer and length of a loaded [`BinaryResource`].
///
/// The view borrows the resource, so it cannot outlive the buffer it points
/// into. An empty resource yields a null pointer with a length of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryView<'a> {
    data: &'a [u8],
}

impl<'a> BinaryView<'a> {
    /// A view of no data.
    pub const fn empty() -> Self {
        BinaryView { data: &[] }
    }

    /// Start of the data, null for an empty view.
    pub fn as_ptr(&self) -> *const u8 {
        if self.data.is_empty() {
            std::ptr::null()
        } else {
            self.data.as_ptr()
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }
}

impl Default for BinaryView<'_> {
    fn default() -> Self {
        Self::empty()
    }
}
