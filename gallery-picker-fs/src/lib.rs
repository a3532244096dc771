//! # gallery-picker-fs
//!
//! Filesystem library backend for gallery-picker.
//!
//! Provides:
//! - `LibraryWriter`: persists captured photos into a library directory, each
//!   with a JSON metadata sidecar carrying its SHA-256 checksum
//! - `LibraryResolver`: reads library assets back at a quality tier on a
//!   background thread, downsizing and re-encoding as JPEG below `original`
//! - `metadata`: sidecar read/write
//!
//! ## Layout
//! ```text
//! <library>/
//! ├── <uuid>.jpg
//! └── <uuid>.metadata.json
//! ```
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use gallery_picker_core::{PickerConfiguration, PickerSession};
//! use gallery_picker_fs::{LibraryResolver, LibraryWriter};
//!
//! let resolver = Arc::new(LibraryResolver::new("/data/library")?);
//! let writer = Arc::new(LibraryWriter::new("/data/library"));
//! let config = PickerConfiguration::default();
//! let session = PickerSession::new(config, resolver, hardware, writer, delegate)?;
//! ```

pub mod library_resolver;
pub mod library_writer;
pub mod metadata;

pub use library_resolver::LibraryResolver;
pub use library_writer::LibraryWriter;
pub use metadata::AssetMetadata;
