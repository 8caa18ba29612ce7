//! Movie containers and their member streams.
//!
//! A movie (`.ltm`) is a gzipped tarball holding:
//! - `annotations.txt`: free-form text
//! - `config.ini`: recorder metadata ([`Metadata`])
//! - `editor.ini`: editor UI settings (opaque)
//! - `inputs`: the frame log
//!
//! # Example
//!
//! ```no_run
//! use ltm_core::movie::RecordingArena;
//!
//! let mut arena = RecordingArena::new(".temp");
//! let handle = arena.open("part1.ltm").unwrap();
//! let recording = arena.get(handle).unwrap();
//! println!("ends at {}", recording.end_micros().unwrap());
//! arena.discard(handle).unwrap();
//! ```

mod arena;
mod container;
mod error;
mod metadata;
mod recording;
mod version;

pub use arena::{RecordingArena, RecordingHandle};
pub use container::{
    write_container, ExtractedContainer, ANNOTATIONS_MEMBER, CONFIG_MEMBER, EDITOR_MEMBER,
    INPUTS_MEMBER,
};
pub use error::{
    ContainerError, ContainerResult, MetadataError, MetadataResult, VersionError, VersionResult,
};
pub use metadata::{keys, FrameRate, Metadata, GENERAL};
pub use recording::Recording;
pub use version::{newer_of, Newer, Version};
