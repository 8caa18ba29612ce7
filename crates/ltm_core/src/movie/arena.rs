//! Arena of open recordings addressed by handle.
//!
//! Every open recording owns its extraction scope. Committing or discarding
//! a handle releases that scope, and dropping the arena releases all of
//! them.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::container::ExtractedContainer;
use super::error::{ContainerError, ContainerResult};
use super::recording::Recording;

/// Opaque handle to a recording held by a [`RecordingArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordingHandle(u32);

impl fmt::Display for RecordingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct OpenRecording {
    /// `None` for recordings built in memory.
    _scope: Option<ExtractedContainer>,
    recording: Recording,
}

/// Owns every recording a merge has open.
pub struct RecordingArena {
    temp_root: PathBuf,
    next_id: u32,
    open: HashMap<RecordingHandle, OpenRecording>,
}

impl RecordingArena {
    /// Create an arena extracting under `temp_root`.
    pub fn new(temp_root: impl Into<PathBuf>) -> Self {
        Self {
            temp_root: temp_root.into(),
            next_id: 0,
            open: HashMap::new(),
        }
    }

    fn allocate(&mut self) -> RecordingHandle {
        let handle = RecordingHandle(self.next_id);
        self.next_id += 1;
        handle
    }

    /// Extract and parse the container at `path`.
    pub fn open(&mut self, path: impl AsRef<Path>) -> ContainerResult<RecordingHandle> {
        let scope = ExtractedContainer::extract(path, &self.temp_root)?;
        let recording = Recording::from_extracted(&scope)?;
        let handle = self.allocate();
        tracing::debug!("Opened {} as {}", recording.display_name(), handle);
        self.open.insert(
            handle,
            OpenRecording {
                _scope: Some(scope),
                recording,
            },
        );
        Ok(handle)
    }

    /// Hold a recording built in memory.
    pub fn insert(&mut self, recording: Recording) -> RecordingHandle {
        let handle = self.allocate();
        self.open.insert(
            handle,
            OpenRecording {
                _scope: None,
                recording,
            },
        );
        handle
    }

    pub fn get(&self, handle: RecordingHandle) -> ContainerResult<&Recording> {
        self.open
            .get(&handle)
            .map(|o| &o.recording)
            .ok_or(ContainerError::UnknownHandle(handle))
    }

    pub fn get_mut(&mut self, handle: RecordingHandle) -> ContainerResult<&mut Recording> {
        self.open
            .get_mut(&handle)
            .map(|o| &mut o.recording)
            .ok_or(ContainerError::UnknownHandle(handle))
    }

    /// Write the recording to `dest` and close it.
    ///
    /// The handle is closed even when writing fails.
    pub fn commit(&mut self, handle: RecordingHandle, dest: impl AsRef<Path>) -> ContainerResult<()> {
        let open = self
            .open
            .remove(&handle)
            .ok_or(ContainerError::UnknownHandle(handle))?;
        open.recording.write_to(dest)
    }

    /// Close without writing.
    pub fn discard(&mut self, handle: RecordingHandle) -> ContainerResult<Recording> {
        self.open
            .remove(&handle)
            .map(|o| o.recording)
            .ok_or(ContainerError::UnknownHandle(handle))
    }

    pub fn contains(&self, handle: RecordingHandle) -> bool {
        self.open.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}
