//! A parsed movie: its four member streams held in memory.

use std::path::{Path, PathBuf};

use crate::frames::FrameLog;

use super::container::{
    write_container, ExtractedContainer, ANNOTATIONS_MEMBER, CONFIG_MEMBER, EDITOR_MEMBER,
    INPUTS_MEMBER,
};
use super::error::{ContainerError, ContainerResult, MetadataResult};
use super::metadata::{FrameRate, Metadata};
use super::version::Version;

/// One recording.
///
/// Annotations and editor settings are carried through untouched; the
/// merge only rewrites metadata and frames.
#[derive(Debug, Clone)]
pub struct Recording {
    /// Container this recording was read from (or will be written to).
    pub path: PathBuf,
    pub annotations: Option<String>,
    pub metadata: Metadata,
    pub editor: Option<String>,
    pub frames: FrameLog,
}

impl Recording {
    /// Build from already unpacked members.
    pub fn from_extracted(extracted: &ExtractedContainer) -> ContainerResult<Self> {
        let path = extracted.source().to_path_buf();

        let config = extracted.require_member(CONFIG_MEMBER)?;
        let metadata = Metadata::parse(&config).map_err(|source| ContainerError::Metadata {
            path: path.clone(),
            source,
        })?;
        let inputs = extracted.require_member(INPUTS_MEMBER)?;

        Ok(Self {
            annotations: extracted.read_member(ANNOTATIONS_MEMBER)?,
            editor: extracted.read_member(EDITOR_MEMBER)?,
            frames: FrameLog::parse(&inputs),
            metadata,
            path,
        })
    }

    /// Extract and parse a container, discarding the extraction afterwards.
    pub fn load(path: impl AsRef<Path>, temp_root: impl AsRef<Path>) -> ContainerResult<Self> {
        let extracted = ExtractedContainer::extract(path, temp_root)?;
        Self::from_extracted(&extracted)
    }

    /// Member streams in archive order.
    pub fn members(&self) -> Vec<(&'static str, Vec<u8>)> {
        let mut members = Vec::with_capacity(4);
        if let Some(annotations) = &self.annotations {
            members.push((ANNOTATIONS_MEMBER, annotations.clone().into_bytes()));
        }
        members.push((CONFIG_MEMBER, self.metadata.render().into_bytes()));
        if let Some(editor) = &self.editor {
            members.push((EDITOR_MEMBER, editor.clone().into_bytes()));
        }
        members.push((INPUTS_MEMBER, self.frames.render().into_bytes()));
        members
    }

    /// Package into a container at `dest`, replacing any existing file.
    pub fn write_to(&self, dest: impl AsRef<Path>) -> ContainerResult<()> {
        write_container(dest, &self.members())
    }

    pub fn version(&self) -> MetadataResult<Version> {
        self.metadata.version()
    }

    pub fn frame_rate(&self) -> MetadataResult<FrameRate> {
        self.metadata.frame_rate()
    }

    pub fn start_micros(&self) -> MetadataResult<u64> {
        self.metadata.start_micros()
    }

    pub fn end_micros(&self) -> MetadataResult<u64> {
        self.metadata.end_micros()
    }

    /// Elapsed time implied by the frame log at the declared default rate.
    pub fn log_elapsed_micros(&self) -> MetadataResult<u64> {
        Ok(self.frames.elapsed_micros(self.frame_rate()?.rate))
    }

    /// File name used in log messages.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_write_load_keeps_members() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.ltm");
        write_container(
            &path,
            &[
                (ANNOTATIONS_MEMBER, b"route notes".to_vec()),
                (
                    CONFIG_MEMBER,
                    b"[General]\nframerate_num=50\nframerate_den=1\n\n".to_vec(),
                ),
                (EDITOR_MEMBER, b"[General]\ncolumn=1\n".to_vec()),
                (INPUTS_MEMBER, b"|K|\n|K|\n|K|T1000000:500|\n".to_vec()),
            ],
        )
        .unwrap();

        let recording = Recording::load(&path, dir.path().join("tmp")).unwrap();
        assert_eq!(recording.frames.len(), 3);
        assert_eq!(recording.log_elapsed_micros().unwrap(), 40_500);
        assert_eq!(recording.display_name(), "a.ltm");

        let copy = dir.path().join("b.ltm");
        recording.write_to(&copy).unwrap();
        let reloaded = Recording::load(&copy, dir.path().join("tmp")).unwrap();

        assert_eq!(reloaded.annotations.as_deref(), Some("route notes"));
        assert_eq!(reloaded.editor.as_deref(), Some("[General]\ncolumn=1\n"));
        assert_eq!(reloaded.metadata, recording.metadata);
        assert_eq!(reloaded.frames, recording.frames);
    }
}
