//! `.ltm` containers: gzipped tarballs with four named members.
//!
//! Extraction lands in a scoped temporary directory that is removed when
//! the [`ExtractedContainer`] drops, whether or not anything was committed.
//! Writing goes through a temporary file beside the destination and a
//! rename, so a pre-existing file is replaced in one step.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Archive, Builder, Header};
use tempfile::{NamedTempFile, TempDir};

use super::error::{ContainerError, ContainerResult};

/// Free-form annotation text.
pub const ANNOTATIONS_MEMBER: &str = "annotations.txt";
/// Key-value metadata.
pub const CONFIG_MEMBER: &str = "config.ini";
/// Editor UI settings, opaque to the merge.
pub const EDITOR_MEMBER: &str = "editor.ini";
/// The frame log.
pub const INPUTS_MEMBER: &str = "inputs";

/// A container unpacked into a temporary directory.
#[derive(Debug)]
pub struct ExtractedContainer {
    source: PathBuf,
    dir: TempDir,
}

impl ExtractedContainer {
    /// Unpack `path` under `temp_root`.
    pub fn extract(path: impl AsRef<Path>, temp_root: impl AsRef<Path>) -> ContainerResult<Self> {
        let path = path.as_ref();
        let temp_root = temp_root.as_ref();

        fs::create_dir_all(temp_root).map_err(|e| ContainerError::io(temp_root, e))?;
        let dir = tempfile::Builder::new()
            .prefix("ltm-")
            .tempdir_in(temp_root)
            .map_err(|e| ContainerError::io(temp_root, e))?;

        let file = File::open(path).map_err(|e| ContainerError::io(path, e))?;
        let mut archive = Archive::new(GzDecoder::new(file));
        archive
            .unpack(dir.path())
            .map_err(|e| ContainerError::io(path, e))?;

        tracing::debug!("Extracted {} to {}", path.display(), dir.path().display());

        Ok(Self {
            source: path.to_path_buf(),
            dir,
        })
    }

    /// Container the members came from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Extraction directory.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path a member was unpacked to.
    pub fn member_path(&self, member: &str) -> PathBuf {
        self.dir.path().join(member)
    }

    /// Read a member as text, `None` when the archive lacks it.
    pub fn read_member(&self, member: &str) -> ContainerResult<Option<String>> {
        let path = self.member_path(member);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| ContainerError::io(path, e))
    }

    /// Read a member every movie must carry.
    pub fn require_member(&self, member: &str) -> ContainerResult<String> {
        self.read_member(member)?
            .ok_or_else(|| ContainerError::missing_member(&self.source, member))
    }
}

/// Write `members` as a new container at `dest`, replacing any existing
/// file there.
pub fn write_container(dest: impl AsRef<Path>, members: &[(&str, Vec<u8>)]) -> ContainerResult<()> {
    let dest = dest.as_ref();
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| ContainerError::io(&parent, e))?;

    let temp = NamedTempFile::new_in(&parent).map_err(|e| ContainerError::io(&parent, e))?;
    let mtime = chrono::Utc::now().timestamp().max(0) as u64;

    let mut builder = Builder::new(GzEncoder::new(temp, Compression::default()));
    for (name, data) in members {
        let mut header = Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(mtime);
        header.set_cksum();
        builder
            .append_data(&mut header, name, data.as_slice())
            .map_err(|e| ContainerError::io(dest, e))?;
    }

    let mut temp = builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .map_err(|e| ContainerError::io(dest, e))?;
    temp.flush().map_err(|e| ContainerError::io(dest, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| ContainerError::io(dest, e))?;

    temp.persist(dest)
        .map_err(|e| ContainerError::io(dest, e.error))?;

    tracing::debug!("Wrote {} ({} members)", dest.display(), members.len());
    Ok(())
}
