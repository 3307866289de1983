use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::state::State;
use crate::error::{Error, Result};
use crate::types::{Shader, Tag, User};

/// Self-contained serialization of the whole store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDoc {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub shaders: Vec<Shader>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl State {
    /// Deep copy of every table, ordered by id.
    #[must_use]
    pub fn to_snapshot(&self) -> SnapshotDoc {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);

        let mut shaders: Vec<Shader> = self.shaders.values().cloned().collect();
        shaders.sort_by_key(|s| s.id);

        let mut tags: Vec<Tag> = self.tags.values().cloned().collect();
        tags.sort_by_key(|t| t.id);

        SnapshotDoc {
            version: self.version,
            users,
            shaders,
            tags,
        }
    }

    /// Rebuilds tables, indexes and id watermarks from a snapshot.
    ///
    /// Embedded shader tags are re-resolved against the tag table so a
    /// snapshot missing a canonical tag still restores consistently.
    #[must_use]
    pub fn from_snapshot(doc: SnapshotDoc) -> Self {
        let mut state = State {
            version: doc.version,
            ..State::default()
        };

        for tag in doc.tags {
            if tag.name.trim().is_empty()
                || tag.id == u64::MAX
                || state.tags.contains_key(&tag.id)
                || state.index.tag_id(&tag.name).is_some()
            {
                warn!(tag_id = tag.id, name = %tag.name, "Skipping invalid or duplicate tag in snapshot");
                continue;
            }
            state.ids.tags.observe(tag.id);
            state.index.insert_tag(&tag);
            state.tags.insert(tag.id, tag);
        }

        for user in doc.users {
            if user.id == u64::MAX
                || state.users.contains_key(&user.id)
                || state.index.user_id(&user.username).is_some()
            {
                warn!(user_id = user.id, username = %user.username, "Skipping invalid or duplicate user in snapshot");
                continue;
            }
            state.ids.users.observe(user.id);
            state.index.insert_user(&user);
            state.users.insert(user.id, user);
        }

        for mut shader in doc.shaders {
            if shader.id == u64::MAX || state.shaders.contains_key(&shader.id) {
                warn!(shader_id = shader.id, "Skipping invalid or duplicate shader in snapshot");
                continue;
            }
            let names: Vec<String> = shader.tags.drain(..).map(|t| t.name).collect();
            shader.tags = match state.normalize_tags(&names) {
                Ok(tags) => tags,
                Err(e) => {
                    warn!(shader_id = shader.id, "Dropping tags of restored shader: {e}");
                    Vec::new()
                }
            };
            state.ids.shaders.observe(shader.id);
            state.index.add_shader(&shader);
            state.shaders.insert(shader.id, shader);
        }

        state
    }
}

/// Outcome of reading the snapshot file at startup.
#[derive(Debug)]
pub enum Loaded {
    Missing,
    Corrupt,
    Doc(SnapshotDoc),
}

/// Writes snapshots to a single file with write-to-temp-then-rename.
///
/// Writers are serialized and a snapshot older than the last one written is
/// dropped, so a slow writer can never clobber newer state.
#[derive(Debug)]
pub struct Persister {
    path: PathBuf,
    last_written: Mutex<Option<u64>>,
}

impl Persister {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            last_written: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the snapshot file. A file that does not parse is moved aside to
    /// `<file>.corrupt` so the next write cannot destroy it.
    pub fn load(&self) -> Result<Loaded> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Loaded::Missing),
            Err(e) => {
                return Err(Error::Persistence(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        match serde_json::from_slice::<SnapshotDoc>(&bytes) {
            Ok(doc) => {
                *self.last_written() = Some(doc.version);
                Ok(Loaded::Doc(doc))
            }
            Err(e) => {
                let aside = sibling(&self.path, ".corrupt");
                warn!(
                    "Snapshot {} is unreadable ({e}); moving it to {} and starting empty",
                    self.path.display(),
                    aside.display()
                );
                if let Err(e) = fs::rename(&self.path, &aside) {
                    warn!("Failed to move unreadable snapshot aside: {e}");
                }
                Ok(Loaded::Corrupt)
            }
        }
    }

    /// Atomically replaces the snapshot file with `doc`. Returns `false` when
    /// a newer snapshot has already been written.
    pub fn write(&self, doc: &SnapshotDoc) -> Result<bool> {
        let mut last = self.last_written();
        if last.is_some_and(|v| doc.version < v) {
            debug!(
                version = doc.version,
                "Skipping stale snapshot write"
            );
            return Ok(false);
        }

        let bytes = serde_json::to_vec_pretty(doc)
            .map_err(|e| Error::Persistence(format!("failed to encode snapshot: {e}")))?;
        self.replace(&bytes).map_err(|e| {
            Error::Persistence(format!("failed to write {}: {e}", self.path.display()))
        })?;

        *last = Some(doc.version);
        Ok(true)
    }

    fn replace(&self, bytes: &[u8]) -> std::io::Result<()> {
        let tmp = sibling(&self.path, ".tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        if let Some(parent) = self.path.parent() {
            fsync_dir(parent).ok();
        }
        Ok(())
    }

    fn last_written(&self) -> std::sync::MutexGuard<'_, Option<u64>> {
        self.last_written.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("snapshot"));
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> std::io::Result<()> {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn fsync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
