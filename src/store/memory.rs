use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use super::Store;
use super::snapshot::{Loaded, Persister, SnapshotDoc};
use super::state::State;
use super::tags::DEFAULT_TAGS;
use crate::error::{Error, Result};
use crate::types::*;

/// In-memory record store with secondary indexes and an optional snapshot
/// file.
///
/// A single readers-writer lock covers all tables and indexes. Every
/// mutation copies the state into a version-stamped snapshot while it holds
/// the write lock and writes that snapshot to disk after releasing it.
pub struct MemoryStore {
    state: RwLock<State>,
    persister: Option<Persister>,
}

impl MemoryStore {
    /// A store that never touches the filesystem.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(State::default()),
            persister: None,
        }
    }

    /// Opens a store backed by the snapshot file at `path`. A missing or
    /// unparsable file yields an empty store rather than an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let persister = Persister::new(path)?;

        let state = match persister.load()? {
            Loaded::Doc(doc) => {
                let state = State::from_snapshot(doc);
                info!(
                    users = state.users.len(),
                    shaders = state.shaders.len(),
                    tags = state.tags.len(),
                    "Restored snapshot from {}",
                    persister.path().display()
                );
                state
            }
            Loaded::Missing => {
                info!("No snapshot at {}, starting empty", persister.path().display());
                State::default()
            }
            Loaded::Corrupt => State::default(),
        };

        Ok(Self {
            state: RwLock::new(state),
            persister: Some(persister),
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Creates the default tag vocabulary in a single mutation.
    pub fn seed_default_tags(&self) -> Result<Vec<Tag>> {
        self.mutate("seed_default_tags", |state| {
            state.normalize_tags(DEFAULT_TAGS)
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> SnapshotDoc {
        self.read().to_snapshot()
    }

    /// Replaces the whole state with `doc` and persists the result.
    pub fn restore(&self, doc: SnapshotDoc) -> Result<()> {
        self.mutate("restore", |state| {
            let version = state.version.max(doc.version);
            *state = State::from_snapshot(doc);
            state.version = version;
            Ok(())
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `op` under the write lock, then persists the resulting state.
    ///
    /// A failed write is logged, not returned: the in-memory change is
    /// already visible to other callers.
    fn mutate<T, F>(&self, operation: &'static str, op: F) -> Result<T>
    where
        F: FnOnce(&mut State) -> Result<T>,
    {
        let (value, pending) = {
            let mut state = self.write();
            let value = op(&mut state)?;
            state.version += 1;
            let pending = self.persister.as_ref().map(|_| state.to_snapshot());
            (value, pending)
        };

        if let (Some(persister), Some(doc)) = (&self.persister, pending) {
            if let Err(e) = persister.write(&doc) {
                warn!(operation, version = doc.version, "Failed to persist snapshot: {e}");
            }
        }

        Ok(value)
    }
}

impl Store for MemoryStore {
    // User operations

    fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        self.mutate("create_user", |state| {
            state.insert_user(username, password_hash)
        })
    }

    fn get_user(&self, id: UserId) -> Result<User> {
        self.read().user(id).cloned().ok_or(Error::NotFound)
    }

    fn get_user_by_username(&self, username: &str) -> Result<User> {
        self.read()
            .user_by_name(username)
            .cloned()
            .ok_or(Error::NotFound)
    }

    // Shader operations

    fn create_shader(&self, shader: NewShader) -> Result<Shader> {
        self.mutate("create_shader", |state| state.insert_shader(shader))
    }

    fn update_shader(&self, id: ShaderId, caller: UserId, update: ShaderUpdate) -> Result<Shader> {
        self.mutate("update_shader", |state| {
            state.apply_update(id, caller, update)
        })
    }

    fn delete_shader(&self, id: ShaderId, caller: UserId) -> Result<()> {
        self.mutate("delete_shader", |state| {
            state.remove_shader(id, caller).map(|_| ())
        })
    }

    fn get_shader(&self, id: ShaderId) -> Result<ShaderListing> {
        let state = self.read();
        state
            .shaders
            .get(&id)
            .map(|shader| state.listing(shader))
            .ok_or(Error::NotFound)
    }

    fn list_user_shaders(&self, owner: UserId) -> Result<Vec<ShaderListing>> {
        let state = self.read();
        Ok(state
            .shaders_owned_by(owner)
            .iter()
            .map(|shader| state.listing(shader))
            .collect())
    }

    fn search(&self, query: &ShaderQuery) -> Result<SearchPage> {
        Ok(self.read().search(query))
    }

    // Tag operations

    fn create_tag(&self, name: &str) -> Result<Tag> {
        self.mutate("create_tag", |state| state.normalize_tag(name))
    }

    fn list_tags(&self) -> Result<Vec<TagSummary>> {
        Ok(self.read().tag_summaries())
    }

    fn flush(&self) -> Result<()> {
        let Some(persister) = &self.persister else {
            return Ok(());
        };
        let doc = self.snapshot();
        persister.write(&doc)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn shader(owner_id: UserId, name: &str, tags: &[&str]) -> NewShader {
        NewShader {
            owner_id,
            name: name.to_string(),
            scripts: Vec::new(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    #[test]
    fn test_mutations_are_persisted() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("shaderhub.json");

        let store = MemoryStore::open(&path).unwrap();
        assert!(store.is_empty());
        store.create_user("ada", "hash").unwrap();
        let created = store.create_shader(shader(1, "Red", &["Fragment"])).unwrap();
        drop(store);

        let reopened = MemoryStore::open(&path).unwrap();
        let fetched = reopened.get_shader(created.id).unwrap();
        assert_eq!(fetched.shader, created);
        assert_eq!(fetched.author, "ada");

        let next = reopened.create_shader(shader(1, "Blue", &[])).unwrap();
        assert_eq!(next.id, created.id + 1);
    }

    #[test]
    fn test_failed_validation_does_not_bump_version() {
        let store = MemoryStore::in_memory();
        store.create_user("ada", "hash").unwrap();
        let before = store.snapshot().version;

        assert!(store.create_user("ADA", "hash").is_err());
        assert_eq!(store.snapshot().version, before);
    }

    #[test]
    fn test_seed_default_tags_is_idempotent() {
        let store = MemoryStore::in_memory();
        let seeded = store.seed_default_tags().unwrap();
        assert_eq!(seeded.len(), DEFAULT_TAGS.len());

        store.seed_default_tags().unwrap();
        assert_eq!(store.list_tags().unwrap().len(), DEFAULT_TAGS.len());
        assert_eq!(store.create_tag("Vertex").unwrap().name, "vertex");
    }

    #[test]
    fn test_restore_replaces_state_and_keeps_version_monotonic() {
        let source = MemoryStore::in_memory();
        source.create_user("grace", "hash").unwrap();
        source.create_shader(shader(1, "Waves", &["vertex"])).unwrap();
        let doc = source.snapshot();

        let target = MemoryStore::in_memory();
        for i in 0..5 {
            target.create_tag(&format!("t{i}")).unwrap();
        }
        target.restore(doc.clone()).unwrap();

        assert!(target.snapshot().version > doc.version);
        assert_eq!(target.snapshot().shaders, doc.shaders);
        assert_eq!(target.list_tags().unwrap().len(), 1);
        assert!(target.get_user_by_username("GRACE").is_ok());
    }

    #[test]
    fn test_persist_failure_keeps_mutation() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("shaderhub.json");
        let store = MemoryStore::open(&path).unwrap();

        // A directory squatting on the temp file name makes every write fail.
        std::fs::create_dir(temp.path().join("shaderhub.json.tmp")).unwrap();

        let created = store.create_shader(shader(1, "Kept", &[])).unwrap();
        assert!(store.get_shader(created.id).is_ok());
        assert!(matches!(store.flush(), Err(Error::Persistence(_))));
    }
}
