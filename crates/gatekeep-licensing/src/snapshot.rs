//! Snapshot store adapters.

use async_trait::async_trait;
use gatekeep_core::ports::SnapshotStore;
use gatekeep_core::{Error, Result, Snapshot};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// File name of the entitlement document.
pub const USERS_FILE: &str = "users.json";

/// File name of the unredeemed key document.
pub const KEYS_FILE: &str = "keys.json";

/// Snapshot stored as two JSON documents: `users.json` and `keys.json`.
///
/// Both documents are written and synced to temporary siblings before either
/// is renamed into place, so a failed write leaves the previous snapshot
/// untouched. The users document is renamed first; a crash between the two
/// renames can leave a just-redeemed key in the pool but never loses an
/// entitlement.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    users_path: PathBuf,
    keys_path: PathBuf,
}

impl JsonFileStore {
    /// Store both documents in `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self::with_paths(dir.join(USERS_FILE), dir.join(KEYS_FILE))
    }

    pub fn with_paths(users_path: impl Into<PathBuf>, keys_path: impl Into<PathBuf>) -> Self {
        Self {
            users_path: users_path.into(),
            keys_path: keys_path.into(),
        }
    }

    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    pub fn keys_path(&self) -> &Path {
        &self.keys_path
    }
}

async fn read_document<K, V>(path: &Path) -> Result<BTreeMap<K, V>>
where
    K: Ord + DeserializeOwned,
    V: DeserializeOwned,
{
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Snapshot document missing, starting empty");
            return Ok(BTreeMap::new());
        }
        Err(e) => {
            return Err(Error::PersistenceFailure(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )));
        }
    };

    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    serde_json::from_str(&content).map_err(|e| {
        Error::PersistenceFailure(format!("invalid document {}: {}", path.display(), e))
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `document` next to `path` and sync it. Returns the temporary path.
async fn stage_document<T: Serialize>(path: &Path, document: &T) -> Result<PathBuf> {
    let content = serde_json::to_vec_pretty(document)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp_path = tmp_path(path);
    let mut file = tokio::fs::File::create(&tmp_path).await?;
    file.write_all(&content).await?;
    file.sync_all().await?;
    Ok(tmp_path)
}

async fn commit_document(tmp_path: &Path, path: &Path) -> Result<()> {
    tokio::fs::rename(tmp_path, path).await.map_err(|e| {
        Error::PersistenceFailure(format!("failed to replace {}: {}", path.display(), e))
    })
}

/// Best effort; a leftover temporary file is overwritten by the next save.
async fn discard_staged(tmp_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(tmp_path).await {
        debug!(path = %tmp_path.display(), error = %e, "Failed to remove staged document");
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<Snapshot> {
        let users = read_document(&self.users_path).await?;
        let keys = read_document(&self.keys_path).await?;
        Ok(Snapshot { users, keys })
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let users_tmp = stage_document(&self.users_path, &snapshot.users).await?;
        let keys_tmp = match stage_document(&self.keys_path, &snapshot.keys).await {
            Ok(tmp) => tmp,
            Err(e) => {
                discard_staged(&users_tmp).await;
                return Err(e);
            }
        };

        commit_document(&users_tmp, &self.users_path).await?;
        commit_document(&keys_tmp, &self.keys_path).await?;
        debug!(
            users = snapshot.users.len(),
            keys = snapshot.keys.len(),
            "Snapshot saved"
        );
        Ok(())
    }
}

/// In-process snapshot store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: RwLock<Snapshot>,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Make every subsequent save fail with a persistence error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Copy of the currently persisted snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<Snapshot> {
        Ok(self.snapshot())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            warn!("Memory store configured to fail saves");
            return Err(Error::PersistenceFailure("save rejected".to_string()));
        }
        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = snapshot.clone();
        Ok(())
    }
}
