// src/store.rs
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;

use crate::error::StoreError;

/// Path-scoped key/value parameter store holding the run watermark.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Direct children of `scope` (non-recursive), keyed by leaf name.
    async fn get_parameters_by_path(&self, scope: &str)
        -> Result<HashMap<String, String>, StoreError>;

    /// Create or overwrite the parameter with the full name `name`.
    async fn put_parameter(&self, name: &str, value: &str) -> Result<(), StoreError>;
}

/// Leaf name of `name` if it sits directly under `scope`. The scope includes
/// its trailing separator, so reads match the `scope + leaf` names written.
fn leaf_under<'a>(scope: &str, name: &'a str) -> Option<&'a str> {
    let rest = name.strip_prefix(scope)?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(rest)
}

fn children_of<'a, I>(scope: &str, entries: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    entries
        .into_iter()
        .filter_map(|(name, value)| {
            leaf_under(scope, name).map(|leaf| (leaf.to_string(), value.clone()))
        })
        .collect()
}

/// In-process store, used by tests and dry runs.
#[derive(Default)]
pub struct MemoryParameterStore {
    inner: Mutex<BTreeMap<String, String>>,
    writes: Mutex<Vec<(String, String)>>,
    fail_writes: bool,
}

impl MemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: &str, value: &str) -> Self {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Every `put_parameter` fails like an unwritable backend.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    /// Every `put_parameter` call, in order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    async fn get_parameters_by_path(
        &self,
        scope: &str,
    ) -> Result<HashMap<String, String>, StoreError> {
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(children_of(scope, map.iter()))
    }

    async fn put_parameter(&self, name: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Io {
                path: name.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), value.to_string());
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((name.to_string(), value.to_string()));
        Ok(())
    }
}

/// JSON object file of full parameter name -> value.
/// A missing file reads as an empty store.
pub struct FileParameterStore {
    path: PathBuf,
}

impl FileParameterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(s) if s.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(s) => serde_json::from_str(&s).map_err(|source| StoreError::Corrupt {
                path: self.display(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(StoreError::Io {
                path: self.display(),
                source,
            }),
        }
    }

    async fn save(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.display(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(io_err)?;
        }
        let bytes = serde_json::to_vec_pretty(map).map_err(|source| StoreError::Corrupt {
            path: self.display(),
            source,
        })?;

        // Temp file in the same dir, then rename over the original.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).await.map_err(io_err)?;
        fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl ParameterStore for FileParameterStore {
    async fn get_parameters_by_path(
        &self,
        scope: &str,
    ) -> Result<HashMap<String, String>, StoreError> {
        let map = self.load().await?;
        Ok(children_of(scope, map.iter()))
    }

    async fn put_parameter(&self, name: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.load().await?;
        map.insert(name.to_string(), value.to_string());
        self.save(&map).await
    }
}
