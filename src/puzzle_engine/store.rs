//! Player model persistence through the host's key-value service.
//!
//! Loading and saving are the engine's only suspension points. Failures are
//! never propagated: a missing, unreadable or inconsistent blob yields a
//! fresh model, and a failed write is logged and dropped.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::puzzle_engine::{
    config::EngineConfig,
    error::{EngineError, Result},
    player_model::PlayerModel,
};

/// Key under which the model blob is stored unless the host picks another.
pub const DEFAULT_MODEL_KEY: &str = "sequence_puzzle.player_model";

/// Opaque async key-value store supplied by the host.
#[async_trait]
pub trait PersistenceService: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, value: String) -> Result<()>;
}

/// Loads and saves one learner's [`PlayerModel`].
pub struct PlayerModelStore<S> {
    service: S,
    key: String,
    window_size: usize,
}

impl<S: PersistenceService> PlayerModelStore<S> {
    pub fn new(service: S, config: &EngineConfig) -> Self {
        Self {
            service,
            key: DEFAULT_MODEL_KEY.to_string(),
            window_size: config.rolling_window_size,
        }
    }

    /// Store under a learner-specific key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Load the model, substituting a fresh one on any failure.
    #[instrument(skip_all, fields(key = %self.key))]
    pub async fn load(&self) -> PlayerModel {
        let blob = match self.service.get(&self.key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("No stored player model, starting fresh");
                return PlayerModel::new();
            }
            Err(e) => {
                warn!(error = %e, "Player model read failed, starting fresh");
                return PlayerModel::new();
            }
        };
        match decode(&blob, self.window_size) {
            Ok(model) => {
                debug!(families = model.per_family.len(), "Player model loaded");
                model
            }
            Err(e) => {
                warn!(error = %e, "Stored player model is corrupt, starting fresh");
                PlayerModel::new()
            }
        }
    }

    /// Persist the model. Returns whether the write succeeded.
    #[instrument(skip_all, fields(key = %self.key))]
    pub async fn save(&self, model: &PlayerModel) -> bool {
        let blob = match serde_json::to_string(model) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "Player model could not be encoded");
                return false;
            }
        };
        match self.service.put(&self.key, blob).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Player model write failed");
                false
            }
        }
    }
}

fn decode(blob: &str, window_size: usize) -> Result<PlayerModel> {
    let mut model: PlayerModel = serde_json::from_str(blob)?;
    if !model.is_consistent() {
        return Err(EngineError::persistence("counters are inconsistent"));
    }
    model.trim_windows(window_size);
    Ok(model)
}

/// `load_player_model(get)` over any service, default key.
pub async fn load_player_model<S: PersistenceService>(service: S, config: &EngineConfig) -> PlayerModel {
    PlayerModelStore::new(service, config).load().await
}

/// `save_player_model(put, model)` over any service, default key.
pub async fn save_player_model<S: PersistenceService>(
    service: S,
    config: &EngineConfig,
    model: &PlayerModel,
) -> bool {
    PlayerModelStore::new(service, config).save(model).await
}

/// Process-local store, for tests and hosts without storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok().and_then(|e| e.get(key).cloned())
    }
}

#[async_trait]
impl PersistenceService for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| EngineError::persistence("memory store poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| EngineError::persistence("memory store poisoned"))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl<T: PersistenceService + ?Sized> PersistenceService for &T {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        (**self).put(key, value).await
    }
}
