use serde::{Deserialize, Serialize};

/// Runtime state of one index, owned by the index service through a per-index handle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexState {
    /// Thread holding the index messages, once found or created.
    pub index_thread_id: Option<u64>,
    /// Chunks of the last fully successful resync.
    pub last_chunks: Vec<String>,
}

impl IndexState {
    pub fn from_fingerprint(last_chunks: Vec<String>) -> Self {
        Self {
            index_thread_id: None,
            last_chunks,
        }
    }
}

/// Part of `IndexState` persisted in the config file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedIndexState {
    #[serde(default)]
    pub last_chunks: Vec<String>,
}
