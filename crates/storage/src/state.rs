use std::sync::Arc;

use prep_core::model::{CatalogState, Difficulty, StateKey};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::{KeyValueStore, Storage, StorageError};

/// Typed view over the key/value store for [`CatalogState`].
///
/// Each [`StateKey`] is stored as its own JSON document. Reads never fail:
/// a missing or unreadable slot keeps its default. Writes are best-effort
/// and only logged on failure.
#[derive(Clone)]
pub struct StateStore {
    kv: Arc<dyn KeyValueStore>,
}

impl StateStore {
    #[must_use]
    pub fn new(storage: &Storage) -> Self {
        Self {
            kv: Arc::clone(&storage.kv),
        }
    }

    /// Rebuild the persisted state, slot by slot.
    pub async fn load(&self) -> CatalogState {
        let mut state = CatalogState::default();
        for key in StateKey::ALL {
            let raw = match self.kv.get(key.as_str()).await {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(key = key.as_str(), error = %err, "state read failed, using default");
                    continue;
                }
            };
            if let Err(err) = decode_into(key, &raw, &mut state) {
                tracing::warn!(key = key.as_str(), error = %err, "discarding unreadable persisted value");
            }
        }
        tracing::debug!(
            revised = state.revised.len(),
            solved = state.solved.len(),
            premium = state.premium.len(),
            page = state.page,
            "catalog state loaded"
        );
        state
    }

    /// Persist `keys` from `state`. Failures are logged and skipped.
    pub async fn save(&self, keys: &[StateKey], state: &CatalogState) {
        for &key in keys {
            if let Err(err) = self.try_save(key, state).await {
                tracing::warn!(key = key.as_str(), error = %err, "state write failed");
            }
        }
    }

    /// Persist one slot, reporting the failure.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be encoded or written.
    pub async fn try_save(&self, key: StateKey, state: &CatalogState) -> Result<(), StorageError> {
        match encode(key, state)? {
            Some(value) => self.kv.set(key.as_str(), &value).await,
            None => self.kv.remove(key.as_str()).await,
        }
    }
}

/// JSON for one slot; `None` means the slot should be absent.
fn encode(key: StateKey, state: &CatalogState) -> Result<Option<String>, StorageError> {
    let json = match key {
        StateKey::RevisedMap => to_json(&state.revised),
        StateKey::SolvedMap => to_json(&state.solved),
        StateKey::PremiumMap => to_json(&state.premium),
        StateKey::SelectedCompanies => to_json(&state.selection.companies),
        StateKey::SelectedTopics => to_json(&state.selection.topics),
        StateKey::SelectedDifficulties => to_json(&state.selection.difficulties),
        StateKey::HidePremium => to_json(&state.selection.hide_premium),
        StateKey::PremiumCheckComplete => to_json(&state.premium_check),
        StateKey::SearchQuery => to_json(&state.selection.search_query),
        StateKey::CurrentPage => to_json(&state.page),
        StateKey::SortConfig => to_json(&state.sort),
        StateKey::Credentials => return state.credentials.as_ref().map(to_json).transpose(),
        StateKey::Username => return state.username.as_ref().map(to_json).transpose(),
    }?;
    Ok(Some(json))
}

fn decode_into(key: StateKey, raw: &str, state: &mut CatalogState) -> Result<(), serde_json::Error> {
    match key {
        StateKey::RevisedMap => state.revised = from_json(raw)?,
        StateKey::SolvedMap => state.solved = from_json(raw)?,
        StateKey::PremiumMap => state.premium = from_json(raw)?,
        StateKey::SelectedCompanies => state.selection.companies = from_json(raw)?,
        StateKey::SelectedTopics => state.selection.topics = from_json(raw)?,
        StateKey::SelectedDifficulties => {
            let stored: Vec<Difficulty> = from_json(raw)?;
            state.selection.difficulties = stored.into_iter().filter(|d| d.is_known()).collect();
        }
        StateKey::HidePremium => state.selection.hide_premium = from_json(raw)?,
        StateKey::PremiumCheckComplete => state.premium_check = from_json(raw)?,
        StateKey::SearchQuery => state.selection.search_query = from_json(raw)?,
        StateKey::CurrentPage => state.page = from_json::<usize>(raw)?.max(1),
        StateKey::SortConfig => state.sort = from_json(raw)?,
        StateKey::Credentials => state.credentials = Some(from_json(raw)?),
        StateKey::Username => state.username = Some(from_json(raw)?),
    }
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|err| StorageError::Serialization(err.to_string()))
}

fn from_json<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(raw)
}
