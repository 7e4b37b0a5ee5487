use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::models::ThreadId;
use crate::store::KeyValueStore;

/// Persisted favorite thread ids
pub const FAVORITES_KEY: &str = "FAVORITES";

/// Persisted manually hidden thread ids
pub const HIDDEN_THREADS_KEY: &str = "HIDDEN_THREADS";

/// Pre-namespace favorites key, suffixed with the user id
pub const LEGACY_FAVORITES_PREFIX: &str = "FC_FAVORITE_THREADS_";

/// Typed access to a namespaced region of a key-value store.
///
/// Keys are stored as `<namespace>.<KEY>`; values are JSON.
#[derive(Debug)]
pub struct StateStore<S: KeyValueStore> {
    store: S,
    namespace: String,
}

impl<S: KeyValueStore> StateStore<S> {
    pub fn new(store: S, namespace: &str) -> Self {
        Self {
            store,
            namespace: namespace.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}.{}", self.namespace, key)
    }

    /// Raw stored value, if any
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.store.get_value(&self.scoped(key))
    }

    /// Decode the value under `key`, falling back to `default` when the key is
    /// missing or does not decode
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.get_raw(key) else {
            return default;
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring undecodable value for {}: {}", key, e);
                default
            }
        }
    }

    /// Text settings also accept a bare, non-JSON string
    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.get_raw(key) {
            Some(raw) => serde_json::from_str::<String>(&raw).unwrap_or(raw),
            None => default.to_string(),
        }
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => {
                let scoped = self.scoped(key);
                self.store.set_value(&scoped, &json);
                debug!("Persisted {}", scoped);
            }
            Err(e) => warn!("Failed to serialize {}: {}", key, e),
        }
    }

    pub fn delete(&mut self, key: &str) {
        let scoped = self.scoped(key);
        self.store.delete_value(&scoped);
    }

    /// Value stored outside the namespace
    pub fn get_global(&self, key: &str) -> Option<String> {
        self.store.get_value(key)
    }

    pub fn delete_global(&mut self, key: &str) {
        self.store.delete_value(key);
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

/// Working sets of the thread filter for one page view
#[derive(Debug)]
pub struct FilterState<S: KeyValueStore> {
    store: StateStore<S>,
    favorite_ids: BTreeSet<ThreadId>,
    hidden_ids: BTreeSet<ThreadId>,
    read_ids: BTreeSet<ThreadId>,
    hidden_count: usize,
}

impl<S: KeyValueStore> FilterState<S> {
    /// Load the persisted id sets, migrating legacy favorites for `user_id`
    pub fn load(mut store: StateStore<S>, user_id: Option<&str>) -> Self {
        if let Some(user_id) = user_id {
            migrate_legacy_favorites(&mut store, user_id);
        }

        let favorite_ids: BTreeSet<ThreadId> = store.get(FAVORITES_KEY, BTreeSet::new());
        let hidden_ids: BTreeSet<ThreadId> = store.get(HIDDEN_THREADS_KEY, BTreeSet::new());

        info!(
            "Loaded filter state: favorites={}, hidden={}",
            favorite_ids.len(),
            hidden_ids.len()
        );

        Self {
            store,
            favorite_ids,
            hidden_ids,
            read_ids: BTreeSet::new(),
            hidden_count: 0,
        }
    }

    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StateStore<S> {
        &mut self.store
    }

    pub fn is_favorite(&self, id: ThreadId) -> bool {
        self.favorite_ids.contains(&id)
    }

    pub fn is_hidden(&self, id: ThreadId) -> bool {
        self.hidden_ids.contains(&id)
    }

    pub fn favorite_ids(&self) -> &BTreeSet<ThreadId> {
        &self.favorite_ids
    }

    pub fn hidden_ids(&self) -> &BTreeSet<ThreadId> {
        &self.hidden_ids
    }

    pub fn read_ids(&self) -> &BTreeSet<ThreadId> {
        &self.read_ids
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden_count
    }

    /// Drop the per-page bookkeeping before another page is loaded
    pub fn reset_page(&mut self) {
        self.read_ids.clear();
        self.hidden_count = 0;
    }

    pub fn mark_read(&mut self, id: ThreadId) {
        self.read_ids.insert(id);
    }

    pub fn unmark_read(&mut self, id: ThreadId) {
        self.read_ids.remove(&id);
    }

    pub fn increment_hidden_count(&mut self) -> usize {
        self.hidden_count += 1;
        self.hidden_count
    }

    pub fn decrement_hidden_count(&mut self) -> usize {
        self.hidden_count = self.hidden_count.saturating_sub(1);
        self.hidden_count
    }

    /// Flip favorite membership and persist it. Returns the new membership.
    pub fn toggle_favorite(&mut self, id: ThreadId) -> bool {
        let now_favorite = if self.favorite_ids.remove(&id) {
            false
        } else {
            self.favorite_ids.insert(id);
            true
        };
        self.save_favorites();
        now_favorite
    }

    /// Hide a thread manually. A favorite loses its favorite status.
    pub fn add_hidden(&mut self, id: ThreadId) -> bool {
        if !self.hidden_ids.insert(id) {
            return false;
        }
        if self.favorite_ids.remove(&id) {
            debug!("Thread {} was a favorite, unmarking", id);
            self.save_favorites();
        }
        self.save_hidden();
        true
    }

    /// Un-hide a thread. Favorite status is not restored.
    pub fn remove_hidden(&mut self, id: ThreadId) -> bool {
        if !self.hidden_ids.remove(&id) {
            return false;
        }
        self.save_hidden();
        true
    }

    /// Flip manual-hide membership. Returns the new membership.
    pub fn toggle_hidden(&mut self, id: ThreadId) -> bool {
        if self.is_hidden(id) {
            self.remove_hidden(id);
            false
        } else {
            self.add_hidden(id);
            true
        }
    }

    fn save_favorites(&mut self) {
        self.store.set(FAVORITES_KEY, &self.favorite_ids);
    }

    fn save_hidden(&mut self) {
        self.store.set(HIDDEN_THREADS_KEY, &self.hidden_ids);
    }
}

/// Move favorites saved under the old global key into the namespace
fn migrate_legacy_favorites<S: KeyValueStore>(store: &mut StateStore<S>, user_id: &str) {
    let legacy_key = format!("{}{}", LEGACY_FAVORITES_PREFIX, user_id);
    let Some(legacy) = store.get_global(&legacy_key) else {
        return;
    };

    match serde_json::from_str::<BTreeSet<ThreadId>>(&legacy) {
        Ok(ids) => {
            info!("Migrating {} legacy favorites from {}", ids.len(), legacy_key);
            store.set(FAVORITES_KEY, &ids);
        }
        Err(e) => warn!("Dropping undecodable legacy favorites {}: {}", legacy_key, e),
    }
    store.delete_global(&legacy_key);
}
