//! Entity Store
//!
//! In-process key/value store for conference entities with:
//! - get/put by key and store-allocated numeric ids
//! - kind scans and ancestor queries backed by a parent → children index
//! - optimistic transactions over one or many entity groups
//! - optional JSONL snapshot persistence

mod persist;
mod transaction;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::error::{ConferenceError, ConferenceResult};
use crate::types::{Conference, Entity, EntityKey, KeyId, Kind, Profile, Session, WishlistEntry};
use crate::utils::atomic::cleanup_temp_file;

pub use transaction::{Transaction, TransactionOptions, MAX_CROSS_GROUP_ENTITY_GROUPS};

/// Retries granted to a transaction whose commit collided
pub const DEFAULT_TRANSACTION_RETRIES: usize = 3;

/// A typed view over one variant of [`Entity`]
pub trait Model: Clone {
    const KIND: Kind;

    fn key(&self) -> &EntityKey;

    fn into_entity(self) -> Entity;

    fn from_entity(entity: &Entity) -> Option<&Self>;
}

macro_rules! impl_model {
    ($ty:ty, $variant:ident) => {
        impl Model for $ty {
            const KIND: Kind = Kind::$variant;

            fn key(&self) -> &EntityKey {
                &self.key
            }

            fn into_entity(self) -> Entity {
                Entity::$variant(self)
            }

            fn from_entity(entity: &Entity) -> Option<&Self> {
                match entity {
                    Entity::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_model!(Profile, Profile);
impl_model!(Conference, Conference);
impl_model!(Session, Session);
impl_model!(WishlistEntry, Wishlist);

/// A stored entity and its commit version (first write is version 1)
#[derive(Debug, Clone)]
pub(crate) struct Record {
    pub version: u64,
    pub entity: Entity,
}

#[derive(Debug, Default)]
struct Tables {
    records: BTreeMap<EntityKey, Record>,
    /// parent key → direct child keys
    children: HashMap<EntityKey, BTreeSet<EntityKey>>,
}

impl Tables {
    fn version(&self, key: &EntityKey) -> u64 {
        self.records.get(key).map(|r| r.version).unwrap_or(0)
    }

    fn insert(&mut self, key: EntityKey, record: Record) -> Option<Record> {
        if let Some(parent) = key.parent() {
            self.children
                .entry(parent.clone())
                .or_default()
                .insert(key.clone());
        }
        self.records.insert(key, record)
    }

    fn remove(&mut self, key: &EntityKey) {
        self.records.remove(key);
        if let Some(parent) = key.parent() {
            if let Some(set) = self.children.get_mut(parent) {
                set.remove(key);
                if set.is_empty() {
                    self.children.remove(parent);
                }
            }
        }
    }

    /// `ancestor` itself plus every descendant, depth first
    fn descendants(&self, ancestor: &EntityKey) -> Vec<&EntityKey> {
        let mut found = Vec::new();
        let mut stack = vec![ancestor];
        while let Some(key) = stack.pop() {
            if let Some((stored, _)) = self.records.get_key_value(key) {
                found.push(stored);
            }
            if let Some(children) = self.children.get(key) {
                stack.extend(children.iter().rev());
            }
        }
        found
    }
}

/// The conference entity store
pub struct EntityStore {
    tables: RwLock<Tables>,
    next_id: AtomicU64,
    snapshot_path: Option<PathBuf>,
    default_retries: usize,
}

impl EntityStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            next_id: AtomicU64::new(1),
            snapshot_path: None,
            default_retries: DEFAULT_TRANSACTION_RETRIES,
        }
    }

    /// Open a store persisted at `path`, loading the snapshot if one exists
    pub fn open<P: AsRef<Path>>(path: P) -> ConferenceResult<Self> {
        let path = path.as_ref().to_path_buf();

        if cleanup_temp_file(&path)? {
            warn!(path = %path.display(), "Removed leftover temp file from an interrupted snapshot");
        }

        let mut tables = Tables::default();
        let mut max_id = 0;
        for stored in persist::load_snapshot(&path)? {
            let key = stored.entity.key().clone();
            max_id = max_id.max(max_numeric_id(&key));
            tables.insert(
                key,
                Record {
                    version: stored.version,
                    entity: stored.entity,
                },
            );
        }

        info!(
            path = %path.display(),
            entities = tables.records.len(),
            "Loaded entity store snapshot"
        );

        Ok(Self {
            tables: RwLock::new(tables),
            next_id: AtomicU64::new(max_id + 1),
            snapshot_path: Some(path),
            default_retries: DEFAULT_TRANSACTION_RETRIES,
        })
    }

    /// Set how many times a colliding transaction is re-run
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.default_retries = retries;
        self
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Reserve a fresh numeric id, unique across the store
    pub fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.tables.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch one entity by key
    pub fn get<M: Model>(&self, key: &EntityKey) -> Option<M> {
        let tables = self.tables.read();
        tables
            .records
            .get(key)
            .and_then(|r| M::from_entity(&r.entity))
            .cloned()
    }

    /// Fetch several entities; order matches `keys`
    pub fn get_many<M: Model>(&self, keys: &[EntityKey]) -> Vec<Option<M>> {
        let tables = self.tables.read();
        keys.iter()
            .map(|key| {
                tables
                    .records
                    .get(key)
                    .and_then(|r| M::from_entity(&r.entity))
                    .cloned()
            })
            .collect()
    }

    /// Write one entity atomically, outside any transaction
    pub fn put<M: Model>(&self, model: M) -> ConferenceResult<EntityKey> {
        let key = model.key().clone();
        let mut writes = BTreeMap::new();
        writes.insert(key.clone(), model.into_entity());
        self.commit_writes(&HashMap::new(), writes)?;
        Ok(key)
    }

    /// Every entity of kind `M`, in key order
    pub fn query_kind<M: Model>(&self) -> Vec<M> {
        let tables = self.tables.read();
        tables
            .records
            .values()
            .filter_map(|r| M::from_entity(&r.entity))
            .cloned()
            .collect()
    }

    /// Entities of kind `M` at or below `ancestor`
    pub fn query_ancestor<M: Model>(&self, ancestor: &EntityKey) -> Vec<M> {
        self.query_ancestor_versioned(ancestor)
            .into_iter()
            .map(|(_, model)| model)
            .collect()
    }

    /// Run `body` in a transaction, re-running it when the commit collides
    ///
    /// Errors returned by `body` abort immediately without retry; only commit
    /// collisions are retried, up to the configured retry count.
    pub fn run_in_transaction<T, F>(&self, options: TransactionOptions, mut body: F) -> ConferenceResult<T>
    where
        F: FnMut(&mut Transaction<'_>) -> ConferenceResult<T>,
    {
        let retries = options.retries.unwrap_or(self.default_retries);
        let mut attempt = 0;

        loop {
            let mut tx = Transaction::new(self, options);
            let value = body(&mut tx)?;

            match tx.commit() {
                Ok(()) => return Ok(value),
                Err(ConferenceError::Conflict(reason)) if attempt < retries => {
                    attempt += 1;
                    debug!(attempt, retries, %reason, "Transaction collided, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub(crate) fn read_versioned(&self, key: &EntityKey) -> (u64, Option<Entity>) {
        let tables = self.tables.read();
        match tables.records.get(key) {
            Some(record) => (record.version, Some(record.entity.clone())),
            None => (0, None),
        }
    }

    pub(crate) fn query_ancestor_versioned<M: Model>(&self, ancestor: &EntityKey) -> Vec<(u64, M)> {
        let tables = self.tables.read();
        tables
            .descendants(ancestor)
            .into_iter()
            .filter(|key| key.kind() == M::KIND)
            .filter_map(|key| {
                let record = tables.records.get(key)?;
                M::from_entity(&record.entity).map(|m| (record.version, m.clone()))
            })
            .collect()
    }

    /// Validate the read set and apply the writes as one unit
    pub(crate) fn commit_writes(
        &self,
        reads: &HashMap<EntityKey, u64>,
        writes: BTreeMap<EntityKey, Entity>,
    ) -> ConferenceResult<()> {
        let mut tables = self.tables.write();

        for (key, seen) in reads {
            if tables.version(key) != *seen {
                return Err(ConferenceError::conflict(format!(
                    "Transaction collision on '{}', please retry",
                    key
                )));
            }
        }

        if writes.is_empty() {
            return Ok(());
        }

        let mut undo: Vec<(EntityKey, Option<Record>)> = Vec::with_capacity(writes.len());
        for (key, entity) in writes {
            let version = tables.version(&key) + 1;
            let previous = tables.insert(key.clone(), Record { version, entity });
            undo.push((key, previous));
        }

        if let Some(path) = &self.snapshot_path {
            if let Err(e) = persist::write_snapshot(path, &tables.records) {
                warn!(path = %path.display(), error = %e, "Snapshot write failed, rolling back commit");
                for (key, previous) in undo.into_iter().rev() {
                    match previous {
                        Some(record) => {
                            tables.insert(key, record);
                        }
                        None => tables.remove(&key),
                    }
                }
                return Err(e);
            }
        }

        Ok(())
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

fn max_numeric_id(key: &EntityKey) -> u64 {
    let mut max = 0;
    let mut current = Some(key);
    while let Some(k) = current {
        if let KeyId::Id(id) = k.id() {
            max = max.max(*id);
        }
        current = k.parent();
    }
    max
}
