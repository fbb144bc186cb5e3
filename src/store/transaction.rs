//! Optimistic multi-key transactions
//!
//! A transaction records the version of every key it reads (0 for a key that
//! did not exist) and buffers its writes. Commit takes the store's write lock,
//! checks that no read key changed version in the meantime, and applies all
//! writes at once. A changed version means another transaction committed first:
//! the commit fails with a `Conflict` and nothing is written.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use super::{EntityStore, Model};
use crate::error::{ConferenceError, ConferenceResult};
use crate::types::{Entity, EntityKey};

/// Most entity groups a cross-group transaction may touch
pub const MAX_CROSS_GROUP_ENTITY_GROUPS: usize = 25;

/// How a transaction may span entity groups and how often it is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOptions {
    pub cross_group: bool,
    /// Overrides the store's default retry count
    pub retries: Option<usize>,
}

impl TransactionOptions {
    /// Transaction confined to one entity group
    pub fn single_group() -> Self {
        Self {
            cross_group: false,
            retries: None,
        }
    }

    /// Transaction allowed to span up to [`MAX_CROSS_GROUP_ENTITY_GROUPS`] groups
    pub fn cross_group() -> Self {
        Self {
            cross_group: true,
            retries: None,
        }
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = Some(retries);
        self
    }

    fn group_limit(&self) -> usize {
        if self.cross_group {
            MAX_CROSS_GROUP_ENTITY_GROUPS
        } else {
            1
        }
    }
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self::single_group()
    }
}

/// An open transaction against an [`EntityStore`]
pub struct Transaction<'s> {
    store: &'s EntityStore,
    options: TransactionOptions,
    reads: HashMap<EntityKey, u64>,
    writes: BTreeMap<EntityKey, Entity>,
    groups: BTreeSet<EntityKey>,
}

impl<'s> Transaction<'s> {
    pub(crate) fn new(store: &'s EntityStore, options: TransactionOptions) -> Self {
        Self {
            store,
            options,
            reads: HashMap::new(),
            writes: BTreeMap::new(),
            groups: BTreeSet::new(),
        }
    }

    /// Read an entity, seeing this transaction's own pending writes
    pub fn get<M: Model>(&mut self, key: &EntityKey) -> ConferenceResult<Option<M>> {
        self.enlist(key)?;

        if let Some(entity) = self.writes.get(key) {
            return Ok(M::from_entity(entity).cloned());
        }

        let (version, entity) = self.store.read_versioned(key);
        self.reads.entry(key.clone()).or_insert(version);
        Ok(entity.as_ref().and_then(M::from_entity).cloned())
    }

    /// Buffer a write; it becomes visible to others only on commit
    pub fn put<M: Model>(&mut self, model: M) -> ConferenceResult<EntityKey> {
        let key = model.key().clone();
        self.enlist(&key)?;
        self.writes.insert(key.clone(), model.into_entity());
        Ok(key)
    }

    /// Entities of kind `M` under `ancestor`, recorded in the read set
    pub fn query_ancestor<M: Model>(&mut self, ancestor: &EntityKey) -> ConferenceResult<Vec<M>> {
        self.enlist(ancestor)?;

        let found = self.store.query_ancestor_versioned::<M>(ancestor);
        let mut results = Vec::with_capacity(found.len());
        for (version, model) in found {
            let key = model.key().clone();
            self.reads.entry(key.clone()).or_insert(version);
            match self.writes.get(&key) {
                Some(pending) => results.extend(M::from_entity(pending).cloned()),
                None => results.push(model),
            }
        }
        Ok(results)
    }

    /// Number of distinct entity groups touched so far
    pub fn entity_groups(&self) -> usize {
        self.groups.len()
    }

    pub(crate) fn commit(self) -> ConferenceResult<()> {
        debug!(
            reads = self.reads.len(),
            writes = self.writes.len(),
            groups = self.groups.len(),
            "Committing transaction"
        );
        self.store.commit_writes(&self.reads, self.writes)
    }

    fn enlist(&mut self, key: &EntityKey) -> ConferenceResult<()> {
        let root = key.root();
        if self.groups.contains(root) {
            return Ok(());
        }
        if self.groups.len() >= self.options.group_limit() {
            return Err(ConferenceError::Transaction(if self.options.cross_group {
                format!(
                    "cross-group transaction may touch at most {} entity groups",
                    MAX_CROSS_GROUP_ENTITY_GROUPS
                )
            } else {
                format!(
                    "key '{}' is outside the transaction's entity group; use a cross-group transaction",
                    key
                )
            }));
        }
        self.groups.insert(root.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::types::{Kind, Profile};

    fn profile(user: &str) -> Profile {
        Profile::new(user, user.to_string(), format!("{}@example.com", user))
    }

    #[test]
    fn test_single_group_rejects_second_group() {
        let store = EntityStore::new();
        let result = store.run_in_transaction(TransactionOptions::single_group(), |tx| {
            tx.put(profile("a"))?;
            tx.put(profile("b"))?;
            Ok(())
        });

        assert!(matches!(result, Err(ConferenceError::Transaction(_))));
        assert!(store.get::<Profile>(&EntityKey::profile("a")).is_none());
    }

    #[test]
    fn test_cross_group_commits_both() {
        let store = EntityStore::new();
        store
            .run_in_transaction(TransactionOptions::cross_group(), |tx| {
                tx.put(profile("a"))?;
                tx.put(profile("b"))?;
                Ok(())
            })
            .unwrap();

        assert!(store.get::<Profile>(&EntityKey::profile("a")).is_some());
        assert!(store.get::<Profile>(&EntityKey::profile("b")).is_some());
    }

    #[test]
    fn test_read_your_writes() {
        let store = EntityStore::new();
        let name = store
            .run_in_transaction(TransactionOptions::single_group(), |tx| {
                let mut p = profile("a");
                p.display_name = "Pending".to_string();
                tx.put(p)?;
                let seen: Option<Profile> = tx.get(&EntityKey::profile("a"))?;
                Ok(seen.map(|p| p.display_name))
            })
            .unwrap();

        assert_eq!(name.as_deref(), Some("Pending"));
    }

    #[test]
    fn test_stale_read_collides() {
        let store = EntityStore::new();
        store.put(profile("a")).unwrap();
        let key = EntityKey::profile("a");

        let mut tx = Transaction::new(&store, TransactionOptions::single_group());
        let mut seen: Profile = tx.get(&key).unwrap().unwrap();

        // Another writer commits in between
        let mut other = profile("a");
        other.display_name = "Other".to_string();
        store.put(other).unwrap();

        seen.display_name = "Mine".to_string();
        tx.put(seen).unwrap();
        assert!(matches!(tx.commit(), Err(ConferenceError::Conflict(_))));

        let stored: Profile = store.get(&key).unwrap();
        assert_eq!(stored.display_name, "Other");
    }

    #[test]
    fn test_absent_read_collides_with_insert() {
        let store = EntityStore::new();
        let key = EntityKey::profile("late");

        let mut tx = Transaction::new(&store, TransactionOptions::single_group());
        assert!(tx.get::<Profile>(&key).unwrap().is_none());
        store.put(profile("late")).unwrap();
        tx.put(profile("late")).unwrap();

        assert!(matches!(tx.commit(), Err(ConferenceError::Conflict(_))));
    }

    #[test]
    fn test_closure_error_writes_nothing() {
        let store = EntityStore::new();
        let result: ConferenceResult<()> =
            store.run_in_transaction(TransactionOptions::single_group(), |tx| {
                tx.put(profile("a"))?;
                Err(ConferenceError::conflict("precondition failed"))
            });

        assert!(result.is_err());
        assert!(store.get::<Profile>(&EntityKey::profile("a")).is_none());
    }

    #[test]
    fn test_entity_groups_follow_roots() {
        let store = EntityStore::new();
        let org = EntityKey::profile("org");
        let conf = org.child(Kind::Conference, 1);
        let mut tx = Transaction::new(&store, TransactionOptions::single_group());
        tx.get::<Profile>(&org).unwrap();
        tx.get::<Profile>(&conf).unwrap();
        assert_eq!(tx.entity_groups(), 1);
    }

    /// Body that renames profile "a", letting another writer win the first attempt
    fn rename_after_interference(
        store: &EntityStore,
        attempts: &Cell<usize>,
        tx: &mut Transaction<'_>,
    ) -> ConferenceResult<()> {
        attempts.set(attempts.get() + 1);
        let key = EntityKey::profile("a");
        let mut seen: Profile = tx.get(&key)?.ok_or_else(|| ConferenceError::not_found("a"))?;

        if attempts.get() == 1 {
            let mut other = seen.clone();
            other.display_name = "Other".to_string();
            store.put(other)?;
        }

        seen.display_name = format!("Mine {}", attempts.get());
        tx.put(seen)?;
        Ok(())
    }

    #[test]
    fn test_collision_is_retried_against_fresh_state() {
        let store = EntityStore::new();
        store.put(profile("a")).unwrap();
        let attempts = Cell::new(0);

        store
            .run_in_transaction(TransactionOptions::single_group(), |tx| {
                rename_after_interference(&store, &attempts, tx)
            })
            .unwrap();

        assert_eq!(attempts.get(), 2);
        let stored: Profile = store.get(&EntityKey::profile("a")).unwrap();
        assert_eq!(stored.display_name, "Mine 2");
    }

    #[test]
    fn test_collision_surfaces_when_retries_exhausted() {
        let store = EntityStore::new();
        store.put(profile("a")).unwrap();
        let attempts = Cell::new(0);

        let result = store.run_in_transaction(TransactionOptions::single_group().with_retries(0), |tx| {
            rename_after_interference(&store, &attempts, tx)
        });

        assert!(matches!(
            result,
            Err(ConferenceError::Conflict(ref msg)) if msg.starts_with("Transaction collision")
        ));
        assert_eq!(attempts.get(), 1);
        let stored: Profile = store.get(&EntityKey::profile("a")).unwrap();
        assert_eq!(stored.display_name, "Other");
    }

    #[test]
    fn test_store_default_retries_apply() {
        let store = EntityStore::new().with_retries(0);
        store.put(profile("a")).unwrap();
        let attempts = Cell::new(0);

        let result = store.run_in_transaction(TransactionOptions::single_group(), |tx| {
            rename_after_interference(&store, &attempts, tx)
        });

        assert!(matches!(result, Err(ConferenceError::Conflict(_))));
        assert_eq!(attempts.get(), 1);
    }
}
