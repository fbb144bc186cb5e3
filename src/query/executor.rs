//! Query Executor
//!
//! Evaluates a compiled [`QueryPlan`] over a candidate set drawn from the
//! store, either every entity of a kind or everything under one ancestor.
//! Matching follows datastore conventions:
//! - a list attribute matches when any element does
//! - an entity without the filtered or sorted attribute is left out
//! - a list attribute sorts by its smallest element
//! - remaining ties are broken by entity key

use std::cmp::Ordering;

use super::filter::{FilterField, QueryPlan};
use super::value::FilterValue;
use crate::store::{EntityStore, Model};
use crate::types::EntityKey;

/// An entity that exposes typed values for the fields of `F`
pub trait Filterable<F: FilterField> {
    /// All values of `field`; empty when the attribute is absent
    fn values(&self, field: F) -> Vec<FilterValue>;
}

/// Run `plan` over `candidates`
pub fn execute<F, M>(candidates: Vec<M>, plan: &QueryPlan<F>) -> QueryIter<M>
where
    F: FilterField,
    M: Model + Filterable<F>,
{
    let mut matched: Vec<(Vec<FilterValue>, M)> = candidates
        .into_iter()
        .filter(|entity| matches_all(entity, plan))
        .filter_map(|entity| sort_key(&entity, plan.order()).map(|key| (key, entity)))
        .collect();

    matched.sort_by(|(a_key, a), (b_key, b)| match a_key.cmp(b_key) {
        Ordering::Equal => a.key().cmp(b.key()),
        other => other,
    });

    QueryIter {
        inner: matched
            .into_iter()
            .map(|(_, entity)| entity)
            .collect::<Vec<_>>()
            .into_iter(),
    }
}

fn matches_all<F, M>(entity: &M, plan: &QueryPlan<F>) -> bool
where
    F: FilterField,
    M: Filterable<F>,
{
    plan.predicates().iter().all(|predicate| {
        entity
            .values(predicate.field)
            .iter()
            .any(|value| predicate.operand.accepts(predicate.operator, value))
    })
}

fn sort_key<F, M>(entity: &M, order: &[F]) -> Option<Vec<FilterValue>>
where
    F: FilterField,
    M: Filterable<F>,
{
    order
        .iter()
        .map(|field| entity.values(*field).into_iter().min())
        .collect()
}

/// Results of one execution, in plan order
///
/// Materialized: ordering needs every match, so all results are filtered and
/// sorted before the first one is yielded. Later store writes do not show up;
/// executing the plan again re-reads the store.
#[derive(Debug)]
pub struct QueryIter<M> {
    inner: std::vec::IntoIter<M>,
}

impl<M> QueryIter<M> {
    /// Map each result to a projection, e.g. just its name
    pub fn project<T, P>(self, projection: P) -> Vec<T>
    where
        P: FnMut(M) -> T,
    {
        self.inner.map(projection).collect()
    }
}

impl<M> Iterator for QueryIter<M> {
    type Item = M;

    fn next(&mut self) -> Option<M> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<M> ExactSizeIterator for QueryIter<M> {}

/// Executes plans against an [`EntityStore`]
#[derive(Clone, Copy)]
pub struct QueryExecutor<'s> {
    store: &'s EntityStore,
}

impl<'s> QueryExecutor<'s> {
    pub fn new(store: &'s EntityStore) -> Self {
        Self { store }
    }

    /// Query every entity of kind `M`
    pub fn run<F, M>(&self, plan: &QueryPlan<F>) -> QueryIter<M>
    where
        F: FilterField,
        M: Model + Filterable<F>,
    {
        execute(self.store.query_kind::<M>(), plan)
    }

    /// Query entities of kind `M` under `ancestor`
    pub fn run_under<F, M>(&self, ancestor: &EntityKey, plan: &QueryPlan<F>) -> QueryIter<M>
    where
        F: FilterField,
        M: Model + Filterable<F>,
    {
        execute(self.store.query_ancestor::<M>(ancestor), plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::fields::{ConferenceField, SessionField};
    use crate::query::filter::{compile_filters, RawFilter};
    use crate::types::{Conference, Kind, Session};
    use chrono::NaiveTime;

    fn conference(id: u64, name: &str, city: &str, max: i64, topics: &[&str]) -> Conference {
        Conference {
            key: EntityKey::profile("org").child(Kind::Conference, id),
            name: name.to_string(),
            description: None,
            organizer_user_id: "org".to_string(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            city: city.to_string(),
            start_date: None,
            end_date: None,
            month: 0,
            max_attendees: max,
            seats_available: max,
        }
    }

    fn names(results: QueryIter<Conference>) -> Vec<String> {
        results.project(|c| c.name)
    }

    fn plan(raw: &[RawFilter]) -> QueryPlan<ConferenceField> {
        compile_filters(raw).unwrap()
    }

    #[test]
    fn test_equality_and_inequality_ordering() {
        let candidates = vec![
            conference(1, "A", "NYC", 50, &[]),
            conference(2, "B", "NYC", 20, &[]),
            conference(3, "C", "LA", 100, &[]),
        ];
        let plan = plan(&[
            RawFilter::new("CITY", "EQ", "NYC"),
            RawFilter::new("MAX_ATTENDEES", "GT", "10"),
        ]);

        assert_eq!(names(execute(candidates, &plan)), vec!["B", "A"]);
    }

    #[test]
    fn test_no_filters_orders_by_name() {
        let candidates = vec![
            conference(1, "Zeta", "X", 1, &[]),
            conference(2, "Alpha", "Y", 1, &[]),
            conference(3, "Mid", "Z", 1, &[]),
        ];
        let results = execute(candidates, &QueryPlan::<ConferenceField>::all());
        assert_eq!(results.len(), 3);
        assert_eq!(names(results), vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn test_topics_match_any_element() {
        let candidates = vec![
            conference(1, "Web", "X", 1, &["Web", "Frontend"]),
            conference(2, "Systems", "X", 1, &["Kernels"]),
        ];
        let plan = plan(&[RawFilter::new("TOPIC", "EQ", "Frontend")]);
        assert_eq!(names(execute(candidates, &plan)), vec!["Web"]);
    }

    #[test]
    fn test_not_equal_on_list_matches_any_other_element() {
        let candidates = vec![conference(1, "Web", "X", 1, &["Web", "Frontend"])];
        let plan = plan(&[RawFilter::new("TOPIC", "NE", "Web")]);
        assert_eq!(names(execute(candidates, &plan)), vec!["Web"]);
    }

    #[test]
    fn test_ties_break_by_name_then_key() {
        let candidates = vec![
            conference(9, "Same", "X", 10, &[]),
            conference(4, "Same", "X", 10, &[]),
            conference(5, "Other", "X", 10, &[]),
        ];
        let plan = plan(&[RawFilter::new("maxAttendees", ">=", "10")]);
        let keys: Vec<_> = execute(candidates, &plan).map(|c| c.key).collect();
        let ids: Vec<_> = keys.iter().map(|k| k.id().clone()).collect();
        assert_eq!(
            ids,
            vec![
                crate::types::KeyId::Id(5),
                crate::types::KeyId::Id(4),
                crate::types::KeyId::Id(9)
            ]
        );
    }

    #[test]
    fn test_missing_attribute_never_matches() {
        let conf_key = EntityKey::profile("org").child(Kind::Conference, 1);
        let base = Session {
            key: conf_key.child(Kind::Session, 2),
            session_name: "Timed".to_string(),
            highlights: None,
            speaker: None,
            duration: None,
            type_of_session: Some("lecture".to_string()),
            date: None,
            start_time: NaiveTime::from_hms_opt(10, 0, 0),
            organizer_user_id: "org".to_string(),
            conference_belong_to: "Conf".to_string(),
        };
        let untimed = Session {
            key: conf_key.child(Kind::Session, 3),
            session_name: "Untimed".to_string(),
            start_time: None,
            ..base.clone()
        };

        let plan: QueryPlan<SessionField> =
            compile_filters(&[RawFilter::new("STARTTIME", "LT", "23:00")]).unwrap();
        let results: Vec<_> = execute(vec![base, untimed], &plan).map(|s| s.session_name).collect();
        assert_eq!(results, vec!["Timed"]);
    }

    #[test]
    fn test_executor_reads_current_store_state() {
        let store = EntityStore::new();
        store.put(conference(1, "First", "Paris", 3, &[])).unwrap();
        let executor = QueryExecutor::new(&store);
        let plan = plan(&[RawFilter::new("CITY", "EQ", "Paris")]);

        assert_eq!(executor.run::<_, Conference>(&plan).len(), 1);
        store.put(conference(2, "Second", "Paris", 3, &[])).unwrap();
        assert_eq!(executor.run::<_, Conference>(&plan).len(), 2);
        assert_eq!(
            executor
                .run_under::<_, Conference>(&EntityKey::profile("nobody"), &plan)
                .len(),
            0
        );
    }

    #[test]
    fn test_results_are_fixed_at_execution() {
        let store = EntityStore::new();
        store.put(conference(1, "First", "Paris", 3, &[])).unwrap();
        let executor = QueryExecutor::new(&store);
        let plan = plan(&[RawFilter::new("CITY", "EQ", "Paris")]);

        let mut results = executor.run::<_, Conference>(&plan);
        store.put(conference(2, "Second", "Paris", 3, &[])).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results.next().map(|c| c.name), Some("First".to_string()));
        assert!(results.next().is_none());
    }
}
