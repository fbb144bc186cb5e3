//! Discovery by date and by keyword
//!
//! Keyword search is a plain substring scan over every conference and
//! session; large stores are scanned in parallel.

use rayon::prelude::*;

use super::ConferenceCentral;
use crate::error::{ConferenceError, ConferenceResult};
use crate::query::{FilterValue, Operator, QueryExecutor, QueryPlan, SessionField};
use crate::types::{Conference, Session};
use crate::utils::parse_date;

/// Threshold for using parallel search (entities count)
const PARALLEL_SEARCH_THRESHOLD: usize = 1000;

/// Conferences and sessions found together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discovered {
    pub conferences: Vec<Conference>,
    pub sessions: Vec<Session>,
}

/// Conferences running on `date` and sessions held on it
pub fn by_date(central: &ConferenceCentral, date: &str) -> ConferenceResult<Discovered> {
    let date = parse_date(date)?;

    let mut conferences: Vec<Conference> = central
        .store
        .query_kind::<Conference>()
        .into_iter()
        .filter(|c| c.runs_on(date))
        .collect();
    conferences.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.key.cmp(&b.key)));

    let plan = QueryPlan::builder()
        .filter(SessionField::Date, Operator::Eq, FilterValue::Date(date))?
        .build();
    let sessions = QueryExecutor::new(&central.store)
        .run::<_, Session>(&plan)
        .collect();

    Ok(Discovered { conferences, sessions })
}

/// Conferences whose name, description or topics contain `keyword`, and
/// sessions whose name, highlights or conference name do
pub fn by_keyword(central: &ConferenceCentral, keyword: &str) -> ConferenceResult<Discovered> {
    if keyword.is_empty() {
        return Err(ConferenceError::bad_request("Keyword required"));
    }

    let conferences = scan(central.store.query_kind::<Conference>(), |c: &Conference| {
        c.name.contains(keyword)
            || c.description.as_deref().is_some_and(|d| d.contains(keyword))
            || c.topics.iter().any(|t| t.contains(keyword))
    });

    let sessions = scan(central.store.query_kind::<Session>(), |s: &Session| {
        s.session_name.contains(keyword)
            || s.highlights.as_deref().is_some_and(|h| h.contains(keyword))
            || s.conference_belong_to.contains(keyword)
    });

    Ok(Discovered { conferences, sessions })
}

fn scan<T, P>(items: Vec<T>, predicate: P) -> Vec<T>
where
    T: Send,
    P: Fn(&T) -> bool + Sync,
{
    if items.len() > PARALLEL_SEARCH_THRESHOLD {
        items.into_par_iter().filter(|item| predicate(item)).collect()
    } else {
        items.into_iter().filter(|item| predicate(item)).collect()
    }
}
