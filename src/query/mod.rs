//! Dynamic queries over conferences and sessions
//!
//! `filter` validates client predicates into a [`QueryPlan`], `executor` runs
//! plans against the store.

pub mod executor;
pub mod fields;
pub mod filter;
pub mod session_query;
pub mod value;

pub use executor::{execute, Filterable, QueryExecutor, QueryIter};
pub use fields::{ConferenceField, SessionField};
pub use filter::{compile_filters, FilterField, Operand, Operator, PlanBuilder, Predicate, QueryPlan, RawFilter};
pub use session_query::sessions_excluding_type_before;
pub use value::{FilterValue, ValueType};
