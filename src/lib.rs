//! Conference Central
//!
//! A conference-management backend: organizers publish conferences and
//! sessions, attendees register and keep session wishlists, and anyone can
//! query conferences and sessions with dynamic filters.
//!
//! # Features
//!
//! - **Transactional registration**: seats and attendance sets change together
//! - **Dynamic queries**: client filters compiled into validated query plans
//! - **Entity store**: hierarchical keys, ancestor queries, optimistic transactions
//! - **Persistence**: optional JSONL snapshot rewritten atomically on commit
//! - **HTTP API**: JSON endpoints with bearer-token identity
//!
//! # Modules
//!
//! - `types`: Entities, keys and request/response forms
//! - `store`: Entity store with transactions and snapshot persistence
//! - `query`: Filter compiler and query executor
//! - `central`: Registration, wishlists, conferences, sessions, discovery
//! - `announcements`: Cached announcement and featured speaker messages
//! - `notify`: Fire-and-forget email queue
//! - `auth`: JWT identity
//! - `api`: Axum router and handlers
//! - `config`: Environment configuration
//!
//! # Example
//!
//! ```no_run
//! use conference_central::{ConferenceCentral, EntityStore, UserIdentity};
//! use conference_central::types::ConferenceForm;
//!
//! let central = ConferenceCentral::new(EntityStore::new());
//! let organizer = UserIdentity::new("org-1", "org@example.com", "Org");
//! let form = ConferenceForm {
//!     name: Some("RustConf".to_string()),
//!     max_attendees: Some(100),
//!     ..Default::default()
//! };
//! let conference = central.create_conference(&organizer, &form).unwrap();
//!
//! let attendee = UserIdentity::new("user-1", "user@example.com", "User");
//! central.register(&attendee, &conference.key).unwrap();
//! ```

pub mod announcements;
pub mod api;
pub mod auth;
pub mod central;
pub mod config;
pub mod error;
pub mod notify;
pub mod query;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use auth::UserIdentity;
pub use central::{ConferenceCentral, Discovered, RegistrationOutcome};
pub use error::{ConferenceError, ConferenceResult};
pub use query::{compile_filters, execute, QueryPlan, RawFilter};
pub use store::{EntityStore, TransactionOptions};
pub use types::{Conference, EntityKey, Kind, Profile, Session, WishlistEntry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
