//! Wishlist join rows between profiles and sessions

use serde::{Deserialize, Serialize};

use super::EntityKey;

/// One (user, session) wishlist row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub key: EntityKey,
    pub user_key: EntityKey,
    pub session_key: EntityKey,
    pub user_name: String,
    pub session_name: String,
}
