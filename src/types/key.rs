//! Hierarchical entity keys
//!
//! A key names its kind, its id and (optionally) its parent key. The root of
//! the parent chain is the key's entity group. Keys render as
//! `Profile:~alice/Conference:7`: numeric ids print bare, string ids print
//! percent-encoded behind a `~`. The websafe form percent-encodes the whole
//! rendering so it survives as a single URL path segment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConferenceError, ConferenceResult};

/// Entity kinds known to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    Profile,
    Conference,
    Session,
    Wishlist,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Profile => "Profile",
            Kind::Conference => "Conference",
            Kind::Session => "Session",
            Kind::Wishlist => "Wishlist",
        }
    }
}

impl FromStr for Kind {
    type Err = ConferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Profile" => Ok(Kind::Profile),
            "Conference" => Ok(Kind::Conference),
            "Session" => Ok(Kind::Session),
            "Wishlist" => Ok(Kind::Wishlist),
            other => Err(ConferenceError::bad_request(format!("Unknown entity kind '{}'", other))),
        }
    }
}

/// Either a store-allocated numeric id or a caller-chosen name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyId {
    Id(u64),
    Name(String),
}

/// Key of a stored entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityKey {
    kind: Kind,
    id: KeyId,
    parent: Option<Box<EntityKey>>,
}

impl EntityKey {
    /// Root key with a caller-chosen name
    pub fn named(kind: Kind, name: impl Into<String>) -> Self {
        Self {
            kind,
            id: KeyId::Name(name.into()),
            parent: None,
        }
    }

    /// Root key with a numeric id
    pub fn with_id(kind: Kind, id: u64) -> Self {
        Self {
            kind,
            id: KeyId::Id(id),
            parent: None,
        }
    }

    /// Profile keys are named by the stable user id
    pub fn profile(user_id: &str) -> Self {
        Self::named(Kind::Profile, user_id)
    }

    /// Child key with a numeric id under `self`
    pub fn child(&self, kind: Kind, id: u64) -> Self {
        Self {
            kind,
            id: KeyId::Id(id),
            parent: Some(Box::new(self.clone())),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn id(&self) -> &KeyId {
        &self.id
    }

    pub fn parent(&self) -> Option<&EntityKey> {
        self.parent.as_deref()
    }

    /// Root of the parent chain, i.e. the entity group
    pub fn root(&self) -> &EntityKey {
        let mut current = self;
        while let Some(parent) = current.parent.as_deref() {
            current = parent;
        }
        current
    }

    /// The string id, if this key was created by name
    pub fn name(&self) -> Option<&str> {
        match &self.id {
            KeyId::Name(name) => Some(name),
            KeyId::Id(_) => None,
        }
    }

    /// Fail with `BadRequest` unless the key is of the expected kind
    pub fn expect_kind(&self, kind: Kind) -> ConferenceResult<()> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(ConferenceError::bad_request(format!(
                "Expected a {} key, got '{}'",
                kind.as_str(),
                self
            )))
        }
    }

    /// Percent-encoded rendering safe to embed in a URL path segment
    pub fn to_websafe(&self) -> String {
        urlencoding::encode(&self.to_string()).into_owned()
    }

    /// Parse either the websafe form or the plain rendering
    pub fn from_websafe(value: &str) -> ConferenceResult<Self> {
        let invalid = || ConferenceError::bad_request(format!("Invalid websafe key '{}'", value));

        // A plain rendering always contains ':'; the websafe form never does
        if value.contains(':') {
            value.parse()
        } else {
            let decoded = urlencoding::decode(value).map_err(|_| invalid())?;
            decoded.parse().map_err(|_| invalid())
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{}/", parent)?;
        }
        match &self.id {
            KeyId::Id(id) => write!(f, "{}:{}", self.kind.as_str(), id),
            KeyId::Name(name) => write!(f, "{}:~{}", self.kind.as_str(), urlencoding::encode(name)),
        }
    }
}

impl FromStr for EntityKey {
    type Err = ConferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConferenceError::bad_request(format!("Invalid entity key '{}'", s));
        if s.is_empty() {
            return Err(invalid());
        }

        let mut key: Option<EntityKey> = None;
        for segment in s.split('/') {
            let (kind, id) = segment.split_once(':').ok_or_else(invalid)?;
            let kind: Kind = kind.parse()?;
            let id = match id.strip_prefix('~') {
                Some(name) => {
                    let name = urlencoding::decode(name).map_err(|_| invalid())?;
                    if name.is_empty() {
                        return Err(invalid());
                    }
                    KeyId::Name(name.into_owned())
                }
                None => KeyId::Id(id.parse().map_err(|_| invalid())?),
            };
            key = Some(EntityKey {
                kind,
                id,
                parent: key.map(Box::new),
            });
        }

        key.ok_or_else(invalid)
    }
}

impl TryFrom<String> for EntityKey {
    type Error = ConferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityKey> for String {
    fn from(key: EntityKey) -> Self {
        key.to_string()
    }
}
