//! Records - the contact rows held by the store.
//!
//! A [`Record`] carries six free-text business fields plus two store-owned
//! fields: the `id` assigned on insert and the `last_modified` [`Stamp`]
//! used as the optimistic-concurrency token.
//!
//! ## Example
//!
//! ```
//! use phonebook::Record;
//!
//! let amy = Record::new("Amy", "222")
//!     .with_email("amy@example.com")
//!     .with_city("Oslo");
//!
//! assert_eq!(amy.id, None);
//! assert_eq!(amy.key(), Some("222"));
//! ```

mod field;
mod validation;

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use field::{Field, FieldValue};
pub use validation::{ValidationError, ValidationRules};

/// Store-assigned record identifier.
pub type RecordId = u64;

/// Last-modified stamp, in microseconds since the Unix epoch.
///
/// Stamps are only ever compared for equality (conflict detection) and
/// ordering (freshness); they carry no business meaning.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Stamp(u64);

impl Stamp {
    pub const ZERO: Stamp = Stamp(0);

    pub const fn from_micros(micros: u64) -> Self {
        Stamp(micros)
    }

    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// The smallest stamp strictly greater than `self`.
    pub const fn next(self) -> Self {
        Stamp(self.0.saturating_add(1))
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

/// One contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Record {
    /// Absent until the record has been inserted.
    pub id: Option<RecordId>,
    pub name: String,
    /// Natural unique key. Empty phones are never indexed.
    pub phone: String,
    pub email: String,
    pub country: String,
    pub city: String,
    pub street: String,
    /// Set by the store on every write. Callers hand it back unchanged.
    pub last_modified: Option<Stamp>,
}

impl Record {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_street(mut self, street: impl Into<String>) -> Self {
        self.street = street.into();
        self
    }

    /// The index key, if this record has one.
    pub fn key(&self) -> Option<&str> {
        if self.phone.is_empty() {
            None
        } else {
            Some(self.phone.as_str())
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// True when every business field matches. `id` and `last_modified`
    /// are ignored.
    pub fn same_content(&self, other: &Record) -> bool {
        self.name == other.name
            && self.phone == other.phone
            && self.email == other.email
            && self.country == other.country
            && self.city == other.city
            && self.street == other.street
    }
}

/// Default listing order: name case-insensitively, empty names last, then id.
pub fn by_name(a: &Record, b: &Record) -> Ordering {
    match (a.name.is_empty(), b.name.is_empty()) {
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.id.cmp(&b.id))
}
