//! Query Engine - filter, sort and paginate records.
//!
//! A [`Query`] names fields by string, the way a grid column would. Names are
//! resolved against [`Field`](crate::Field) when the query is compiled, so an
//! unknown column fails with `InvalidField` before any record is read.
//!
//! ## Example
//!
//! ```
//! use phonebook::{Phonebook, PhonebookConfig, Query, Record};
//!
//! let book = Phonebook::seeded(
//!     PhonebookConfig::default(),
//!     vec![Record::new("Bob", "111"), Record::new("Amy", "222")],
//! )
//! .unwrap();
//!
//! let page = book.query(&Query::new().asc("name").limit(10)).unwrap();
//! assert_eq!(page.total, 2);
//! assert_eq!(page.items[0].name, "Amy");
//! ```

mod engine;

use serde::{Deserialize, Serialize};

use crate::record::Record;

pub use engine::{CompiledQuery, QueryEngine, RecordSource, TableSource};

/// Serialized as `asc` / `desc`. The long forms are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

/// Filters, sort orders and a window over the result.
///
/// Filters are case-insensitive substring matches and are ANDed together.
/// Empty filter values are ignored. Sort orders apply left to right, each
/// breaking ties left by the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    pub filters: Vec<(String, String)>,
    pub sorts: Vec<(String, SortDirection)>,
    pub offset: usize,
    pub limit: usize,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sorts: Vec::new(),
            offset: 0,
            limit: usize::MAX,
        }
    }
}

impl Query {
    /// Everything, in source order.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sorts.push((field.into(), direction));
        self
    }

    pub fn asc(self, field: impl Into<String>) -> Self {
        self.sort(field, SortDirection::Ascending)
    }

    pub fn desc(self, field: impl Into<String>) -> Self {
        self.sort(field, SortDirection::Descending)
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// One window of a query result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub items: Vec<Record>,
    /// Number of records matching the filters, ignoring offset and limit.
    pub total: usize,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
