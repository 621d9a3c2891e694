use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use super::{Page, Query, SortDirection};
use crate::error::StoreError;
use crate::record::{Field, Record};
use crate::table::ContactTable;

/// Anything that can hand the engine a consistent list of records.
///
/// The order of the returned list is the order records keep when no sort
/// applies or every sort key ties.
pub trait RecordSource: Send + Sync {
    fn snapshot(&self) -> Result<Vec<Record>, StoreError>;
}

impl<S: RecordSource + ?Sized> RecordSource for Arc<S> {
    fn snapshot(&self) -> Result<Vec<Record>, StoreError> {
        (**self).snapshot()
    }
}

impl<S: RecordSource + ?Sized> RecordSource for &S {
    fn snapshot(&self) -> Result<Vec<Record>, StoreError> {
        (**self).snapshot()
    }
}

/// Reads straight from a collaborator, bypassing the store's index.
pub struct TableSource<T> {
    table: T,
}

impl<T: ContactTable> TableSource<T> {
    pub fn new(table: T) -> Self {
        Self { table }
    }
}

impl<T: ContactTable> RecordSource for TableSource<T> {
    fn snapshot(&self) -> Result<Vec<Record>, StoreError> {
        Ok(self.table.find_all()?)
    }
}

/// A query with every field name resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    /// Lowercased needles; empty values already dropped.
    filters: Vec<(Field, String)>,
    sorts: Vec<(Field, SortDirection)>,
    offset: usize,
    limit: usize,
}

impl CompiledQuery {
    pub fn compile(query: &Query) -> Result<Self, StoreError> {
        let mut filters = Vec::with_capacity(query.filters.len());
        for (name, value) in &query.filters {
            let field: Field = name.parse()?;
            if !value.is_empty() {
                filters.push((field, value.to_lowercase()));
            }
        }

        let sorts = query
            .sorts
            .iter()
            .map(|(name, direction)| Ok((name.parse::<Field>()?, *direction)))
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(Self {
            filters,
            sorts,
            offset: query.offset,
            limit: query.limit,
        })
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.filters
            .iter()
            .all(|(field, needle)| field.value(record).contains(needle))
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.sorts
            .iter()
            .fold(Ordering::Equal, |order, (field, direction)| {
                order.then_with(|| {
                    let order = field.value(a).compare(&field.value(b));
                    match direction {
                        SortDirection::Ascending => order,
                        SortDirection::Descending => order.reverse(),
                    }
                })
            })
    }

    /// Filter, sort (stable) and cut the window out of `records`.
    pub fn apply(&self, records: Vec<Record>) -> Page {
        let mut matched: Vec<Record> = records.into_iter().filter(|r| self.matches(r)).collect();
        if !self.sorts.is_empty() {
            matched.sort_by(|a, b| self.compare(a, b));
        }

        let total = matched.len();
        let items = matched
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect();
        Page { items, total }
    }
}

/// Runs queries against one record source.
pub struct QueryEngine<S> {
    source: S,
}

impl<S: RecordSource> QueryEngine<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn compile(&self, query: &Query) -> Result<CompiledQuery, StoreError> {
        CompiledQuery::compile(query)
    }

    pub fn run(&self, query: &Query) -> Result<Page, StoreError> {
        let compiled = self.compile(query)?;
        let page = compiled.apply(self.source.snapshot()?);
        debug!(
            total = page.total,
            returned = page.items.len(),
            offset = query.offset,
            "query evaluated"
        );
        Ok(page)
    }

    /// Number of records matching the filters of `query`.
    pub fn count(&self, query: &Query) -> Result<usize, StoreError> {
        let compiled = self.compile(query)?;
        Ok(self
            .source
            .snapshot()?
            .iter()
            .filter(|r| compiled.matches(r))
            .count())
    }
}
