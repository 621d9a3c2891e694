use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

use super::{Record, RecordId};

/// The fields a query may filter or sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Name,
    Phone,
    Email,
    Country,
    City,
    Street,
}

/// A borrowed field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Id(Option<RecordId>),
    Text(&'a str),
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Id,
        Field::Name,
        Field::Phone,
        Field::Email,
        Field::Country,
        Field::City,
        Field::Street,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::Country => "country",
            Field::City => "city",
            Field::Street => "street",
        }
    }

    pub fn value(self, record: &Record) -> FieldValue<'_> {
        match self {
            Field::Id => FieldValue::Id(record.id),
            Field::Name => FieldValue::Text(&record.name),
            Field::Phone => FieldValue::Text(&record.phone),
            Field::Email => FieldValue::Text(&record.email),
            Field::Country => FieldValue::Text(&record.country),
            Field::City => FieldValue::Text(&record.city),
            Field::Street => FieldValue::Text(&record.street),
        }
    }
}

impl FieldValue<'_> {
    /// Case-insensitive substring match. `needle` must already be lowercase.
    pub fn contains(&self, needle: &str) -> bool {
        match self {
            FieldValue::Id(Some(id)) => id.to_string().contains(needle),
            FieldValue::Id(None) => false,
            FieldValue::Text(text) => text.to_lowercase().contains(needle),
        }
    }

    /// Text compares case-insensitively first, then byte-wise so the order
    /// stays total.
    pub fn compare(&self, other: &FieldValue<'_>) -> Ordering {
        match (self, other) {
            (FieldValue::Id(a), FieldValue::Id(b)) => a.cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (FieldValue::Id(_), FieldValue::Text(_)) => Ordering::Less,
            (FieldValue::Text(_), FieldValue::Id(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| StoreError::InvalidField(s.to_string()))
    }
}
