//! Notification wire format.
//!
//! ```text
//! DATA_UPDATED
//! LOCK:<recordId>:<holderId>:<base64url(meta)>
//! UNLOCK:<recordId>:<holderId>
//! ```
//!
//! Meta is base64url without padding, so it never contains `:` and a holder
//! id can be recovered from between the record id and the last separator.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use super::ParseNotificationError;
use crate::record::RecordId;

pub const DATA_UPDATED: &str = "DATA_UPDATED";
const LOCK: &str = "LOCK";
const UNLOCK: &str = "UNLOCK";

/// A message broadcast to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Some record was inserted, updated or deleted.
    DataUpdated,
    /// `holder` started editing `record_id`. `meta` is free text for display.
    Lock {
        record_id: RecordId,
        holder: String,
        meta: String,
    },
    /// `holder` stopped editing `record_id`.
    Unlock { record_id: RecordId, holder: String },
}

impl Notification {
    pub fn lock(record_id: RecordId, holder: impl Into<String>, meta: impl Into<String>) -> Self {
        Notification::Lock {
            record_id,
            holder: holder.into(),
            meta: meta.into(),
        }
    }

    pub fn unlock(record_id: RecordId, holder: impl Into<String>) -> Self {
        Notification::Unlock {
            record_id,
            holder: holder.into(),
        }
    }

    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            Notification::DataUpdated => None,
            Notification::Lock { record_id, .. } | Notification::Unlock { record_id, .. } => {
                Some(*record_id)
            }
        }
    }

    pub fn holder(&self) -> Option<&str> {
        match self {
            Notification::DataUpdated => None,
            Notification::Lock { holder, .. } | Notification::Unlock { holder, .. } => {
                Some(holder)
            }
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::DataUpdated => f.write_str(DATA_UPDATED),
            Notification::Lock {
                record_id,
                holder,
                meta,
            } => write!(
                f,
                "{}:{}:{}:{}",
                LOCK,
                record_id,
                holder,
                URL_SAFE_NO_PAD.encode(meta)
            ),
            Notification::Unlock { record_id, holder } => {
                write!(f, "{}:{}:{}", UNLOCK, record_id, holder)
            }
        }
    }
}

fn parse_record_id(raw: &str) -> Result<RecordId, ParseNotificationError> {
    raw.parse()
        .map_err(|_| ParseNotificationError::BadRecordId(raw.to_string()))
}

impl FromStr for Notification {
    type Err = ParseNotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseNotificationError::Empty);
        }
        if s == DATA_UPDATED {
            return Ok(Notification::DataUpdated);
        }

        let (kind, rest) = s
            .split_once(':')
            .ok_or_else(|| ParseNotificationError::UnknownKind(s.to_string()))?;

        match kind {
            LOCK => {
                let (id, rest) = rest.split_once(':').ok_or(ParseNotificationError::MissingPart {
                    kind: LOCK,
                    part: "holder",
                })?;
                let (holder, meta) =
                    rest.rsplit_once(':')
                        .ok_or(ParseNotificationError::MissingPart {
                            kind: LOCK,
                            part: "meta",
                        })?;
                let meta = URL_SAFE_NO_PAD
                    .decode(meta)
                    .ok()
                    .and_then(|bytes| String::from_utf8(bytes).ok())
                    .ok_or_else(|| ParseNotificationError::BadMeta(meta.to_string()))?;
                Ok(Notification::Lock {
                    record_id: parse_record_id(id)?,
                    holder: holder.to_string(),
                    meta,
                })
            }
            UNLOCK => {
                let (id, holder) =
                    rest.split_once(':')
                        .ok_or(ParseNotificationError::MissingPart {
                            kind: UNLOCK,
                            part: "holder",
                        })?;
                Ok(Notification::Unlock {
                    record_id: parse_record_id(id)?,
                    holder: holder.to_string(),
                })
            }
            other => Err(ParseNotificationError::UnknownKind(other.to_string())),
        }
    }
}
