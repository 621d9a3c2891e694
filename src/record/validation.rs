use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Record;

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Why a record was rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("phone cannot be empty")]
    EmptyPhone,
    #[error("phone must contain only digits: {0}")]
    NonDigitPhone(String),
    #[error("email is required")]
    MissingEmail,
    #[error("invalid email format: {0}")]
    InvalidEmail(String),
}

/// Field rules checked on insert and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationRules {
    pub require_name: bool,
    pub require_phone: bool,
    pub digits_only_phone: bool,
    pub require_email: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            require_name: true,
            require_phone: true,
            digits_only_phone: true,
            require_email: false,
        }
    }
}

impl ValidationRules {
    /// Accept anything. The email format is still checked when one is given.
    pub fn permissive() -> Self {
        Self {
            require_name: false,
            require_phone: false,
            digits_only_phone: false,
            require_email: false,
        }
    }

    pub fn check(&self, record: &Record) -> Result<(), ValidationError> {
        if self.require_name && record.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        if self.require_phone && record.phone.trim().is_empty() {
            return Err(ValidationError::EmptyPhone);
        }
        if self.digits_only_phone
            && !record.phone.is_empty()
            && !record.phone.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ValidationError::NonDigitPhone(record.phone.clone()));
        }

        let email = record.email.trim();
        if email.is_empty() {
            if self.require_email {
                return Err(ValidationError::MissingEmail);
            }
        } else if !email_regex().is_match(email) {
            return Err(ValidationError::InvalidEmail(record.email.clone()));
        }

        Ok(())
    }
}
