//! Phonebook configuration.
//!
//! Every field has a default, so a config file only needs the settings it
//! changes:
//!
//! ```
//! use phonebook::PhonebookConfig;
//!
//! let config = PhonebookConfig::from_json(r#"{ "validation": { "requireEmail": true } }"#).unwrap();
//! assert!(config.validation.require_email);
//! assert!(config.validation.require_name);
//! assert_eq!(config.worker_name_prefix, "phonebook-notify");
//! ```

use serde::{Deserialize, Serialize};

use crate::record::ValidationRules;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhonebookConfig {
    /// Rules checked before every insert and update.
    pub validation: ValidationRules,
    /// Notifier worker threads are named `<prefix>-<subscriber id>`.
    pub worker_name_prefix: String,
    /// Send the record's name as lock meta so other sessions can show who
    /// is being edited.
    pub lock_meta_from_name: bool,
}

impl Default for PhonebookConfig {
    fn default() -> Self {
        Self {
            validation: ValidationRules::default(),
            worker_name_prefix: "phonebook-notify".to_string(),
            lock_meta_from_name: true,
        }
    }
}

impl PhonebookConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_validation(mut self, rules: ValidationRules) -> Self {
        self.validation = rules;
        self
    }

    pub fn with_worker_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.worker_name_prefix = prefix.into();
        self
    }

    pub fn with_lock_meta_from_name(mut self, enabled: bool) -> Self {
        self.lock_meta_from_name = enabled;
        self
    }
}
