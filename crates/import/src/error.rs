use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Every validation failure of one workbook, keyed by the failed check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize)]
#[error("workbook is not valid ({} failed checks)", .messages.len())]
pub struct ImportErrors {
    messages: BTreeMap<String, String>,
}

impl ImportErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }
}
