//! What an inventory item counts: a material (by SAP number) or servants of a grade.

use core::fmt;
use core::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::grade::Grade;

/// Inventory variant discriminator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Material,
    Servant,
}

impl SubjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SubjectKind::Material => "material",
            SubjectKind::Servant => "servant",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of an inventory item, together with the company name.
pub trait InventorySubject:
    Clone + Eq + Hash + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: SubjectKind;

    /// Stable string key (SAP number or grade display name).
    fn key(&self) -> String {
        self.to_string()
    }
}

/// SAP number: the business key of a material.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SapNr(String);

impl SapNr {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SapNr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SapNr {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SapNr {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl InventorySubject for SapNr {
    const KIND: SubjectKind = SubjectKind::Material;
}

impl InventorySubject for Grade {
    const KIND: SubjectKind = SubjectKind::Servant;
}
