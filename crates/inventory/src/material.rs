use serde::{Deserialize, Serialize};

use dispo_core::{DomainError, DomainResult, Entity, MaterialId};

use crate::subject::SapNr;

/// A kind of material, identified in the business by its SAP number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub sap_nr: SapNr,
    pub category: String,
    pub short_description: String,
    pub description: String,
}

impl Material {
    pub fn new(
        sap_nr: impl Into<SapNr>,
        category: impl Into<String>,
        short_description: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: MaterialId::new(),
            sap_nr: sap_nr.into(),
            category: category.into(),
            short_description: short_description.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.sap_nr.is_blank() {
            return Err(DomainError::validation("SapNr is required"));
        }
        if self.short_description.trim().is_empty() {
            return Err(DomainError::validation("ShortDescription is required"));
        }
        Ok(())
    }
}

impl Entity for Material {
    type Id = MaterialId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
