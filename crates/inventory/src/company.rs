//! Companies and their locations.

use serde::{Deserialize, Serialize};

use dispo_core::{CompanyId, DomainError, DomainResult, Entity, ValueObject};

/// Home location every company keeps.
pub const REAR_LOCATION: &str = "KP Rw";

/// Preferred relocation target when a company has one.
pub const FRONT_LOCATION: &str = "KP Front";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
}

impl ValueObject for Location {}

impl Location {
    pub fn at(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn is(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub locations: Vec<Location>,
    pub default_location: Location,
}

impl Company {
    /// New company whose default location is the first given location.
    pub fn new(name: impl Into<String>, locations: Vec<Location>) -> Self {
        let default_location = locations
            .first()
            .cloned()
            .unwrap_or_else(|| Location::at(REAR_LOCATION));
        Self {
            id: CompanyId::new(),
            name: name.into(),
            locations,
            default_location,
        }
        .normalized()
    }

    /// Re-adds the rear location when it is missing.
    pub fn normalized(mut self) -> Self {
        if !self.locations.iter().any(|l| l.is(REAR_LOCATION)) {
            self.locations.insert(0, Location::at(REAR_LOCATION));
        }
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("Company name is required"));
        }
        for (i, location) in self.locations.iter().enumerate() {
            if location.name.trim().is_empty() {
                return Err(DomainError::validation("Location name is required"));
            }
            if self.locations[..i].iter().any(|other| other.is(&location.name)) {
                return Err(DomainError::validation(format!(
                    "Location {} is listed twice",
                    location.name
                )));
            }
        }
        if !self.has_location(&self.default_location.name) {
            return Err(DomainError::validation(format!(
                "Default location {} is not a location of {}",
                self.default_location.name, self.name
            )));
        }
        Ok(())
    }

    pub fn has_location(&self, name: &str) -> bool {
        self.locations.iter().any(|l| l.name == name)
    }

    pub fn location_names(&self) -> Vec<String> {
        self.locations.iter().map(|l| l.name.clone()).collect()
    }

    /// Locations of `self` that `updated` no longer lists.
    pub fn removed_locations(&self, updated: &Company) -> Vec<String> {
        self.locations
            .iter()
            .filter(|l| !updated.has_location(&l.name))
            .map(|l| l.name.clone())
            .collect()
    }

    /// Where stock from `removed` locations goes: the front location if the
    /// company keeps one, otherwise its default location.
    pub fn relocation_target(&self, removed: &[String]) -> DomainResult<String> {
        let remaining = || {
            self.locations
                .iter()
                .filter(|l| !removed.iter().any(|r| *r == l.name))
        };
        if let Some(front) = remaining().find(|l| l.is(FRONT_LOCATION)) {
            return Ok(front.name.clone());
        }
        if remaining().any(|l| l.name == self.default_location.name) {
            return Ok(self.default_location.name.clone());
        }
        Err(DomainError::validation(format!(
            "Default location {} of {} can not be removed",
            self.default_location.name, self.name
        )))
    }
}

impl Entity for Company {
    type Id = CompanyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(locations: &[&str]) -> Company {
        Company::new("Ristl Kp 17/1", locations.iter().map(|l| Location::at(*l)).collect())
    }

    #[test]
    fn rear_location_is_re_added() {
        let c = company(&["Bern"]);
        assert_eq!(c.location_names(), ["KP Rw", "Bern"]);
        assert_eq!(c.default_location, Location::at("Bern"));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rear_location_is_not_duplicated() {
        let c = company(&["kp rw", "Bern"]);
        assert_eq!(c.location_names(), ["kp rw", "Bern"]);
    }

    #[test]
    fn default_must_be_a_location() {
        let mut c = company(&["Bern"]);
        c.default_location = Location::at("Willisau");
        assert!(c.validate().unwrap_err().is_validation());
    }

    #[test]
    fn duplicate_locations_are_rejected() {
        let c = company(&["Bern", "BERN"]);
        assert!(c.validate().is_err());
    }

    #[test]
    fn relocation_prefers_front_location() {
        let c = company(&["KP Rw", "kp front", "Bern"]);
        assert_eq!(c.relocation_target(&["Bern".into()]).unwrap(), "kp front");
    }

    #[test]
    fn relocation_falls_back_to_default() {
        let c = company(&["KP Rw", "Bern", "Willisau"]);
        assert_eq!(c.relocation_target(&["Willisau".into()]).unwrap(), "KP Rw");
    }

    #[test]
    fn removing_the_default_without_front_fails() {
        let c = company(&["Bern", "Willisau"]);
        assert!(c.relocation_target(&["Bern".into()]).is_err());
    }

    #[test]
    fn removed_locations_are_the_difference() {
        let before = company(&["KP Rw", "Bern", "Willisau"]);
        let mut after = before.clone();
        after.locations.retain(|l| l.name != "Bern");
        assert_eq!(before.removed_locations(&after), ["Bern"]);
        assert!(after.removed_locations(&after).is_empty());
    }
}
