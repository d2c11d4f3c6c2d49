use serde::{Deserialize, Serialize};

use dispo_core::ValueObject;

/// Upper bound of every stored counter, the range of a spreadsheet integer.
///
/// Sums over any realistic number of allocations stay far inside `i64`.
pub const MAX_COUNT: i64 = i32::MAX as i64;

/// A quantity of material or personnel at one location.
///
/// `damaged_or_detached` holds damaged material or detached servants,
/// depending on the inventory variant. `available` is always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub location: String,
    pub stock: i64,
    pub used: i64,
    #[serde(alias = "damaged", alias = "detached")]
    pub damaged_or_detached: i64,
}

impl ValueObject for Allocation {}

impl Allocation {
    pub fn at(location: impl Into<String>, stock: i64, used: i64, damaged_or_detached: i64) -> Self {
        Self {
            location: location.into(),
            stock,
            used,
            damaged_or_detached,
        }
    }

    /// A zero-stock allocation (only created implicitly when usage is recorded).
    pub fn empty(location: impl Into<String>) -> Self {
        Self::at(location, 0, 0, 0)
    }

    /// Saturates at the `i64` bounds; exact for any accepted allocation.
    pub fn available(&self) -> i64 {
        self.stock
            .saturating_sub(self.used)
            .saturating_sub(self.damaged_or_detached)
    }

    /// `None` when the difference does not fit an `i64`.
    pub fn checked_available(&self) -> Option<i64> {
        self.stock
            .checked_sub(self.used)?
            .checked_sub(self.damaged_or_detached)
    }

    pub fn has_negative_counter(&self) -> bool {
        self.stock < 0 || self.used < 0 || self.damaged_or_detached < 0
    }

    pub fn exceeds_max_count(&self) -> bool {
        self.stock > MAX_COUNT || self.used > MAX_COUNT || self.damaged_or_detached > MAX_COUNT
    }

    /// Fold the counters of `other` into this allocation.
    pub fn absorb(&mut self, other: &Allocation) {
        self.stock = self.stock.saturating_add(other.stock);
        self.used = self.used.saturating_add(other.used);
        self.damaged_or_detached = self.damaged_or_detached.saturating_add(other.damaged_or_detached);
    }

    /// The merged allocation, or `None` if any counter would pass [`MAX_COUNT`].
    pub fn checked_absorb(&self, other: &Allocation) -> Option<Allocation> {
        let merged = Allocation {
            location: self.location.clone(),
            stock: self.stock.checked_add(other.stock)?,
            used: self.used.checked_add(other.used)?,
            damaged_or_detached: self.damaged_or_detached.checked_add(other.damaged_or_detached)?,
        };
        (!merged.exceeds_max_count()).then_some(merged)
    }
}

/// Summed counters over a set of allocations. Sums saturate at the `i64` bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub stock: i64,
    pub used: i64,
    pub damaged_or_detached: i64,
}

impl Totals {
    pub fn of<'a>(allocations: impl IntoIterator<Item = &'a Allocation>) -> Self {
        allocations.into_iter().fold(Self::default(), |mut acc, a| {
            acc.add_allocation(a);
            acc
        })
    }

    pub fn available(&self) -> i64 {
        self.stock
            .saturating_sub(self.used)
            .saturating_sub(self.damaged_or_detached)
    }

    pub fn add_allocation(&mut self, allocation: &Allocation) {
        self.stock = self.stock.saturating_add(allocation.stock);
        self.used = self.used.saturating_add(allocation.used);
        self.damaged_or_detached = self.damaged_or_detached.saturating_add(allocation.damaged_or_detached);
    }
}

impl core::ops::Add for Totals {
    type Output = Totals;

    fn add(self, rhs: Totals) -> Totals {
        Totals {
            stock: self.stock.saturating_add(rhs.stock),
            used: self.used.saturating_add(rhs.used),
            damaged_or_detached: self.damaged_or_detached.saturating_add(rhs.damaged_or_detached),
        }
    }
}

impl core::ops::AddAssign for Totals {
    fn add_assign(&mut self, rhs: Totals) {
        *self = *self + rhs;
    }
}

impl core::iter::Sum for Totals {
    fn sum<I: Iterator<Item = Totals>>(iter: I) -> Totals {
        iter.fold(Totals::default(), |acc, t| acc + t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn available_is_stock_minus_used_minus_damaged() {
        let a = Allocation::at("Bern", 12, 10, 2);
        assert_eq!(a.available(), 0);
        assert_eq!(Allocation::at("Bern", 5, 4, 3).available(), -2);
    }

    #[test]
    fn absorb_adds_all_counters() {
        let mut target = Allocation::at("KP Rw", 5, 1, 0);
        target.absorb(&Allocation::at("Somewhere", 3, 1, 1));
        assert_eq!(target, Allocation::at("KP Rw", 8, 2, 1));
    }

    #[test]
    fn oversized_counters_do_not_overflow() {
        let a = Allocation::at("Bern", 0, i64::MAX, i64::MAX);
        assert_eq!(a.checked_available(), None);
        assert_eq!(a.available(), i64::MIN);
        assert!(a.exceeds_max_count());

        let totals = Totals::of(&[a.clone(), a]);
        assert_eq!(totals.used, i64::MAX);
        assert!(totals.available() < 0);
    }

    #[test]
    fn checked_absorb_stops_at_max_count() {
        let full = Allocation::at("KP Rw", MAX_COUNT, 0, 0);
        assert_eq!(full.checked_absorb(&Allocation::at("Bern", 1, 0, 0)), None);
        assert_eq!(
            full.checked_absorb(&Allocation::at("Bern", 0, 0, 0)),
            Some(Allocation::at("KP Rw", MAX_COUNT, 0, 0))
        );
    }

    #[test]
    fn deserializes_variant_specific_counter_names() {
        let material: Allocation =
            serde_json::from_str(r#"{"location":"Bern","stock":4,"used":1,"damaged":2}"#).unwrap();
        let servant: Allocation =
            serde_json::from_str(r#"{"location":"Bern","stock":4,"used":1,"detached":2}"#).unwrap();
        assert_eq!(material, servant);
        assert_eq!(material.damaged_or_detached, 2);
    }

    #[test]
    fn available_is_never_serialized() {
        let json = serde_json::to_value(Allocation::at("Bern", 4, 1, 1)).unwrap();
        assert!(json.get("available").is_none());
    }

    proptest! {
        /// Property: totals keep the derived-available identity.
        #[test]
        fn totals_preserve_available_identity(
            rows in proptest::collection::vec((0i64..1000, 0i64..1000, 0i64..1000), 0..20)
        ) {
            let allocations: Vec<Allocation> = rows
                .iter()
                .enumerate()
                .map(|(i, (s, u, d))| Allocation::at(format!("L{i}"), *s, *u, *d))
                .collect();

            let totals = Totals::of(&allocations);
            let summed_available: i64 = allocations.iter().map(Allocation::available).sum();

            prop_assert_eq!(totals.available(), totals.stock - totals.used - totals.damaged_or_detached);
            prop_assert_eq!(totals.available(), summed_available);
        }
    }
}
