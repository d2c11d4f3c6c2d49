//! Inventory domain module.
//!
//! Business rules for battalion material and servant inventory, implemented
//! purely as deterministic domain logic (no IO, no storage, no spreadsheets).

pub mod allocation;
pub mod company;
pub mod events;
pub mod grade;
pub mod item;
pub mod material;
pub mod ordering;
pub mod subject;

pub use allocation::{Allocation, MAX_COUNT, Totals};
pub use company::{Company, FRONT_LOCATION, Location, REAR_LOCATION};
pub use events::{
    AllocationOrigin, AmountReported, DistributionChanged, DistributionReplaced, IdealCorrected,
    InventoryEvent, StockCorrected, StockRelocated, UsageRecorded,
};
pub use grade::Grade;
pub use item::{
    CorrectIdeal, CorrectStock, DistributeForCompany, InventoryCommand, InventoryItem, InventoryKey,
    MaterialInventoryItem, RelocateStock, ReportDamaged, ReportRepaired, ReportUsed,
    ServantInventoryItem, Transition,
};
pub use material::Material;
pub use subject::{InventorySubject, SapNr, SubjectKind};
