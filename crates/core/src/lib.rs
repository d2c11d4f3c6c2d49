//! `dispo-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the disposition
//! crates (no storage, no spreadsheets, no logging setup).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CompanyId, MaterialId, ReportId};
pub use value_object::ValueObject;
