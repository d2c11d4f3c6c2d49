//! Infrastructure layer: configuration, document stores and the services
//! that run disposition operations against them.

pub mod bootstrap;
pub mod config;
pub mod document_store;
pub mod error;
pub mod import;
pub mod inventory_service;
pub mod reference_data;
pub mod reporter;
pub mod services;


pub use config::DispositionConfig;
pub use error::ServiceError;
pub use import::ImportSummary;
pub use inventory_service::{InventoryService, MaterialInventoryService, ServantInventoryService};
pub use services::{Disposition, DispositionStores, SharedCollection};
