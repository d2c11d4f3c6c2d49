use std::sync::Arc;

use thiserror::Error;

use dispo_core::{AggregateRoot, Entity, ExpectedVersion};
use dispo_inventory::{Company, InventoryItem, InventorySubject, Material};
use dispo_reporting::DispositionReport;

/// Predicate over stored documents.
pub type Filter<'a, D> = &'a dyn Fn(&D) -> bool;

/// Matches the document whose identity is `id`.
pub fn by_id<D: Entity>(id: D::Id) -> impl Fn(&D) -> bool {
    move |doc| *doc.id() == id
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Conditional replace failed: the stored revision moved on.
    #[error("concurrency conflict: {0}")]
    Concurrency(String),

    /// The backend is unusable (e.g. poisoned lock, lost connection).
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// A document kept in a [`Collection`].
///
/// `revision` is only consulted for conditional replaces; documents that are
/// never replaced conditionally keep the default of `0`.
pub trait Document: Clone + Send + Sync + 'static {
    fn revision(&self) -> u64 {
        0
    }
}

impl<S: InventorySubject> Document for InventoryItem<S> {
    fn revision(&self) -> u64 {
        self.version()
    }
}

impl Document for Company {}
impl Document for Material {}
impl Document for DispositionReport {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReplaceOptions {
    pub upsert: bool,
    pub expected_version: ExpectedVersion,
}

impl ReplaceOptions {
    /// Unconditional upsert (last writer wins).
    pub fn upsert() -> Self {
        Self {
            upsert: true,
            expected_version: ExpectedVersion::Any,
        }
    }

    pub fn expecting(mut self, expected_version: ExpectedVersion) -> Self {
        self.expected_version = expected_version;
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced,
    Inserted,
    /// Nothing matched and upsert was off.
    Unmatched,
}

/// Document collection boundary.
///
/// Every call is atomic on its own; there are no multi-call transactions.
/// Unique keys are not enforced here, callers check before inserting.
pub trait Collection<D: Document>: Send + Sync {
    fn find(&self, filter: Filter<'_, D>) -> Result<Vec<D>, StoreError>;

    fn find_one(&self, filter: Filter<'_, D>) -> Result<Option<D>, StoreError>;

    fn insert_one(&self, doc: D) -> Result<(), StoreError>;

    fn insert_many(&self, docs: Vec<D>) -> Result<(), StoreError>;

    /// Replace the first document matching `filter`.
    ///
    /// With `expected_version` set to `Exact(v)`, the stored revision must be
    /// `v` (a missing document counts as revision `0`).
    fn replace_one(
        &self,
        filter: Filter<'_, D>,
        doc: D,
        options: ReplaceOptions,
    ) -> Result<ReplaceOutcome, StoreError>;

    /// Returns the number of removed documents (0 or 1).
    fn delete_one(&self, filter: Filter<'_, D>) -> Result<usize, StoreError>;

    fn delete_many(&self, filter: Filter<'_, D>) -> Result<usize, StoreError>;
}

impl<D, C> Collection<D> for Arc<C>
where
    D: Document,
    C: Collection<D> + ?Sized,
{
    fn find(&self, filter: Filter<'_, D>) -> Result<Vec<D>, StoreError> {
        (**self).find(filter)
    }

    fn find_one(&self, filter: Filter<'_, D>) -> Result<Option<D>, StoreError> {
        (**self).find_one(filter)
    }

    fn insert_one(&self, doc: D) -> Result<(), StoreError> {
        (**self).insert_one(doc)
    }

    fn insert_many(&self, docs: Vec<D>) -> Result<(), StoreError> {
        (**self).insert_many(docs)
    }

    fn replace_one(
        &self,
        filter: Filter<'_, D>,
        doc: D,
        options: ReplaceOptions,
    ) -> Result<ReplaceOutcome, StoreError> {
        (**self).replace_one(filter, doc, options)
    }

    fn delete_one(&self, filter: Filter<'_, D>) -> Result<usize, StoreError> {
        (**self).delete_one(filter)
    }

    fn delete_many(&self, filter: Filter<'_, D>) -> Result<usize, StoreError> {
        (**self).delete_many(filter)
    }
}
