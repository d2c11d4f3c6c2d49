use std::sync::RwLock;

use super::r#trait::{Collection, Document, Filter, ReplaceOptions, ReplaceOutcome, StoreError};

/// In-memory document collection.
///
/// Intended for tests/dev. Lookups are linear scans in insertion order.
#[derive(Debug)]
pub struct InMemoryCollection<D> {
    docs: RwLock<Vec<D>>,
}

impl<D> Default for InMemoryCollection<D> {
    fn default() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }
}

impl<D: Document> InMemoryCollection<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(docs: Vec<D>) -> Self {
        Self {
            docs: RwLock::new(docs),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

impl<D: Document> Collection<D> for InMemoryCollection<D> {
    fn find(&self, filter: Filter<'_, D>) -> Result<Vec<D>, StoreError> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        Ok(docs.iter().filter(|d| filter(d)).cloned().collect())
    }

    fn find_one(&self, filter: Filter<'_, D>) -> Result<Option<D>, StoreError> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        Ok(docs.iter().find(|d| filter(d)).cloned())
    }

    fn insert_one(&self, doc: D) -> Result<(), StoreError> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        docs.push(doc);
        Ok(())
    }

    fn insert_many(&self, new_docs: Vec<D>) -> Result<(), StoreError> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        docs.extend(new_docs);
        Ok(())
    }

    fn replace_one(
        &self,
        filter: Filter<'_, D>,
        doc: D,
        options: ReplaceOptions,
    ) -> Result<ReplaceOutcome, StoreError> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        let position = docs.iter().position(|d| filter(d));
        let current = position.map(|i| docs[i].revision()).unwrap_or(0);

        if !options.expected_version.matches(current) {
            return Err(StoreError::Concurrency(format!(
                "expected {:?}, found {current}",
                options.expected_version
            )));
        }

        match position {
            Some(i) => {
                docs[i] = doc;
                Ok(ReplaceOutcome::Replaced)
            }
            None if options.upsert => {
                docs.push(doc);
                Ok(ReplaceOutcome::Inserted)
            }
            None => Ok(ReplaceOutcome::Unmatched),
        }
    }

    fn delete_one(&self, filter: Filter<'_, D>) -> Result<usize, StoreError> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        match docs.iter().position(|d| filter(d)) {
            Some(i) => {
                docs.remove(i);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_many(&self, filter: Filter<'_, D>) -> Result<usize, StoreError> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        let before = docs.len();
        docs.retain(|d| !filter(d));
        Ok(before - docs.len())
    }
}
