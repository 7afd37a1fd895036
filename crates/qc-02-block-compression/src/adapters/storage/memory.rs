use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, KvEntry, KvIterator};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ordered in-memory key-value store.
///
/// `BTreeMap` behind a `parking_lot::RwLock`. Batches apply under one write
/// lock, so they are atomic with respect to every reader.
pub struct InMemoryKVStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    range_iteration: bool,
    compactions: AtomicU64,
    failing_prefix: RwLock<Option<Vec<u8>>>,
}

impl Default for InMemoryKVStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            range_iteration: true,
            compactions: AtomicU64::new(0),
            failing_prefix: RwLock::new(None),
        }
    }

    /// A store that reports no range-iteration support.
    pub fn without_range_iteration() -> Self {
        Self {
            range_iteration: false,
            ..Self::new()
        }
    }

    /// Make every write touching a key under `prefix` fail with an I/O error.
    pub fn fail_writes_with_prefix(&self, prefix: &[u8]) {
        *self.failing_prefix.write() = Some(prefix.to_vec());
    }

    /// Undo `fail_writes_with_prefix`.
    pub fn clear_write_failures(&self) {
        *self.failing_prefix.write() = None;
    }

    /// Number of `compact_range` calls served.
    pub fn compaction_count(&self) -> u64 {
        self.compactions.load(Ordering::Relaxed)
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Number of keys under `prefix`.
    pub fn count_prefix(&self, prefix: &[u8]) -> usize {
        self.data
            .read()
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(prefix))
            .count()
    }

    fn check_writable(&self, key: &[u8]) -> Result<(), KVStoreError> {
        match self.failing_prefix.read().as_deref() {
            Some(prefix) if key.starts_with(prefix) => Err(KVStoreError::IOError {
                message: format!("injected write failure for key 0x{}", hex::encode(key)),
            }),
            _ => Ok(()),
        }
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.check_writable(key)?;
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError> {
        self.check_writable(key)?;
        self.data.write().remove(key);
        Ok(())
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        // Validate everything first so a rejected batch applies nothing
        for op in &operations {
            match op {
                BatchOperation::Put { key, .. } | BatchOperation::Delete { key } => {
                    self.check_writable(key)?
                }
            }
        }

        let mut data = self.data.write();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.read().contains_key(key))
    }

    fn iter_from<'a>(
        &'a self,
        prefix: &[u8],
        start: &[u8],
    ) -> Result<KvIterator<'a>, KVStoreError> {
        if !self.range_iteration {
            return Err(KVStoreError::Unsupported {
                operation: "range iteration",
            });
        }
        let mut seek = prefix.to_vec();
        seek.extend_from_slice(start);
        Ok(Box::new(MemoryIter {
            store: self,
            prefix: prefix.to_vec(),
            cursor: Bound::Included(seek),
            done: false,
        }))
    }

    fn supports_range_iteration(&self) -> bool {
        self.range_iteration
    }

    fn compact_range(&self, _start: &[u8], _end: &[u8]) -> Result<(), KVStoreError> {
        self.compactions.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Lazy iterator: takes the read lock per step, never across steps.
struct MemoryIter<'a> {
    store: &'a InMemoryKVStore,
    prefix: Vec<u8>,
    cursor: Bound<Vec<u8>>,
    done: bool,
}

impl Iterator for MemoryIter<'_> {
    type Item = Result<KvEntry, KVStoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = {
            let data = self.store.data.read();
            data.range::<Vec<u8>, _>((self.cursor.clone(), Bound::Unbounded))
                .next()
                .filter(|(k, _)| k.starts_with(&self.prefix))
                .map(|(k, v)| (k.clone(), v.clone()))
        };

        match next {
            Some((key, value)) => {
                self.cursor = Bound::Excluded(key.clone());
                Some(Ok((key, value)))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}
