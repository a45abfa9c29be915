use std::cell::RefCell;
use std::collections::BTreeMap;

use anyhow::Result;

/// The replicated key-value store a ledger platform exposes to a contract.
///
/// The host supplies a snapshot view for each invocation and commits all of an
/// invocation's writes together, or none of them if the invocation fails.
/// Values are opaque bytes; the schema layered on top is the contract's
/// concern.
pub trait StateStore {
    /// Get the value stored under `key`, or None if the key is unset
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set the value stored under `key`
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove `key` from the store. Deleting an absent key is a no-op.
    fn delete(&self, key: &str) -> Result<()>;
}

/// An in-memory store for tests.
///
/// Backed by a BTreeMap so any iteration over it is deterministic.
#[derive(Clone, Default, Debug)]
pub struct MemoryStateStore {
    data: RefCell<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Whether a key is present at all, regardless of value
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.borrow().contains_key(key)
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.data.borrow_mut().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }
}

impl<S: StateStore> StateStore for &S {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

#[cfg(test)]
mod test {
    use super::{MemoryStateStore, StateStore};

    #[test]
    fn it_stores_and_retrieves_values() {
        let store = MemoryStateStore::new();
        assert_eq!(store.get("balance").unwrap(), None);

        store.put("balance", b"100").unwrap();
        assert_eq!(store.get("balance").unwrap(), Some(b"100".to_vec()));

        store.put("balance", b"50").unwrap();
        assert_eq!(store.get("balance").unwrap(), Some(b"50".to_vec()));
    }

    #[test]
    fn it_deletes_keys() {
        let store = MemoryStateStore::new();
        store.put("balance", b"100").unwrap();
        store.delete("balance").unwrap();
        assert_eq!(store.get("balance").unwrap(), None);
        assert!(!store.contains_key("balance"));

        // deleting an absent key is fine
        store.delete("balance").unwrap();
    }
}
