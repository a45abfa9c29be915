use anyhow::Result as StoreResult;

use crate::host::fake_host::FakeHost;
use crate::host::{Host, HostError};
use crate::store::{MemoryStateStore, StateStore};

/// ContractRuntime bundles the services the host makes available to one
/// contract invocation: the state store, the caller's identity, and the
/// event sink.
#[derive(Clone, Debug)]
pub struct ContractRuntime<H: Host, S: StateStore> {
    pub host: H,
    pub store: S,
}

impl<H: Host, S: StateStore> ContractRuntime<H, S> {
    pub fn new(host: H, store: S) -> Self {
        Self { host, store }
    }

    pub fn new_test_runtime() -> ContractRuntime<FakeHost, MemoryStateStore> {
        ContractRuntime { host: FakeHost::default(), store: MemoryStateStore::new() }
    }

    /// The account address of the invoking client: the lowercase hex encoding
    /// of the identity bytes the host resolved for this invocation
    ///
    /// The empty identity is rejected so the derived address can never collide
    /// with the empty-string sentinel used in mint/burn notifications.
    pub fn caller_address(&self) -> Result<String, HostError> {
        let identity = self.host.creator()?;
        if identity.is_empty() {
            return Err(HostError::IdentityLookup("host returned an empty identity".into()));
        }
        Ok(hex::encode(identity))
    }

    /// Attaches a named event to the invocation's outcome
    pub fn emit_event(&self, name: &str, payload: &[u8]) -> Result<(), HostError> {
        self.host.set_event(name, payload)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Convenience impl encapsulating the store functionality
impl<H: Host, S: StateStore> StateStore for ContractRuntime<H, S> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.store.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.store.put(key, value)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.store.delete(key)
    }
}

#[cfg(test)]
mod test {
    use super::ContractRuntime;
    use crate::host::fake_host::FakeHost;
    use crate::host::HostError;
    use crate::store::MemoryStateStore;

    #[test]
    fn it_derives_the_caller_address() {
        let runtime = ContractRuntime::<FakeHost, MemoryStateStore>::new_test_runtime();
        runtime.host.set_creator(b"alice");
        assert_eq!(runtime.caller_address().unwrap(), hex::encode(b"alice"));
    }

    #[test]
    fn it_rejects_an_empty_identity() {
        let runtime = ContractRuntime::<FakeHost, MemoryStateStore>::new_test_runtime();
        runtime.host.set_creator(b"");
        match runtime.caller_address().unwrap_err() {
            HostError::IdentityLookup(_) => {}
            _ => panic!("unexpected error"),
        }
    }

    #[test]
    fn it_forwards_events_to_the_host() {
        let runtime = ContractRuntime::<FakeHost, MemoryStateStore>::new_test_runtime();
        runtime.emit_event("Transfer", b"{}").unwrap();
        assert_eq!(runtime.host.last_event.borrow().clone().unwrap().name, "Transfer");
    }
}
