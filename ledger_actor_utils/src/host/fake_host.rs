use std::cell::RefCell;

use super::{Host, HostError, Result};

/// An event recorded by [`FakeHost`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestEvent {
    pub name: String,
    pub payload: Vec<u8>,
}

/// Test double for the host services
#[derive(Clone, Debug)]
pub struct FakeHost {
    /// Identity bytes reported for the submitting client
    pub creator: RefCell<Vec<u8>>,
    /// The last event attached via this host
    pub last_event: RefCell<Option<TestEvent>>,
    /// Flag to fail the next identity lookup
    pub fail_next_creator: RefCell<bool>,
    /// Flag to fail the next event attachment
    pub fail_next_event: RefCell<bool>,
}

impl FakeHost {
    pub fn new(creator: Vec<u8>) -> Self {
        Self {
            creator: RefCell::new(creator),
            last_event: RefCell::new(None),
            fail_next_creator: RefCell::new(false),
            fail_next_event: RefCell::new(false),
        }
    }

    /// Switch the identity reported for subsequent invocations
    pub fn set_creator(&self, identity: &[u8]) {
        self.creator.replace(identity.to_vec());
    }
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new(b"creator".to_vec())
    }
}

impl Host for FakeHost {
    fn creator(&self) -> Result<Vec<u8>> {
        if self.fail_next_creator.replace(false) {
            return Err(HostError::IdentityLookup("identity context unavailable".into()));
        }
        Ok(self.creator.borrow().clone())
    }

    fn set_event(&self, name: &str, payload: &[u8]) -> Result<()> {
        if self.fail_next_event.replace(false) {
            return Err(HostError::Event {
                name: name.to_string(),
                reason: "event sink unavailable".into(),
            });
        }
        self.last_event
            .replace(Some(TestEvent { name: name.to_string(), payload: payload.to_vec() }));
        Ok(())
    }
}
