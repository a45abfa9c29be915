use thiserror::Error;

pub mod fake_host;

pub type Result<T> = std::result::Result<T, HostError>;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("failed to resolve caller identity: {0}")]
    IdentityLookup(String),
    #[error("failed to attach event {name:?}: {reason}")]
    Event { name: String, reason: String },
}

/// The Host trait defines the services an invocation can request from the
/// hosting ledger platform, beyond access to the state store.
///
/// The host resolves these against the transaction context it built when the
/// client submitted the invocation, so every replica observes the same
/// answers.
pub trait Host {
    /// Returns the serialized identity of the client that submitted the
    /// current invocation
    fn creator(&self) -> Result<Vec<u8>>;

    /// Attaches a named event with an opaque payload to the invocation's
    /// outcome
    ///
    /// Events become visible to subscribers only if the invocation commits.
    fn set_event(&self, name: &str, payload: &[u8]) -> Result<()>;
}
