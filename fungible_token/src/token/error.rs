use ledger_actor_utils::host::HostError;
use thiserror::Error;

use crate::token::state::StateError;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("error in underlying state: {0}")]
    State(#[from] StateError),
    #[error("error in host services: {0}")]
    Host(#[from] HostError),
    #[error("unsupported operation {0:?}")]
    UnsupportedOperation(String),
    #[error("operation {operation} expects {expected} argument(s), got {got}")]
    ArgumentCount { operation: &'static str, expected: usize, got: usize },
    #[error("value {value:?} for {name:?} is not an unsigned decimal numeral")]
    InvalidNumeral { name: &'static str, value: String },
    #[error("address for {0:?} must not be empty")]
    EmptyAddress(&'static str),
    #[error("address {address:?} for {name:?} would alias a reserved ledger key")]
    ReservedAddress { name: &'static str, address: String },
    #[error("token metadata has already been initialized")]
    AlreadyInitialized,
    #[error("error during payload serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod test {
    use crate::token::state::StateError;
    use crate::token::TokenError;

    #[test]
    fn it_surfaces_state_errors_with_context() {
        let error: TokenError = StateError::InsufficientBalance {
            owner: "aa11".to_string(),
            balance: 10,
            delta: 25,
        }
        .into();
        let message = error.to_string();
        assert!(message.contains("aa11"));
        assert!(message.contains("10"));
        assert!(message.contains("25"));
    }
}
