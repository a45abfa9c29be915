use serde::{Deserialize, Serialize};

/// Name under which transfer notifications are attached to an invocation
pub const TRANSFER_EVENT: &str = "Transfer";

/// Notification payload for every operation that moves tokens.
///
/// Minting records the empty string as `from`; burning records the empty
/// string as `to`. Subscribers receive the JSON encoding once the invocation
/// commits.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct TransferEvent {
    pub from: String,
    pub to: String,
    pub value: u64,
}

impl TransferEvent {
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod test {
    use super::TransferEvent;

    #[test]
    fn it_encodes_the_wire_field_names() {
        let event =
            TransferEvent { from: String::new(), to: "abcd".to_string(), value: 100 };
        let json: serde_json::Value =
            serde_json::from_slice(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["from"], "");
        assert_eq!(json["to"], "abcd");
        assert_eq!(json["value"], 100);
    }
}
