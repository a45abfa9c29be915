/// Numeric status of a completed invocation, following the host shim's
/// convention: 200 for success, 500 for failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status(pub u32);

impl Status {
    pub const OK: Status = Status(200);
    pub const ERROR: Status = Status(500);
}

/// The outcome of one invocation as reported back to the host.
///
/// A success carries a payload for the submitting client; a failure carries a
/// human-readable message and instructs the host to discard the invocation's
/// writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub message: String,
    pub payload: Vec<u8>,
}

impl Response {
    pub fn success(payload: Vec<u8>) -> Self {
        Self { status: Status::OK, message: String::new(), payload }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: Status::ERROR, message: message.into(), payload: Vec::new() }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::OK
    }
}

#[cfg(test)]
mod test {
    use super::{Response, Status};

    #[test]
    fn it_builds_success_and_error_responses() {
        let ok = Response::success(b"600".to_vec());
        assert!(ok.is_success());
        assert_eq!(ok.status, Status::OK);
        assert_eq!(ok.payload, b"600".to_vec());

        let err = Response::error("insufficient balance");
        assert!(!err.is_success());
        assert_eq!(err.status, Status::ERROR);
        assert_eq!(err.message, "insufficient balance");
        assert!(err.payload.is_empty());
    }
}
