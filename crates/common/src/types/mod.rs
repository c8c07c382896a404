use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Plain `{ "message": ... }` acknowledgement returned by mutations without a body.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// `{ "count": n }` payload.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct CountBody {
    pub count: u64,
}
