pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn message_body_serializes_message_key() {
        let body = types::MessageBody::new("Business deleted successfully");
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["message"], "Business deleted successfully");
    }
}
