use serde::{Deserialize, Serialize};

/// Payload of the user-creation topic. Extra fields sent by producers are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEvent {
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_unknown_fields() {
        let event: UserEvent =
            serde_json::from_str(r#"{"username":"alice","currency":"USD","photo":null}"#).unwrap();
        assert_eq!(event.username, "alice");
    }

    #[test]
    fn username_is_required() {
        assert!(serde_json::from_str::<UserEvent>(r#"{"fullname":"Alice"}"#).is_err());
    }
}
