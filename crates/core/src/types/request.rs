//! Inbound paint request

use serde::{Deserialize, Serialize};

/// Paint submission as received from a client
///
/// Coordinates and color are kept as raw signed integers; range checks happen
/// inside the pipeline, after the token and cooldown checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaintRequest {
    pub x: i64,
    pub y: i64,
    pub color: i64,
    /// Identity token, `None` if the client sent none
    #[serde(default)]
    pub token: Option<String>,
}

impl PaintRequest {
    /// Create paint request
    pub fn new(x: i64, y: i64, color: i64, token: Option<String>) -> Self {
        Self { x, y, color, token }
    }

    /// Token, treating an empty string as absent
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_is_absent() {
        let req = PaintRequest::new(0, 0, 0, Some(String::new()));
        assert_eq!(req.token(), None);

        let req = PaintRequest::new(0, 0, 0, Some("A".to_string()));
        assert_eq!(req.token(), Some("A"));
    }

    #[test]
    fn test_token_optional_in_json() {
        let req: PaintRequest = serde_json::from_str(r#"{"x":1,"y":2,"color":3}"#).unwrap();
        assert_eq!(req, PaintRequest::new(1, 2, 3, None));
    }
}
