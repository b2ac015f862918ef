use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_deserialization() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{
                "username": "wes",
                "email": "wes@example.com",
                "password": "secret-password",
                "password2": "secret-password",
                "first_name": "Wes",
                "last_name": "Doe"
            }"#,
        )
        .unwrap();

        assert_eq!(request.username, "wes");
        assert_eq!(request.password, request.password2);
        assert_eq!(request.last_name, "Doe");
    }

    #[test]
    fn test_login_request_missing_fields_default_to_empty() {
        let request: LoginRequest = serde_json::from_str(r#"{"username": "wes"}"#).unwrap();

        assert_eq!(request.username, "wes");
        assert!(request.password.is_empty());
    }
}
