use super::{ValidationErrors, required_text};
use crate::client::ApiClient;
use crate::error::Result;
use crate::model::LoginRequest;
use crate::shell::Route;

pub const LOGIN_FAILED: &str = "Login failed";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> std::result::Result<LoginRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let username = required_text(&mut errors, "username", &self.username, "Username is required");
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result(LoginRequest {
            username,
            password: self.password.clone(),
        })
    }

    /// Exchange credentials for a token and open the session.
    ///
    /// Returns the route to navigate to (the dashboard).
    pub async fn submit(&self, client: &ApiClient) -> Result<Route> {
        let request = self.validate()?;
        let response = client.login(&request).await?;
        tracing::info!(username = %request.username, "logged in");
        client.session().login(response.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_fields_required() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert_eq!(errors.get("username"), Some("Username is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
    }

    #[test]
    fn test_password_is_not_trimmed() {
        let req = LoginForm::new(" admin ", " secret ").validate().unwrap();
        assert_eq!(req.username, "admin");
        assert_eq!(req.password, " secret ");
    }
}
