use crate::application_port::{AuthError, CredentialVerifier};
use crate::domain_model::UserId;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct StaticAccount {
    pub user_id: UserId,
    pub username: String,
    pub password: String,
}

/// Accounts fixed at startup from settings. Stand-in for a real identity
/// backend; passwords are compared as given.
pub struct StaticCredentialVerifier {
    accounts: HashMap<String, StaticAccount>,
}

impl StaticCredentialVerifier {
    pub fn new(accounts: impl IntoIterator<Item = StaticAccount>) -> Self {
        StaticCredentialVerifier {
            accounts: accounts
                .into_iter()
                .map(|a| (a.username.clone(), a))
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for StaticCredentialVerifier {
    async fn verify(&self, username: &str, password: &str) -> Result<UserId, AuthError> {
        match self.accounts.get(username) {
            Some(account) if account.password == password => Ok(account.user_id),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}
