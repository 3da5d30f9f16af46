use super::UserId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub title: String,
}
