use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

super::entity!(User, User, []);
