use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    pub body: String,
    pub created_at: String, // RFC 3339
}

super::entity!(Comment, Comment, [task, user]);
