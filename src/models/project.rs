use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub organization: Option<String>, // ⇔ organizations.id
    #[serde(default)]
    pub archived: bool,
}

super::entity!(Project, Project, [organization]);
