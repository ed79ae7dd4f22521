use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

super::entity!(Organization, Organization, []);
