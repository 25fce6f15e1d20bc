use serde::{Deserialize, Serialize};

/// The signed-in user as exposed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub username: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        if self.username.trim().is_empty() {
            "User"
        } else {
            &self.username
        }
    }
}
