//! Authenticated subject

use serde::{Deserialize, Serialize};

/// The subject a token speaks for: numeric id plus display name.
///
/// Both parts participate in store keys, so two identities with the same id
/// but different names are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub user_name: String,
}

impl Identity {
    pub fn new(user_id: i64, user_name: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
        }
    }

    /// `<id>_<name>` fragment shared by the blacklist and refresh-index keys
    pub fn key_fragment(&self) -> String {
        format!("{}_{}", self.user_id, self.user_name)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.user_name, self.user_id)
    }
}
