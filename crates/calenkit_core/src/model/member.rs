//! Member read model supplied by the member directory.

use serde::{Deserialize, Serialize};

/// Member identifier. Members are addressed by their login email.
pub type MemberId = String;

/// Directory entry for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    pub name: String,
}

impl Member {
    pub fn new(member_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            member_id: member_id.into(),
            name: name.into(),
        }
    }
}
