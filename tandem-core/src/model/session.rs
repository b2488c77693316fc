use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of one call attempt. A fresh id is minted every time a
/// session (re)joins, so callbacks left over from an earlier attempt
/// can be told apart and dropped.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
