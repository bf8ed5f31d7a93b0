use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ChatRole {
    #[serde(rename(deserialize = "system", serialize = "system"))]
    System,
    #[serde(rename(deserialize = "user", serialize = "user"))]
    User,
    #[serde(rename(deserialize = "assistant", serialize = "assistant"))]
    Assistant,
}

/// Outcome of comparing a token's `exp` claim with the current time.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Validity {
    /// `exp` is at or before now. `since` is how long ago it expired, in seconds.
    Expired { since: i64 },
    /// `exp` is after now. `remaining` is always positive, in seconds.
    Valid { remaining: i64 },
    /// The token carries no `exp` claim.
    Unknown,
}

impl Validity {
    pub fn from_exp(exp: Option<i64>, now: i64) -> Self {
        match exp {
            Some(exp) if exp <= now => Validity::Expired {
                since: now.saturating_sub(exp),
            },
            Some(exp) => Validity::Valid {
                remaining: exp.saturating_sub(now),
            },
            None => Validity::Unknown,
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Validity::Expired { .. })
    }
}
