use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A server-assigned identifier.
///
/// Different deployments of the API hand out numeric or string IDs; both are
/// accepted and echoed back in the shape they arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Num(u64),
    Str(String),
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Self::Num(n)
    }
}

impl From<&str> for Id {
    /// Numeric strings become numeric IDs, so `"5"` typed on a command line
    /// matches the `5` the server sent.
    fn from(s: &str) -> Self {
        s.parse().map(Self::Num).unwrap_or_else(|_| Self::Str(s.to_string()))
    }
}
