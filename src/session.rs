//! Session context supplied by the caller
//!
//! The engine never authenticates. Whoever calls in states which role they act
//! as and under which display name, and the engine trusts it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One side of a negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Professional,
}

impl Role {
    /// The other side of the negotiation
    pub fn counterpart(self) -> Self {
        match self {
            Role::Customer => Role::Professional,
            Role::Professional => Role::Customer,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Professional => "professional",
        }
    }

    /// Name shown for a party that has not spoken in a thread yet
    pub fn placeholder_name(self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Professional => "Professional",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Role::Customer),
            "professional" | "pro" => Ok(Role::Professional),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The acting party for a single engine call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub role: Role,
    pub display_name: String,
}

impl Session {
    pub fn new(role: Role, display_name: impl Into<String>) -> Self {
        Self {
            role,
            display_name: display_name.into(),
        }
    }

    pub fn customer(display_name: impl Into<String>) -> Self {
        Self::new(Role::Customer, display_name)
    }

    pub fn professional(display_name: impl Into<String>) -> Self {
        Self::new(Role::Professional, display_name)
    }
}
