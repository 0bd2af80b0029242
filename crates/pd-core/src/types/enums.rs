//! Enumerations shared by the REST and push-channel layers.
//!
//! Wire spellings follow the backend (`"MARKET"`, `"PENDING"`, ...).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Order enums
// ---------------------------------------------------------------------------

/// Order type accepted by `POST /api/orders`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Filled immediately at the last traded price.
    #[default]
    Market,
    /// Parked as pending until the limit price is reached.
    Limit,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
        }
    }
}

impl std::str::FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MARKET" => Ok(Self::Market),
            "LIMIT" => Ok(Self::Limit),
            other => Err(format!("unknown order type '{other}'")),
        }
    }
}

/// Buy or sell. The wire format encodes this as the sign of `quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Apply the side to an unsigned quantity. `None` if it does not fit
    /// the signed wire field.
    pub fn signed(self, quantity: u64) -> Option<i64> {
        let q = i64::try_from(quantity).ok()?;
        match self {
            Self::Buy => Some(q),
            Self::Sell => q.checked_neg(),
        }
    }
}

/// Status reported for an order row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Executed,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Executed => write!(f, "EXECUTED"),
            Self::Unknown => write!(f, "?"),
        }
    }
}
