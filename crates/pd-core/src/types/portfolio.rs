//! Portfolio snapshot types as served by the backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// One holding from `GET /api/portfolio`.
///
/// Owned by the server; the client keeps a read-only copy per snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPosition {
    /// Unique key within a snapshot.
    pub symbol: String,
    pub quantity: i64,
    /// Cost basis per unit.
    pub avg_price: Decimal,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
    /// `quantity × avg_price`, as reported by the server.
    #[serde(default)]
    pub position_size: Option<Decimal>,
}

impl PortfolioPosition {
    pub fn new(symbol: impl Into<String>, quantity: i64, avg_price: Decimal) -> Self {
        Self { symbol: symbol.into(), quantity, avg_price, notes: String::new(), position_size: None }
    }

    /// Money tied up in the position. Falls back to `quantity × avg_price`
    /// when the server omitted it.
    pub fn position_size(&self) -> Decimal {
        self.position_size.unwrap_or_else(|| self.avg_price * Decimal::from(self.quantity))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `GET /api/account`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub balance: Decimal,
}

/// `GET /api/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub account_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_row_with_null_notes() {
        let json = r#"{"symbol":"ABC","quantity":10,"avg_price":100.5,"notes":null,"position_size":1005.0}"#;
        let p: PortfolioPosition = serde_json::from_str(json).unwrap();
        assert_eq!(p.avg_price, Decimal::new(1005, 1));
        assert_eq!(p.notes, "");
        assert_eq!(p.position_size(), Decimal::from(1005));
    }

    #[test]
    fn position_size_derived_when_missing() {
        let p = PortfolioPosition::new("ABC", 4, Decimal::new(2550, 2));
        assert_eq!(p.position_size(), Decimal::from(102));
    }
}
