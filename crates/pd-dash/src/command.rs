//! Line commands accepted from the console.
//!
//! ```text
//! buy  SYM QTY [MARKET|LIMIT] [PRICE]
//! sell SYM QTY [MARKET|LIMIT] [PRICE]
//! notes SYM
//! refresh
//! show [portfolio|orders|trades|account]
//! help
//! quit
//! ```

use pd_core::error::DashError;
use pd_core::types::Side;

use crate::dispatcher::OrderForm;

pub const HELP_TEXT: &str = "\
commands:
  buy  SYM QTY [MARKET|LIMIT] [PRICE]   place a buy order
  sell SYM QTY [MARKET|LIMIT] [PRICE]   place a sell order
  notes SYM                             edit notes for a holding
  refresh                               reload everything now
  show [portfolio|orders|trades|account]
  help
  quit";

/// A rendered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Portfolio,
    Orders,
    Trades,
    Account,
}

impl std::str::FromStr for View {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "portfolio" | "p" => Ok(Self::Portfolio),
            "orders" | "o" => Ok(Self::Orders),
            "trades" | "t" => Ok(Self::Trades),
            "account" | "a" => Ok(Self::Account),
            other => Err(DashError::InvalidInput(format!("unknown view '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Order(OrderForm),
    EditNotes { symbol: String },
    Refresh,
    Show(View),
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, DashError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let cmd = match head.to_ascii_lowercase().as_str() {
        "buy" => order(Side::Buy, &args)?,
        "sell" => order(Side::Sell, &args)?,
        "notes" => match args.as_slice() {
            [symbol] => Command::EditNotes { symbol: symbol.to_string() },
            _ => return Err(usage("notes SYM")),
        },
        "refresh" | "r" => Command::Refresh,
        "show" => match args.as_slice() {
            [] => Command::Show(View::Portfolio),
            [view] => Command::Show(view.parse()?),
            _ => return Err(usage("show [portfolio|orders|trades|account]")),
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(DashError::InvalidInput(format!("unknown command '{other}', try 'help'"))),
    };
    Ok(Some(cmd))
}

fn order(side: Side, args: &[&str]) -> Result<Command, DashError> {
    let (symbol, quantity, order_type, price) = match args {
        [s, q] => (s, q, None, None),
        [s, q, t] => (s, q, Some(t), None),
        [s, q, t, p] => (s, q, Some(t), Some(p)),
        _ => return Err(usage("buy|sell SYM QTY [MARKET|LIMIT] [PRICE]")),
    };
    Ok(Command::Order(OrderForm {
        side,
        symbol: symbol.to_string(),
        quantity: quantity.to_string(),
        order_type: order_type.map(|t| t.to_string()),
        price: price.map(|p| p.to_string()),
    }))
}

fn usage(text: &str) -> DashError {
    DashError::InvalidInput(format!("usage: {text}"))
}
