//! Push-channel frame parser.
//!
//! Decodes `price_update` events into [`PriceUpdate`]s. Two framings are
//! supported, selected by [`PushProtocol`]:
//!
//! - **Socket.IO** (Engine.IO v4): event packets look like
//!   `42["price_update",{"symbol":"NSE:SBIN-EQ","ltp":810.25}]`, optionally
//!   with a namespace (`42/market,[...]`) or an ack id (`421[...]`).
//! - **JSON**: either `{"event":"price_update","data":{...}}` or a bare
//!   `{"symbol":..,"ltp":..}` object.
//!
//! In both cases the payload may be a single object or an array of them.
//! Frames that carry no price (connect acks, control messages, other events)
//! produce an empty vector.

use pd_core::config::PushProtocol;
use pd_core::types::PriceUpdate;
use serde_json::Value;

use crate::json_util::parse_decimal_field;

/// Event name carrying price updates.
pub const PRICE_EVENT: &str = "price_update";

/// Parse one text frame into zero or more price updates.
pub fn parse_message(text: &str, protocol: PushProtocol) -> Vec<PriceUpdate> {
    match protocol {
        PushProtocol::SocketIo => parse_socketio(text),
        PushProtocol::Json => parse_json(text),
    }
}

fn parse_socketio(text: &str) -> Vec<PriceUpdate> {
    let Some((event, payload)) = socketio_event(text) else {
        return Vec::new();
    };
    if event != PRICE_EVENT {
        return Vec::new();
    }
    prices_from_payload(&payload)
}

/// Split a Socket.IO EVENT packet into `(name, first argument)`.
fn socketio_event(text: &str) -> Option<(String, Value)> {
    let mut rest = text.strip_prefix("42")?;
    if rest.starts_with('/') {
        rest = &rest[rest.find(',')? + 1..];
    }
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit());

    let mut args = match serde_json::from_str::<Value>(rest).ok()? {
        Value::Array(args) => args.into_iter(),
        _ => return None,
    };
    let name = args.next()?.as_str()?.to_string();
    Some((name, args.next().unwrap_or(Value::Null)))
}

fn parse_json(text: &str) -> Vec<PriceUpdate> {
    let Ok(v) = serde_json::from_str::<Value>(text) else {
        return Vec::new();
    };

    let event = v.get("event").or_else(|| v.get("type")).and_then(Value::as_str);
    match (event, v.get("data")) {
        (Some(PRICE_EVENT), Some(data)) => prices_from_payload(data),
        (Some(_), Some(_)) => Vec::new(),
        _ => prices_from_payload(&v),
    }
}

fn prices_from_payload(payload: &Value) -> Vec<PriceUpdate> {
    match payload {
        Value::Array(items) => items.iter().filter_map(price_from_object).collect(),
        Value::Object(_) => price_from_object(payload).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn price_from_object(v: &Value) -> Option<PriceUpdate> {
    let symbol = v.get("symbol")?.as_str()?;
    if symbol.is_empty() {
        return None;
    }
    let ltp = parse_decimal_field(v, &["ltp", "lp"])?;
    Some(PriceUpdate::new(symbol, ltp))
}
