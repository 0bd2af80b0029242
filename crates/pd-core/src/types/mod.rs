//! Core data types: portfolio snapshots, order requests, price events, and
//! the view row model.

pub mod enums;
pub mod market_data;
pub mod portfolio;
pub mod row;
pub mod trading;

pub use enums::*;
pub use market_data::*;
pub use portfolio::*;
pub use row::*;
pub use trading::*;
