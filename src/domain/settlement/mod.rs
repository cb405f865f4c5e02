pub mod calculator;

pub use calculator::{split_deposit, SettlementBreakdown, SettlementError};
