//! # kline-market
//!
//! K 线序列的唯一持有者：处理实时推送的"更新或追加"策略并通知订阅者。

pub mod store;

pub use store::{DataStore, TickOutcome};
