//! # kline-feed
//!
//! 行情源适配层：把 Binance 的历史接口与实时流转换为 `MarketDataProvider` 端口。

pub mod binance;

pub use binance::BinanceProvider;
