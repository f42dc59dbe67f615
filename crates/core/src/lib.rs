//! # kline-core
//!
//! 行情图表系统的领域内核：实体、端口 (Trait) 与错误定义。
//! 具体实现（数据仓库、渲染器、行情源）位于各自的 crate 中，只依赖这里的抽象。

pub mod common;
pub mod config;

pub mod market {
    pub mod entity;
    pub mod error;
    pub mod port;
}

pub mod chart {
    pub mod entity;
    pub mod error;
    pub mod port;
}

#[cfg(feature = "test-utils")]
pub mod testing;
