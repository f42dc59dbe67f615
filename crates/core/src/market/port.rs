use crate::common::TimeFrame;
use crate::market::entity::Candle;
use crate::market::error::MarketError;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// # Summary
/// K 线数据流别名，使用动态分发的异步流。
pub type CandleStream = Pin<Box<dyn Stream<Item = Candle> + Send>>;

/// # Summary
/// 市场行情数据提供者接口（原始数据源）。
///
/// # Invariants
/// - 交付给调用方的 K 线已经完成数值规范化。
/// - 历史数据按时间从旧到新排列。
/// - 实时流中的解析失败由实现者记录并跳过，不会终止流。
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// # Summary
    /// 获取最近一段历史 K 线。
    ///
    /// # Logic
    /// 1. 构建数据源请求。
    /// 2. 执行网络请求并把每一行规范化为 `Candle`。
    ///
    /// # Arguments
    /// * `symbol`: 交易对代码 (例如: btcusdt)。
    /// * `timeframe`: K 线周期。
    /// * `limit`: 请求的数量上限。
    ///
    /// # Returns
    /// 成功返回从旧到新的 K 线列表。
    async fn fetch_history(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketError>;

    /// # Summary
    /// 订阅实时 K 线流。
    ///
    /// # Logic
    /// 1. 建立长连接。
    /// 2. 每收到一条消息就推送当前时间桶的最新状态。
    ///
    /// # Arguments
    /// * `symbol`: 交易对代码。
    /// * `timeframe`: K 线周期。
    ///
    /// # Returns
    /// 成功返回异步流。
    async fn subscribe_candles(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
    ) -> Result<CandleStream, MarketError>;
}
