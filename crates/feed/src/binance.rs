use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use kline_core::common::TimeFrame;
use kline_core::config::FeedConfig;
use kline_core::market::entity::{Candle, RawCandle};
use kline_core::market::error::MarketError;
use kline_core::market::port::{CandleStream, MarketDataProvider};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

// REST 接口单次最多返回的 K 线数量
const MAX_HISTORY_LIMIT: usize = 1000;

/// # Summary
/// Binance 行情提供者实现：REST 拉取历史，组合行情流推送实时 K 线。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端拉取历史。
/// - 使用 `tokio-tungstenite` 维持实时流，断线后按固定间隔重连。
#[derive(Clone)]
pub struct BinanceProvider {
    // 内部使用的 HTTP 客户端
    client: Client,
    // 历史 K 线接口地址
    rest_url: String,
    // 组合行情流地址
    stream_url: String,
    // 断线重连间隔
    reconnect_delay: Duration,
}

impl BinanceProvider {
    /// # Summary
    /// 按行情源配置创建提供者。
    ///
    /// # Logic
    /// 1. 配置 10 秒超时并初始化 reqwest 客户端。
    /// 2. 记录 REST 与 WebSocket 地址以及重连间隔。
    ///
    /// # Arguments
    /// * `config`: 行情源配置。
    ///
    /// # Returns
    /// 成功返回提供者，HTTP 客户端构建失败时返回 `MarketError::Network`。
    pub fn new(config: &FeedConfig) -> Result<Self, MarketError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| MarketError::Network(e.to_string()))?;

        Ok(Self {
            client,
            rest_url: config.rest_url.clone(),
            stream_url: config.stream_url.clone(),
            reconnect_delay: Duration::from_secs(config.reconnect_delay_secs),
        })
    }

    /// 组合流订阅地址，例如 `.../stream?streams=btcusdt@kline_1m`
    pub fn stream_url_for(&self, symbol: &str, timeframe: TimeFrame) -> String {
        format!(
            "{}?streams={}@kline_{}",
            self.stream_url,
            symbol.to_lowercase(),
            timeframe
        )
    }
}

/// # Summary
/// 组合流消息外层结构。
///
/// # Invariants
/// - 映射自 `{"stream": "...", "data": {...}}`。
#[derive(Deserialize, Debug)]
struct StreamEnvelope {
    data: KlineEvent,
}

/// K 线事件
#[derive(Deserialize, Debug)]
struct KlineEvent {
    #[serde(rename = "k")]
    kline: KlinePayload,
}

/// # Summary
/// K 线事件中的 K 线本体，价格字段为文本。
#[derive(Deserialize, Debug)]
struct KlinePayload {
    // 时间桶开始时间
    #[serde(rename = "t")]
    open_time: i64,
    #[serde(rename = "o")]
    open: String,
    #[serde(rename = "h")]
    high: String,
    #[serde(rename = "l")]
    low: String,
    #[serde(rename = "c")]
    close: String,
    // 该时间桶是否已收盘
    #[serde(rename = "x", default)]
    is_closed: bool,
}

/// # Summary
/// 解析 REST 历史接口的响应体。
///
/// # Logic
/// 1. 响应体为二维数组，每行形如 `[openTime, "o", "h", "l", "c", ...]`。
/// 2. 取前五个字段构造 `RawCandle`，再规范化为数值。
///
/// # Returns
/// 成功返回从旧到新的 K 线列表；任意一行不合法即返回 `MarketError::Parse`。
pub fn parse_history_rows(body: &str) -> Result<Vec<Candle>, MarketError> {
    let rows: Vec<Vec<Value>> =
        serde_json::from_str(body).map_err(|e| MarketError::Parse(e.to_string()))?;
    rows.iter()
        .map(|row| raw_from_row(row).and_then(|raw| raw.normalize()))
        .collect()
}

fn raw_from_row(row: &[Value]) -> Result<RawCandle, MarketError> {
    let [time, open, high, low, close, ..] = row else {
        return Err(MarketError::Parse(format!(
            "kline row has {} fields, expected at least 5",
            row.len()
        )));
    };
    let time = time
        .as_i64()
        .ok_or_else(|| MarketError::Parse(format!("open time is not an integer: {}", time)))?;

    Ok(RawCandle {
        time,
        open: field_text(open)?,
        high: field_text(high)?,
        low: field_text(low)?,
        close: field_text(close)?,
    })
}

fn field_text(value: &Value) -> Result<String, MarketError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(MarketError::Parse(format!(
            "price field is neither text nor number: {}",
            other
        ))),
    }
}

/// # Summary
/// 解析组合流推送的一条文本消息。
///
/// # Returns
/// 成功返回当前时间桶的最新 K 线，失败返回 `MarketError::Parse`。
pub fn parse_stream_message(text: &str) -> Result<Candle, MarketError> {
    let envelope: StreamEnvelope =
        serde_json::from_str(text).map_err(|e| MarketError::Parse(e.to_string()))?;
    let k = envelope.data.kline;
    let candle = RawCandle {
        time: k.open_time,
        open: k.open,
        high: k.high,
        low: k.low,
        close: k.close,
    }
    .normalize()?;
    debug!(time = candle.time, close = candle.close, closed = k.is_closed, "kline event");
    Ok(candle)
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    /// # Summary
    /// 从 Binance REST 接口拉取历史 K 线。
    ///
    /// # Logic
    /// 1. 组装 symbol（大写）、interval、limit 查询参数，limit 上限 1000。
    /// 2. 发起异步请求，非 2xx 状态视为网络错误。
    /// 3. 解析并规范化每一行，结果为空时返回 NotFound。
    ///
    /// # Arguments
    /// * `symbol`: 交易对。
    /// * `timeframe`: 周期。
    /// * `limit`: 数量上限。
    ///
    /// # Returns
    /// 成功返回 K 线列表，失败返回 MarketError。
    async fn fetch_history(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketError> {
        let symbol = symbol.to_uppercase();
        let interval = timeframe.to_string();
        let limit = limit.min(MAX_HISTORY_LIMIT).to_string();

        let resp = self
            .client
            .get(&self.rest_url)
            .query(&[
                ("symbol", symbol.as_str()),
                ("interval", interval.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        let candles = parse_history_rows(&body)?;
        if candles.is_empty() {
            return Err(MarketError::NotFound);
        }
        info!("Fetched {} {} candles for {}", candles.len(), interval, symbol);
        Ok(candles)
    }

    /// # Summary
    /// 订阅 Binance 组合流中的实时 K 线。
    ///
    /// # Logic
    /// 1. 创建异步通道 (mpsc)，启动后台任务维持 WebSocket 连接。
    /// 2. 文本帧解析为 K 线后推入通道；解析失败的消息记录后跳过。
    /// 3. 回应服务端 Ping；连接关闭或出错后等待重连间隔再重新连接。
    /// 4. 接收端被丢弃时任务退出。
    ///
    /// # Arguments
    /// * `symbol`: 交易对。
    /// * `timeframe`: 周期。
    ///
    /// # Returns
    /// 返回异步 K 线流 `CandleStream`。
    async fn subscribe_candles(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
    ) -> Result<CandleStream, MarketError> {
        let (tx, rx) = mpsc::channel(100);
        let url = self.stream_url_for(symbol, timeframe);
        let delay = self.reconnect_delay;

        tokio::spawn(async move {
            loop {
                match connect_async(url.as_str()).await {
                    Ok((ws, _)) => {
                        info!("Stream connected: {}", url);
                        let (mut write, mut read) = ws.split();
                        while let Some(msg) = read.next().await {
                            match msg {
                                Ok(Message::Text(text)) => match parse_stream_message(&text) {
                                    Ok(candle) => {
                                        if tx.send(candle).await.is_err() {
                                            return;
                                        }
                                    }
                                    Err(e) => warn!("Skipping stream message: {}", e),
                                },
                                Ok(Message::Ping(payload)) => {
                                    if let Err(e) = write.send(Message::Pong(payload)).await {
                                        warn!("Failed to answer ping: {}", e);
                                        break;
                                    }
                                }
                                Ok(Message::Close(frame)) => {
                                    info!("Stream closed by server: {:?}", frame);
                                    break;
                                }
                                Ok(_) => {}
                                Err(e) => {
                                    warn!("Stream error: {}", e);
                                    break;
                                }
                            }
                        }
                    }
                    Err(e) => warn!("Failed to connect to {}: {}", url, e),
                }

                if tx.is_closed() {
                    return;
                }
                warn!("Reconnecting in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_history_rows() {
        let body = r#"[
            [1700000000000,"100.0","105.0","95.0","102.0","12.5",1700000059999,"1250.0",10,"6.0","600.0","0"],
            [1700000060000,"102.0","106.5","101.0","103.25","8.0",1700000119999,"820.0",7,"4.0","410.0","0"]
        ]"#;
        let candles = parse_history_rows(body).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0], Candle::new(1_700_000_000_000, 100.0, 105.0, 95.0, 102.0));
        assert_eq!(candles[1].close, 103.25);
    }

    #[test]
    fn test_parse_history_accepts_numeric_prices() {
        let candles = parse_history_rows("[[1, 1.5, 2, 1, 1.75]]").unwrap();
        assert_eq!(candles[0], Candle::new(1, 1.5, 2.0, 1.0, 1.75));
    }

    #[test]
    fn test_parse_history_rejects_short_rows_and_garbage() {
        assert!(matches!(
            parse_history_rows(r#"[[1,"1","2"]]"#),
            Err(MarketError::Parse(_))
        ));
        assert!(matches!(
            parse_history_rows(r#"[[1,"x","2","1","1"]]"#),
            Err(MarketError::Parse(_))
        ));
        assert!(matches!(parse_history_rows("{}"), Err(MarketError::Parse(_))));
    }

    #[test]
    fn test_parse_stream_message() {
        let text = r#"{"stream":"btcusdt@kline_1m","data":{"e":"kline","E":1700000030000,"s":"BTCUSDT","k":{"t":1700000000000,"T":1700000059999,"s":"BTCUSDT","i":"1m","o":"101","c":"103","h":"106","l":"96","v":"1.0","x":false}}}"#;
        let candle = parse_stream_message(text).unwrap();
        assert_eq!(candle, Candle::new(1_700_000_000_000, 101.0, 106.0, 96.0, 103.0));
    }

    #[test]
    fn test_parse_stream_message_rejects_unrelated_payload() {
        assert!(parse_stream_message(r#"{"result":null,"id":1}"#).is_err());
    }

    #[test]
    fn test_stream_url() {
        rustls::crypto::ring::default_provider().install_default().ok();
        let provider = BinanceProvider::new(&FeedConfig::default()).unwrap();
        assert_eq!(
            provider.stream_url_for("BTCUSDT", TimeFrame::Minute5),
            "wss://stream.binance.com/stream?streams=btcusdt@kline_5m"
        );
    }
}
