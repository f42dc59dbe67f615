use crate::chart::entity::{ChartStyle, Size};
use crate::chart::error::ChartError;
use crate::common::TimeFrame;
use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub chart: ChartConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    // 交易对，小写 (例如: btcusdt)
    pub symbol: String,
    pub timeframe: TimeFrame,
    // 历史 K 线 REST 接口
    pub rest_url: String,
    // 组合行情流 WebSocket 地址
    pub stream_url: String,
    // 初始拉取的历史 K 线数量
    pub history_limit: usize,
    // 断线后重连前的等待秒数
    pub reconnect_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    // 布局宽度（逻辑单位）
    pub width: f64,
    // 布局高度（逻辑单位）
    pub height: f64,
    // 设备像素密度
    pub pixel_ratio: f64,
    // SVG 输出路径
    pub output: String,
    pub style: ChartStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    // 默认日志级别，RUST_LOG 优先
    pub level: String,
    // 滚动日志目录，为空则只输出到终端
    pub dir: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            symbol: "btcusdt".to_string(),
            timeframe: TimeFrame::Minute1,
            rest_url: "https://www.binance.com/api/v1/klines".to_string(),
            stream_url: "wss://stream.binance.com/stream".to_string(),
            history_limit: 500,
            reconnect_delay_secs: 5,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 600.0,
            pixel_ratio: 1.0,
            output: "chart.svg".to_string(),
            style: ChartStyle::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

impl ChartConfig {
    /// 布局尺寸（逻辑单位）
    pub fn layout_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// # Summary
    /// 校验图表配置。
    ///
    /// # Logic
    /// 1. 像素密度必须为有限正数。
    /// 2. 布局尺寸不得为负或非有限值。
    /// 3. 委托 `ChartStyle::validate` 校验样式。
    pub fn validate(&self) -> Result<(), ChartError> {
        if !self.pixel_ratio.is_finite() || self.pixel_ratio <= 0.0 {
            return Err(ChartError::InvalidStyle(format!(
                "pixel_ratio must be a positive number, got {}",
                self.pixel_ratio
            )));
        }
        if !self.width.is_finite() || !self.height.is_finite() || self.width < 0.0 || self.height < 0.0
        {
            return Err(ChartError::InvalidStyle(format!(
                "layout size must not be negative, got {}x{}",
                self.width, self.height
            )));
        }
        self.style.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.feed.symbol, "btcusdt");
        assert_eq!(config.feed.timeframe, TimeFrame::Minute1);
        assert_eq!(config.feed.history_limit, 500);
        assert_eq!(config.chart.pixel_ratio, 1.0);
        assert_eq!(config.chart.output, "chart.svg");
        assert_eq!(config.log.level, "info");
        assert!(config.log.dir.is_none());
        assert!(config.chart.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"feed":{"symbol":"ethusdt","timeframe":"5m"}}"#).unwrap();
        assert_eq!(config.feed.symbol, "ethusdt");
        assert_eq!(config.feed.timeframe, TimeFrame::Minute5);
        assert_eq!(config.feed.reconnect_delay_secs, 5);
        assert_eq!(config.chart.style.candle_width, 4.0);
    }

    #[test]
    fn test_invalid_pixel_ratio() {
        let config = ChartConfig {
            pixel_ratio: 0.0,
            ..ChartConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
