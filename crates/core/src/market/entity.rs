use crate::market::error::MarketError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 单根 K 线 (OHLC) 数据实体，记录一个时间桶内的价格波动。
///
/// # Invariants
/// - `low <= open, close <= high` 由上游数据保证，这里不做强制校验。
/// - 同一序列内 `time` 单调不减。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    // 时间桶开始时间 (Unix 毫秒)
    pub time: i64,
    // 开盘价
    pub open: f64,
    // 最高价
    pub high: f64,
    // 最低价
    pub low: f64,
    // 收盘价
    pub close: f64,
}

impl Candle {
    /// # Summary
    /// 以五元组构造 K 线。
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }

    /// 阴线判定：严格 `open > close` 为阴线，相等视为阳线
    pub fn is_bearish(&self) -> bool {
        self.open > self.close
    }

    /// # Summary
    /// 把毫秒时间戳转换为 UTC 时间，仅用于日志输出。
    ///
    /// # Returns
    /// 时间戳越界时返回 None。
    pub fn open_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time)
    }
}

/// # Summary
/// 行情源推送的原始 K 线，价格字段仍为文本。
///
/// # Invariants
/// - 进入数据仓库前必须经过 `normalize` 转换为数值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandle {
    // 时间桶开始时间 (Unix 毫秒)
    pub time: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
}

impl RawCandle {
    /// # Summary
    /// 把文本价格规范化为数值 K 线。
    ///
    /// # Logic
    /// 1. 逐个字段去除空白后按 `f64` 解析。
    /// 2. 拒绝无法解析或非有限的数值，并在错误中标明字段名。
    ///
    /// # Returns
    /// 成功返回 `Candle`，失败返回 `MarketError::Parse`。
    pub fn normalize(&self) -> Result<Candle, MarketError> {
        Ok(Candle {
            time: self.time,
            open: parse_price("open", &self.open)?,
            high: parse_price("high", &self.high)?,
            low: parse_price("low", &self.low)?,
            close: parse_price("close", &self.close)?,
        })
    }
}

fn parse_price(field: &str, text: &str) -> Result<f64, MarketError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| MarketError::Parse(format!("field `{}` is not numeric: {:?}", field, text)))?;
    if !value.is_finite() {
        return Err(MarketError::Parse(format!(
            "field `{}` is not finite: {:?}",
            field, text
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(open: &str) -> RawCandle {
        RawCandle {
            time: 1,
            open: open.to_string(),
            high: "105".to_string(),
            low: "95".to_string(),
            close: "102".to_string(),
        }
    }

    #[test]
    fn test_normalize_parses_text_prices() {
        let candle = raw(" 100.5 ").normalize().unwrap();
        assert_eq!(candle, Candle::new(1, 100.5, 105.0, 95.0, 102.0));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        let err = raw("abc").normalize().unwrap_err();
        assert!(matches!(err, MarketError::Parse(ref msg) if msg.contains("open")));
        assert!(raw("NaN").normalize().is_err());
    }

    #[test]
    fn test_bearish_rule() {
        assert!(Candle::new(0, 2.0, 3.0, 1.0, 1.5).is_bearish());
        assert!(!Candle::new(0, 2.0, 3.0, 1.0, 2.0).is_bearish());
        assert!(!Candle::new(0, 2.0, 3.0, 1.0, 2.5).is_bearish());
    }

    #[test]
    fn test_open_time() {
        let candle = Candle::new(1_700_000_000_000, 1.0, 1.0, 1.0, 1.0);
        assert_eq!(candle.open_time().map(|t| t.timestamp()), Some(1_700_000_000));
    }
}
