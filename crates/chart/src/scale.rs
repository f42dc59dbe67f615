//! 归一化插值与计数换算。

use kline_core::market::entity::Candle;

/// 把 `value` 限制在 `[min, max]` 内
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// # Summary
/// 反向插值：求 `value` 在 `[min, max]` 中的相对位置。
///
/// # Logic
/// 1. 区间宽度为 0（或非法）时返回 0.5，使所有值落在中线上。
/// 2. 否则计算 `(value - min) / (max - min)` 并限制到 `[0, 1]`。
pub fn inverse_lerp(min: f64, max: f64, value: f64) -> f64 {
    let range = max - min;
    if range <= 0.0 || !range.is_finite() {
        return 0.5;
    }
    clamp((value - min) / range, 0.0, 1.0)
}

/// 正向插值：`t = 0` 得到 `min`，`t = 1` 得到 `max`
pub fn lerp(min: f64, max: f64, t: f64) -> f64 {
    min + (max - min) * t
}

/// 把价格映射为自底部起算的像素高度
pub fn map_to_height(min: f64, max: f64, value: f64, height: f64) -> f64 {
    inverse_lerp(min, max, value) * height
}

/// # Summary
/// 可见窗口的价格区间，作为本帧的纵向定义域。
///
/// # Invariants
/// - `min` 为窗口内最低价的最小值，`max` 为最高价的最大值。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// 空窗口返回 None
    pub fn of(window: &[Candle]) -> Option<Self> {
        let first = window.first()?;
        let init = PriceRange {
            min: first.low,
            max: first.high,
        };
        Some(window.iter().fold(init, |acc, c| PriceRange {
            min: acc.min.min(c.low),
            max: acc.max.max(c.high),
        }))
    }
}

/// # Summary
/// 把非负浮点数向上取整为计数。
///
/// # Logic
/// 非有限值或非正数视为 0。
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn ceil_count(value: f64) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.ceil() as usize
}

/// 下标转浮点，图表上的下标远小于 2^52
#[allow(clippy::cast_precision_loss)]
pub fn index_to_f64(index: usize) -> f64 {
    index as f64
}
