use crate::chart::error::ChartError;
use crate::market::entity::Candle;
use serde::{Deserialize, Serialize};

/// # Summary
/// 二维尺寸，单位由上下文决定（逻辑单位或设备像素）。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// 按像素密度缩放
    pub fn scaled(&self, ratio: f64) -> Self {
        Self {
            width: self.width * ratio,
            height: self.height * ratio,
        }
    }
}

/// 画布上的点，原点在左上角，y 轴向下
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 轴对齐矩形，`(x, y)` 为左上角
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// # Summary
/// CSS 风格的颜色字符串 (例如 `#2cbe84`)。
///
/// # Invariants
/// - 内容原样交给绘图表面，不做解析。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Color(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// # Summary
/// 图表配色。
///
/// # Invariants
/// - `bullish` 用于 `close >= open`，`bearish` 用于 `open > close`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    // 阳线 / 上涨
    pub bullish: Color,
    // 阴线 / 下跌
    pub bearish: Color,
    // 坐标轴、刻度与标签
    pub axis: Color,
    // 背景
    pub background: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bullish: Color::new("#2cbe84"),
            bearish: Color::new("#df2b49"),
            axis: Color::new("#4f5863"),
            background: Color::new("#15161b"),
        }
    }
}

impl Palette {
    /// 按阴阳线规则选色
    pub fn candle_color(&self, candle: &Candle) -> &Color {
        if candle.is_bearish() {
            &self.bearish
        } else {
            &self.bullish
        }
    }
}

/// # Summary
/// 渲染器样式配置，所有尺寸均为逻辑单位，构造渲染器时按像素密度放大。
///
/// # Invariants
/// - 所有尺寸必须为有限正数（`candle_axis_gap` 允许为 0），由 `validate` 检查。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    // K 线实体宽度
    pub candle_width: f64,
    // 相邻 K 线间距
    pub spacing: f64,
    // 标签字号
    pub font_size: f64,
    // 画布右边缘到价格轴的距离（为标签预留的右侧边距）
    pub axis_offset: f64,
    // 最新一根 K 线到价格轴的距离
    pub candle_axis_gap: f64,
    // 刻度线长度
    pub tick_mark_length: f64,
    // 刻度线末端到标签文字的距离
    pub tick_label_offset: f64,
    pub palette: Palette,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            candle_width: 4.0,
            spacing: 2.0,
            font_size: 10.0,
            axis_offset: 80.0,
            candle_axis_gap: 10.0,
            tick_mark_length: 8.0,
            tick_label_offset: 4.0,
            palette: Palette::default(),
        }
    }
}

impl ChartStyle {
    /// # Summary
    /// 校验样式中的尺寸参数。
    ///
    /// # Logic
    /// 1. 必须为正的尺寸：K 线宽度、字号、价格轴偏移。
    /// 2. 允许为 0 的尺寸：间距、K 线与轴的间隙、刻度线长度、标签偏移。
    /// 3. 所有数值必须有限。
    ///
    /// # Returns
    /// 合法返回 Ok，否则返回 `ChartError::InvalidStyle`。
    pub fn validate(&self) -> Result<(), ChartError> {
        let positive = [
            ("candle_width", self.candle_width),
            ("font_size", self.font_size),
            ("axis_offset", self.axis_offset),
        ];
        let non_negative = [
            ("spacing", self.spacing),
            ("candle_axis_gap", self.candle_axis_gap),
            ("tick_mark_length", self.tick_mark_length),
            ("tick_label_offset", self.tick_label_offset),
        ];

        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidStyle(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidStyle(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
