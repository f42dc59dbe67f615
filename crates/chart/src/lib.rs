//! # kline-chart
//!
//! 蜡烛图渲染管线：可见窗口选择、价格到像素的映射、价格轴刻度与绘制原语输出。
//! 渲染器只通过 `Surface` 端口输出，不持有任何业务数据的可变引用。

pub mod axis;
pub mod renderer;
pub mod resize;
pub mod scale;
pub mod svg;

pub use renderer::{ChartRenderer, Metrics, ScaledPoint};
pub use resize::ResizeNotifier;
pub use svg::SvgSurface;
