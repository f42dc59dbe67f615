//! 测试替身：记录绘制原语的表面与可手动推送的行情源。
//! 仅在 `test-utils` feature 下编译。

use crate::chart::entity::{Color, Point, Rect, Size};
use crate::chart::port::Surface;
use crate::common::TimeFrame;
use crate::market::entity::Candle;
use crate::market::error::MarketError;
use crate::market::port::{CandleStream, MarketDataProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// 一次绘制调用
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Backing(Size),
    Rect { rect: Rect, color: Color },
    Line {
        from: Point,
        to: Point,
        color: Color,
        thickness: f64,
    },
    Text {
        at: Point,
        text: String,
        color: Color,
        font_size: f64,
    },
    Present,
}

/// # Summary
/// 记录所有绘制调用的内存表面。
///
/// # Invariants
/// - `set_backing_size` 会清空上一帧的记录，`frames` 统计已完成的帧数。
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    layout: Size,
    ratio: f64,
    ops: Vec<DrawOp>,
    frames: usize,
}

impl RecordingSurface {
    pub fn new(layout: Size, ratio: f64) -> Self {
        Self {
            layout,
            ratio,
            ops: Vec::new(),
            frames: 0,
        }
    }

    /// 模拟宿主环境的布局变化
    pub fn set_layout_size(&mut self, layout: Size) {
        self.layout = layout;
    }

    /// 当前帧的全部绘制调用
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn rects(&self) -> Vec<(Rect, Color)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { rect, color } => Some((*rect, color.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<(Point, Point, Color)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Line { from, to, color, .. } => Some((*from, *to, color.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<(Point, String, Color)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text {
                    at, text, color, ..
                } => Some((*at, text.clone(), color.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn backing_size(&self) -> Option<Size> {
        self.ops.iter().find_map(|op| match op {
            DrawOp::Backing(size) => Some(*size),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn layout_size(&self) -> Size {
        self.layout
    }

    fn pixel_ratio(&self) -> f64 {
        self.ratio
    }

    fn set_backing_size(&mut self, size: Size) {
        self.ops.clear();
        self.ops.push(DrawOp::Backing(size));
    }

    fn fill_rect(&mut self, rect: Rect, color: &Color) {
        self.ops.push(DrawOp::Rect {
            rect,
            color: color.clone(),
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: &Color, thickness: f64) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            color: color.clone(),
            thickness,
        });
    }

    fn draw_text(&mut self, at: Point, text: &str, color: &Color, font_size: f64) {
        self.ops.push(DrawOp::Text {
            at,
            text: text.to_string(),
            color: color.clone(),
            font_size,
        });
    }

    fn present(&mut self) {
        self.ops.push(DrawOp::Present);
        self.frames += 1;
    }
}

/// # Summary
/// 为测试提供的模拟行情驱动。
///
/// # Invariants
/// - 历史数据固定为构造时传入的列表。
/// - 实时流只能被消费一次，数据由 `push_candle` 手动推入。
pub struct MockProvider {
    // 预设的历史数据
    history: Vec<Candle>,
    // 实时流发送端
    price_tx: mpsc::UnboundedSender<Candle>,
    // 用于内部消费流
    price_rx: Arc<Mutex<mpsc::UnboundedReceiver<Candle>>>,
}

impl MockProvider {
    pub fn new(history: Vec<Candle>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            history,
            price_tx: tx,
            price_rx: Arc::new(Mutex::new(rx)),
        }
    }

    pub fn push_candle(&self, candle: Candle) {
        if self.price_tx.send(candle).is_err() {
            tracing::warn!("MockProvider stream already dropped");
        }
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn fetch_history(
        &self,
        _: &str,
        _: TimeFrame,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketError> {
        let skip = self.history.len().saturating_sub(limit);
        Ok(self.history[skip..].to_vec())
    }

    async fn subscribe_candles(&self, _: &str, _: TimeFrame) -> Result<CandleStream, MarketError> {
        let rx = self.price_rx.clone();
        let s = async_stream::stream! {
            let mut rx = rx.lock().await;
            while let Some(candle) = rx.recv().await {
                yield candle;
            }
        };
        Ok(Box::pin(s))
    }
}
