use crate::axis::{AxisTicks, format_label};
use crate::scale::{PriceRange, ceil_count, index_to_f64, map_to_height};
use kline_core::chart::entity::{ChartStyle, Color, Palette, Point, Rect, Size};
use kline_core::chart::port::Surface;
use kline_core::market::entity::Candle;
use tracing::{debug, trace};

/// # Summary
/// 按像素密度放大后的绘制尺寸，单位为设备像素。
///
/// # Invariants
/// - 构造后不变；布局尺寸变化不影响这些常量。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub pixel_ratio: f64,
    pub candle_width: f64,
    pub spacing: f64,
    pub font_size: f64,
    pub axis_offset: f64,
    pub candle_axis_gap: f64,
    pub tick_mark_length: f64,
    pub tick_label_offset: f64,
    // 相邻标签之间的留白，为字号的两倍
    pub label_spacing: f64,
    // 影线宽度固定 1 个设备像素
    pub shadow_width: f64,
}

impl Metrics {
    pub fn from_style(style: &ChartStyle, pixel_ratio: f64) -> Self {
        let font_size = style.font_size * pixel_ratio;
        Self {
            pixel_ratio,
            candle_width: style.candle_width * pixel_ratio,
            spacing: style.spacing * pixel_ratio,
            font_size,
            axis_offset: style.axis_offset * pixel_ratio,
            candle_axis_gap: style.candle_axis_gap * pixel_ratio,
            tick_mark_length: style.tick_mark_length * pixel_ratio,
            tick_label_offset: style.tick_label_offset * pixel_ratio,
            label_spacing: 2.0 * font_size,
            shadow_width: 1.0,
        }
    }

    /// 一个时间单位占用的宽度
    pub fn time_unit_width(&self) -> f64 {
        self.candle_width + self.spacing
    }

    /// # Summary
    /// 给定表面宽度时最多能容纳的 K 线数量。
    ///
    /// # Logic
    /// `ceil((width - axis_offset) / time_unit_width)`，宽度不足时为 0。
    pub fn max_candles(&self, width: f64) -> usize {
        ceil_count((width - self.axis_offset) / self.time_unit_width())
    }
}

/// # Summary
/// 单根 K 线映射到画布后的坐标。
///
/// # Invariants
/// - `open/high/low/close` 为自表面底部向上的像素高度。
/// - 只在单次绘制中存在，不做缓存。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledPoint {
    pub x: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// # Summary
/// 蜡烛图渲染器：把 K 线序列与表面尺寸确定性地映射为绘制原语。
///
/// # Invariants
/// - 只持有传入序列的快照副本，从不修改外部数据。
/// - 每次 `draw` 都从当前状态重新计算全部内容，可以随时重复调用。
pub struct ChartRenderer<S: Surface> {
    // 输出表面
    surface: S,
    // 设备像素下的尺寸常量
    metrics: Metrics,
    palette: Palette,
    // 最近一次传入的序列快照
    series: Vec<Candle>,
}

impl<S: Surface> ChartRenderer<S> {
    /// # Summary
    /// 创建渲染器并立即绘制首帧。
    ///
    /// # Logic
    /// 1. 读取表面的像素密度，把样式中的逻辑尺寸换算为设备像素。
    /// 2. 复制初始序列。
    /// 3. 执行一次完整绘制。
    ///
    /// # Arguments
    /// * `surface`: 输出表面。
    /// * `style`: 逻辑单位下的样式配置。
    /// * `series`: 初始序列。
    pub fn new(surface: S, style: &ChartStyle, series: &[Candle]) -> Self {
        let metrics = Metrics::from_style(style, surface.pixel_ratio());
        let mut renderer = Self {
            surface,
            metrics,
            palette: style.palette.clone(),
            series: series.to_vec(),
        };
        renderer.draw();
        renderer
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// 宿主通过它更新表面的布局尺寸
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// 当前持有的序列快照
    pub fn data(&self) -> &[Candle] {
        &self.series
    }

    /// # Summary
    /// 替换序列快照并重绘。
    pub fn set_data(&mut self, series: &[Candle]) {
        self.series.clear();
        self.series.extend_from_slice(series);
        self.draw();
    }

    /// 当前设备像素尺寸，每次调用都从布局尺寸重新计算
    pub fn surface_size(&self) -> Size {
        self.surface.layout_size().scaled(self.metrics.pixel_ratio)
    }

    /// # Summary
    /// 选出可见窗口。
    ///
    /// # Logic
    /// 从最新一根开始向前取 `max_candles(width)` 根，结果为从新到旧。
    pub fn visible_window(&self, width: f64) -> Vec<Candle> {
        let count = self.metrics.max_candles(width);
        self.series.iter().rev().take(count).copied().collect()
    }

    /// # Summary
    /// 把可见窗口映射为画布坐标。
    ///
    /// # Logic
    /// 1. 纵向：open/high/low/close 由 `[min, max]` 线性映射到 `[0, height]`。
    /// 2. 横向：第 i 根（0 为最新）位于 `width - i * 单位宽度`，
    ///    再左移价格轴偏移与 K 线到轴的间隙。
    pub fn scale_window(&self, window: &[Candle], range: PriceRange, size: Size) -> Vec<ScaledPoint> {
        let m = &self.metrics;
        let map = |v: f64| map_to_height(range.min, range.max, v, size.height);
        window
            .iter()
            .enumerate()
            .map(|(i, c)| ScaledPoint {
                x: size.width - index_to_f64(i) * m.time_unit_width() - m.axis_offset - m.candle_axis_gap,
                open: map(c.open),
                high: map(c.high),
                low: map(c.low),
                close: map(c.close),
            })
            .collect()
    }

    /// # Summary
    /// 完整重绘。
    ///
    /// # Logic
    /// 1. 由布局尺寸与像素密度重新计算表面尺寸（两次绘制之间可能发生 resize）。
    /// 2. 选出可见窗口。
    /// 3. 用背景色填满表面。
    /// 4. 以窗口内最低价/最高价作为本帧纵向定义域，映射并绘制每根 K 线。
    /// 5. 绘制价格轴竖线。
    /// 6. 绘制价格刻度与最新价标签。
    /// 7. 提交本帧。
    ///
    /// 窗口为空时只绘制背景与价格轴竖线。
    pub fn draw(&mut self) {
        let size = self.surface_size();
        self.surface.set_backing_size(size);

        let window = self.visible_window(size.width);

        self.surface.fill_rect(
            Rect::new(0.0, 0.0, size.width, size.height),
            &self.palette.background,
        );

        let range = PriceRange::of(&window);
        if let Some(range) = range {
            let points = self.scale_window(&window, range, size);
            for (candle, point) in window.iter().zip(points) {
                self.draw_candle(candle, point, size.height);
            }
        }

        self.draw_axis(size);

        if let (Some(range), Some(latest)) = (range, window.first()) {
            self.draw_axis_values(range, latest, size);
        }

        debug!(
            width = size.width,
            height = size.height,
            visible = window.len(),
            total = self.series.len(),
            "chart drawn"
        );
        self.surface.present();
    }

    fn draw_candle(&mut self, candle: &Candle, point: ScaledPoint, height: f64) {
        let color = self.palette.candle_color(candle).clone();
        let m = self.metrics;

        // 影线
        self.surface.fill_rect(
            Rect::new(
                point.x - m.shadow_width / 2.0,
                height - point.high,
                m.shadow_width,
                point.high - point.low,
            ),
            &color,
        );

        // 实体
        let body_top = point.open.max(point.close);
        let body_bottom = point.open.min(point.close);
        self.surface.fill_rect(
            Rect::new(
                point.x - m.candle_width / 2.0,
                height - body_top,
                m.candle_width,
                body_top - body_bottom,
            ),
            &color,
        );
    }

    fn axis_x(&self, size: Size) -> f64 {
        size.width - self.metrics.axis_offset
    }

    fn draw_axis(&mut self, size: Size) {
        let x = self.axis_x(size);
        self.surface.stroke_line(
            Point::new(x, 0.0),
            Point::new(x, size.height),
            &self.palette.axis,
            1.0,
        );
    }

    /// # Summary
    /// 绘制价格刻度与最新价标签。
    ///
    /// # Logic
    /// 1. 标签数量为 `ceil(height / (font_size + label_spacing))`。
    /// 2. 从最高价开始自上而下绘制每个刻度（刻度线 + 两位小数标签）。
    /// 3. 在最新收盘价处额外绘制一个高亮刻度，颜色按最新 K 线阴阳规则选择。
    fn draw_axis_values(&mut self, range: PriceRange, latest: &Candle, size: Size) {
        let m = self.metrics;
        let count = AxisTicks::count_for(size.height, m.font_size, m.label_spacing);
        let ticks = AxisTicks::linear(range.min, range.max, count);
        trace!(count = ticks.len(), step = ticks.step, "axis ticks");

        let axis_color = self.palette.axis.clone();
        for value in ticks.values.iter().rev() {
            self.draw_tick(*value, range, size, &axis_color);
        }

        let current_color = self.palette.candle_color(latest).clone();
        self.draw_tick(latest.close, range, size, &current_color);
    }

    fn draw_tick(&mut self, value: f64, range: PriceRange, size: Size, color: &Color) {
        let m = self.metrics;
        let x = self.axis_x(size);
        let y = size.height - map_to_height(range.min, range.max, value, size.height);

        self.surface.stroke_line(
            Point::new(x, y),
            Point::new(x + m.tick_mark_length, y),
            color,
            1.0,
        );
        self.surface.draw_text(
            Point::new(x + m.tick_mark_length + m.tick_label_offset, y),
            &format_label(value),
            color,
            m.font_size,
        );
    }
}
