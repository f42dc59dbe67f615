use kline_chart::ChartRenderer;
use kline_chart::ResizeNotifier;
use kline_core::chart::entity::{ChartStyle, Palette, Point, Rect, Size};
use kline_core::chart::port::ResizeSource;
use kline_core::market::entity::Candle;
use kline_core::testing::RecordingSurface;
use kline_market::DataStore;
use std::cell::RefCell;
use std::rc::Rc;

fn series(n: usize) -> Vec<Candle> {
    let mut out = Vec::with_capacity(n);
    let mut time = 0_i64;
    let mut base = 100.0;
    for _ in 0..n {
        out.push(Candle::new(time, base, base + 3.0, base - 2.0, base + 1.0));
        time += 60_000;
        base = if base >= 106.0 { 100.0 } else { base + 1.0 };
    }
    out
}

fn renderer(layout: Size, ratio: f64, data: &[Candle]) -> ChartRenderer<RecordingSurface> {
    ChartRenderer::new(
        RecordingSurface::new(layout, ratio),
        &ChartStyle::default(),
        data,
    )
}

/// # Summary
/// 可见数量等于 ceil((W - A) / P)，且不超过可用数据量。
///
/// # Logic
/// 1. 默认样式下 A = 80，P = 6。
/// 2. 每根 K 线产生两个矩形（影线 + 实体），另有一个背景矩形。
#[test]
fn test_visible_window_count() {
    let layout = Size::new(680.0, 600.0);

    let chart = renderer(layout, 1.0, &series(500));
    assert_eq!(chart.visible_window(680.0).len(), 100);
    assert_eq!(chart.surface().rects().len(), 1 + 2 * 100);

    let chart = renderer(Size::new(683.0, 600.0), 1.0, &series(500));
    assert_eq!(chart.visible_window(683.0).len(), 101);

    let chart = renderer(layout, 1.0, &series(30));
    assert_eq!(chart.visible_window(680.0).len(), 30);
    assert_eq!(chart.surface().rects().len(), 1 + 2 * 30);
}

/// # Summary
/// 可见窗口从最新一根开始，按从新到旧排列。
#[test]
fn test_visible_window_is_newest_first() {
    let data = series(300);
    let chart = renderer(Size::new(680.0, 600.0), 1.0, &data);
    let window = chart.visible_window(680.0);
    assert_eq!(window.first(), data.last());
    assert_eq!(window.last(), Some(&data[200]));
}

/// # Summary
/// 单根 K 线的几何位置与纵向翻转。
///
/// # Logic
/// 1. 定义域为 [90, 110]，高度 600：high -> 600，low -> 0，open -> 300，close -> 450。
/// 2. 最新一根位于 680 - 80 - 10 = 590。
/// 3. 影线宽 1，居中；实体宽 4，居中；y 坐标为 高度 - 映射值。
#[test]
fn test_candle_geometry() {
    let data = [Candle::new(1, 100.0, 110.0, 90.0, 105.0)];
    let chart = renderer(Size::new(680.0, 600.0), 1.0, &data);
    let rects = chart.surface().rects();
    let palette = Palette::default();

    assert_eq!(rects[0], (Rect::new(0.0, 0.0, 680.0, 600.0), palette.background.clone()));
    assert_eq!(rects[1], (Rect::new(589.5, 0.0, 1.0, 600.0), palette.bullish.clone()));
    assert_eq!(rects[2], (Rect::new(588.0, 150.0, 4.0, 150.0), palette.bullish.clone()));

    let points = chart.scale_window(
        &data,
        kline_chart::scale::PriceRange { min: 90.0, max: 110.0 },
        Size::new(680.0, 600.0),
    );
    assert_eq!(points[0].x, 590.0);
    assert_eq!(points[0].high, 600.0);
    assert_eq!(points[0].low, 0.0);
}

/// # Summary
/// 后续 K 线按单位宽度向左排列。
#[test]
fn test_candles_step_leftwards() {
    let data = [
        Candle::new(1, 100.0, 110.0, 90.0, 105.0),
        Candle::new(2, 100.0, 110.0, 90.0, 105.0),
    ];
    let chart = renderer(Size::new(680.0, 600.0), 1.0, &data);
    let rects = chart.surface().rects();
    // 最新一根先绘制
    assert_eq!(rects[1].0.x, 589.5);
    assert_eq!(rects[3].0.x, 583.5);
}

/// # Summary
/// 阴阳线配色：open > close 为阴线，open <= close（含相等）为阳线。
#[test]
fn test_bullish_bearish_colors() {
    let data = [
        Candle::new(1, 10.0, 11.0, 7.0, 8.0),
        Candle::new(2, 9.0, 10.0, 8.0, 9.0),
        Candle::new(3, 8.0, 11.0, 7.5, 10.0),
    ];
    let chart = renderer(Size::new(680.0, 600.0), 1.0, &data);
    let rects = chart.surface().rects();
    let palette = Palette::default();

    // 绘制顺序：背景，然后从新到旧每根两个矩形
    assert_eq!(rects[1].1, palette.bullish);
    assert_eq!(rects[2].1, palette.bullish);
    assert_eq!(rects[3].1, palette.bullish, "open == close is bullish");
    assert_eq!(rects[4].1, palette.bullish);
    assert_eq!(rects[5].1, palette.bearish);
    assert_eq!(rects[6].1, palette.bearish);
}

/// # Summary
/// 价格轴：竖线、刻度数量、步长与最新价标签。
///
/// # Logic
/// 1. 高度 600，字号 10，标签间距 20：ceil(600 / 30) = 20 个刻度。
/// 2. 步长 = (110 - 90) / 19，自上而下从最高价开始。
/// 3. 最后额外绘制一个最新收盘价标签，按最新 K 线阴阳选色。
#[test]
fn test_axis_ticks() {
    let data = [
        Candle::new(1, 95.0, 110.0, 90.0, 100.0),
        Candle::new(2, 101.0, 104.0, 96.0, 97.5),
    ];
    let chart = renderer(Size::new(680.0, 600.0), 1.0, &data);
    let surface = chart.surface();
    let palette = Palette::default();

    let lines = surface.lines();
    assert_eq!(
        lines[0],
        (Point::new(600.0, 0.0), Point::new(600.0, 600.0), palette.axis.clone())
    );
    assert_eq!(lines.len(), 1 + 20 + 1);

    let texts = surface.texts();
    assert_eq!(texts.len(), 21);
    assert_eq!(texts[0].1, "110.00");
    assert_eq!(texts[0].0.x, 612.0);
    assert!(texts[0].0.y.abs() < 1e-9);
    assert_eq!(texts[19].1, "90.00");
    assert!((texts[19].0.y - 600.0).abs() < 1e-9);

    let step = (110.0 - 90.0) / 19.0;
    let values: Vec<f64> = texts[..20].iter().map(|t| t.1.parse().unwrap()).collect();
    for pair in values.windows(2) {
        assert!((pair[0] - pair[1] - step).abs() < 0.011);
    }

    let current = &texts[20];
    assert_eq!(current.1, "97.50");
    assert_eq!(current.2, palette.bearish);
    assert_eq!(lines[21].2, palette.bearish);
}

/// # Summary
/// 每次绘制都重新读取布局尺寸。
#[test]
fn test_redraw_after_resize_recomputes_size() {
    let mut chart = renderer(Size::new(680.0, 600.0), 1.0, &series(500));
    assert_eq!(chart.surface().backing_size(), Some(Size::new(680.0, 600.0)));

    chart.surface_mut().set_layout_size(Size::new(340.0, 300.0));
    chart.draw();

    assert_eq!(chart.surface().backing_size(), Some(Size::new(340.0, 300.0)));
    // ceil((340 - 80) / 6) = 44
    assert_eq!(chart.surface().rects().len(), 1 + 2 * 44);
    assert_eq!(chart.surface().frames(), 2);
}

/// # Summary
/// 高像素密度下所有尺寸按倍率放大。
#[test]
fn test_pixel_ratio_scaling() {
    let chart = renderer(Size::new(340.0, 300.0), 2.0, &series(500));
    let metrics = chart.metrics();
    assert_eq!(metrics.pixel_ratio, 2.0);
    assert_eq!(metrics.axis_offset, 160.0);
    assert_eq!(metrics.time_unit_width(), 12.0);
    assert_eq!(metrics.label_spacing, 40.0);
    assert_eq!(chart.surface().backing_size(), Some(Size::new(680.0, 600.0)));
    // ceil((680 - 160) / 12) = 44
    assert_eq!(chart.surface().rects().len(), 1 + 2 * 44);
    let texts = chart.surface().texts();
    // ceil(600 / (20 + 40)) = 10 个刻度 + 最新价
    assert_eq!(texts.len(), 11);
}

/// # Summary
/// 空序列只绘制背景与价格轴竖线。
#[test]
fn test_empty_series() {
    let chart = renderer(Size::new(680.0, 600.0), 1.0, &[]);
    let surface = chart.surface();
    assert_eq!(surface.rects().len(), 1);
    assert_eq!(surface.lines().len(), 1);
    assert!(surface.texts().is_empty());
    assert_eq!(surface.frames(), 1);
}

/// # Summary
/// 表面宽度不足以容纳任何 K 线时同样退化为空窗口。
#[test]
fn test_surface_narrower_than_axis() {
    let chart = renderer(Size::new(60.0, 600.0), 1.0, &series(10));
    assert!(chart.visible_window(60.0).is_empty());
    assert_eq!(chart.surface().rects().len(), 1);
}

/// # Summary
/// 价格区间为 0 时所有值落在中线上，刻度全部相同、步长为 0。
#[test]
fn test_flat_price_range() {
    let data = [Candle::new(1, 5.0, 5.0, 5.0, 5.0)];
    let chart = renderer(Size::new(680.0, 600.0), 1.0, &data);
    let rects = chart.surface().rects();
    assert_eq!(rects[1].0, Rect::new(589.5, 300.0, 1.0, 0.0));
    assert_eq!(rects[2].0, Rect::new(588.0, 300.0, 4.0, 0.0));

    let texts = chart.surface().texts();
    assert_eq!(texts.len(), 21);
    assert!(texts.iter().all(|t| t.1 == "5.00" && t.0.y == 300.0));
}

/// # Summary
/// 数据仓库的实时更新驱动渲染器重绘，渲染器只持有快照。
#[test]
fn test_store_drives_redraw() {
    let mut store = DataStore::new(vec![Candle::new(1, 100.0, 105.0, 95.0, 102.0)]);
    let chart = Rc::new(RefCell::new(renderer(
        Size::new(680.0, 600.0),
        1.0,
        store.data(),
    )));

    let sink = chart.clone();
    store.subscribe(move |series: &[Candle]| sink.borrow_mut().set_data(series));

    store.handle_stream_tick(Candle::new(1, 101.0, 106.0, 96.0, 103.0));
    assert_eq!(chart.borrow().surface().frames(), 2);
    assert_eq!(chart.borrow().data().len(), 1);
    assert_eq!(chart.borrow().data()[0].close, 103.0);

    store.handle_stream_tick(Candle::new(2, 103.0, 107.0, 100.0, 104.0));
    assert_eq!(chart.borrow().surface().frames(), 3);
    assert_eq!(chart.borrow().data().len(), 2);
    let texts = chart.borrow().surface().texts();
    assert_eq!(texts.last().map(|t| t.1.as_str()), Some("104.00"));
}

/// # Summary
/// 尺寸变化事件触发重绘，注销后不再触发。
#[test]
fn test_resize_subscription_redraws() {
    let chart = Rc::new(RefCell::new(renderer(Size::new(680.0, 600.0), 1.0, &series(50))));
    let mut resize = ResizeNotifier::new();

    let target = chart.clone();
    let id = resize.subscribe(Box::new(move |size: Size| {
        let mut chart = target.borrow_mut();
        chart.surface_mut().set_layout_size(size);
        chart.draw();
    }));

    resize.notify(Size::new(400.0, 200.0));
    assert_eq!(chart.borrow().surface().frames(), 2);
    assert_eq!(chart.borrow().surface().backing_size(), Some(Size::new(400.0, 200.0)));

    assert!(resize.unsubscribe(id));
    resize.notify(Size::new(800.0, 200.0));
    assert_eq!(chart.borrow().surface().frames(), 2);
}
