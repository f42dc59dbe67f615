use kline_chart::{ChartRenderer, ResizeNotifier, SvgSurface};
use kline_core::chart::entity::{ChartStyle, Size};
use kline_core::chart::port::ResizeSource;
use kline_core::common::SubscriptionId;
use kline_core::market::entity::Candle;
use kline_market::{DataStore, TickOutcome};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

/// # Summary
/// 应用上下文，持有数据仓库、渲染器与尺寸事件源并完成三者之间的连线。
///
/// # Invariants
/// - 渲染器只通过仓库的通知或尺寸事件重绘，二者都在同一线程上同步完成。
/// - `shutdown` 之后不再有任何重绘。
pub struct ChartApp {
    store: DataStore,
    chart: Rc<RefCell<ChartRenderer<SvgSurface>>>,
    resize: ResizeNotifier,
    // 仓库监听器
    store_sub: Option<SubscriptionId>,
    // 尺寸监听器
    resize_sub: Option<SubscriptionId>,
}

impl ChartApp {
    /// # Summary
    /// 用历史数据构建上下文。
    ///
    /// # Logic
    /// 1. 用历史数据初始化仓库。
    /// 2. 构造渲染器（绘制首帧）。
    /// 3. 注册仓库监听器：序列变化时把快照交给渲染器。
    /// 4. 注册尺寸监听器：更新表面布局尺寸后重绘。
    pub fn new(history: Vec<Candle>, surface: SvgSurface, style: &ChartStyle) -> Self {
        let mut store = DataStore::new(history);
        let chart = Rc::new(RefCell::new(ChartRenderer::new(
            surface,
            style,
            store.data(),
        )));

        let sink = Rc::clone(&chart);
        let store_sub = store.subscribe(move |series: &[Candle]| sink.borrow_mut().set_data(series));

        let mut resize = ResizeNotifier::new();
        let target = Rc::clone(&chart);
        let resize_sub = resize.subscribe(Box::new(move |size: Size| {
            let mut chart = target.borrow_mut();
            chart.surface_mut().set_layout_size(size);
            chart.draw();
        }));

        info!(candles = store.len(), "chart context ready");
        Self {
            store,
            chart,
            resize,
            store_sub: Some(store_sub),
            resize_sub: Some(resize_sub),
        }
    }

    /// 把一条实时推送交给仓库
    pub fn on_tick(&mut self, candle: Candle) -> TickOutcome {
        self.store.handle_stream_tick(candle)
    }

    /// 宿主布局尺寸变化
    pub fn resize(&mut self, size: Size) {
        self.resize.notify(size);
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// 渲染器的共享句柄
    pub fn chart(&self) -> Rc<RefCell<ChartRenderer<SvgSurface>>> {
        Rc::clone(&self.chart)
    }

    /// # Summary
    /// 注销全部监听器，之后的推送与尺寸变化不再触发重绘。
    pub fn shutdown(&mut self) {
        if let Some(id) = self.store_sub.take() {
            self.store.unsubscribe(id);
        }
        if let Some(id) = self.resize_sub.take() {
            self.resize.unsubscribe(id);
        }
        info!("chart context shut down");
    }
}
