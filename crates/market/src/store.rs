use kline_core::common::SubscriptionId;
use kline_core::market::entity::Candle;
use tracing::debug;

/// 序列变更监听器，收到的是本次更新后的完整序列
pub type SeriesListener = Box<dyn FnMut(&[Candle])>;

/// # Summary
/// 实时推送落入序列的方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    // 新的时间桶，追加到末尾
    Appended,
    // 仍是当前时间桶，原地替换最后一根
    Replaced,
}

struct Subscriber {
    id: SubscriptionId,
    callback: SeriesListener,
}

/// # Summary
/// K 线序列仓库，序列的唯一写入者。
///
/// # Invariants
/// - 序列按时间从旧到新排列，相邻两根不共享时间戳。
/// - 监听器按注册顺序同步调用，且只会看到已完整应用的更新。
pub struct DataStore {
    // 规范序列
    series: Vec<Candle>,
    // 已注册的监听器，保持注册顺序
    subscribers: Vec<Subscriber>,
    // 下一个订阅句柄
    next_id: u64,
}

impl DataStore {
    /// # Summary
    /// 以初始历史数据创建仓库。
    ///
    /// # Arguments
    /// * `series`: 从旧到新排列的历史 K 线。
    pub fn new(series: Vec<Candle>) -> Self {
        Self {
            series,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// # Summary
    /// 整体替换序列（仅用于初始加载）。
    ///
    /// # Logic
    /// 直接替换内部序列，不通知监听器。
    pub fn set_data(&mut self, series: Vec<Candle>) {
        debug!(len = series.len(), "series replaced");
        self.series = series;
    }

    /// 当前序列的只读视图
    pub fn data(&self) -> &[Candle] {
        &self.series
    }

    /// 最新一根 K 线
    pub fn latest(&self) -> Option<&Candle> {
        self.series.last()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// # Summary
    /// 注册序列变更监听器。
    ///
    /// # Arguments
    /// * `listener`: 每次实时更新后以完整序列调用的回调。
    ///
    /// # Returns
    /// 用于 `unsubscribe` 的句柄。
    pub fn subscribe(&mut self, listener: impl FnMut(&[Candle]) + 'static) -> SubscriptionId {
        let id = SubscriptionId::next(&mut self.next_id);
        self.subscribers.push(Subscriber {
            id,
            callback: Box::new(listener),
        });
        id
    }

    /// 注销监听器，句柄存在时返回 true
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match self.subscribers.iter().position(|s| s.id == id) {
            Some(idx) => {
                self.subscribers.remove(idx);
                true
            }
            None => false,
        }
    }

    /// # Summary
    /// 应用一条实时推送。
    ///
    /// # Logic
    /// 1. 取序列最后一根 K 线作为当前时间桶。
    /// 2. 时间戳不同（或序列为空）：新时间桶，追加到末尾。
    /// 3. 时间戳相同：当前时间桶仍未结束，原地替换最后一根。
    /// 4. 无论哪个分支，同步通知所有监听器。
    ///
    /// # Arguments
    /// * `record`: 已规范化的 K 线。
    ///
    /// # Returns
    /// 本次推送的落入方式。
    pub fn handle_stream_tick(&mut self, record: Candle) -> TickOutcome {
        let outcome = match self.series.last_mut() {
            Some(latest) if latest.time == record.time => {
                *latest = record;
                TickOutcome::Replaced
            }
            _ => {
                self.series.push(record);
                TickOutcome::Appended
            }
        };

        debug!(
            time = record.time,
            open_time = ?record.open_time(),
            close = record.close,
            ?outcome,
            len = self.series.len(),
            "stream tick applied"
        );

        self.notify();
        outcome
    }

    fn notify(&mut self) {
        let series = &self.series;
        for subscriber in self.subscribers.iter_mut() {
            (subscriber.callback)(series);
        }
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
