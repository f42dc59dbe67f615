use kline_core::chart::entity::Size;
use kline_core::chart::port::ResizeSource;
use kline_core::common::SubscriptionId;
use tracing::debug;

struct ResizeSubscription {
    id: SubscriptionId,
    callback: Box<dyn FnMut(Size)>,
}

/// # Summary
/// 进程内的尺寸变化事件源，宿主在布局变化时调用 `notify`。
///
/// # Invariants
/// - 监听器按注册顺序同步调用。
#[derive(Default)]
pub struct ResizeNotifier {
    subscribers: Vec<ResizeSubscription>,
    next_id: u64,
}

impl ResizeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 向所有监听器广播新的布局尺寸
    pub fn notify(&mut self, size: Size) {
        debug!(
            width = size.width,
            height = size.height,
            listeners = self.subscribers.len(),
            "resize"
        );
        for sub in self.subscribers.iter_mut() {
            (sub.callback)(size);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl ResizeSource for ResizeNotifier {
    fn subscribe(&mut self, listener: Box<dyn FnMut(Size)>) -> SubscriptionId {
        let id = SubscriptionId::next(&mut self.next_id);
        self.subscribers.push(ResizeSubscription {
            id,
            callback: listener,
        });
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if let Some(idx) = self.subscribers.iter().position(|s| s.id == id) {
            self.subscribers.remove(idx);
            true
        } else {
            false
        }
    }
}
