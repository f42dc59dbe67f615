use crate::chart::entity::{Color, Point, Rect, Size};
use crate::common::SubscriptionId;

/// # Summary
/// 绘图表面接口：渲染器唯一的输出通道。
///
/// # Invariants
/// - 坐标原点在左上角，y 轴向下，单位为设备像素。
/// - 所有绘制原语都是同步且不会失败的；输出失败由实现者自行记录。
pub trait Surface {
    /// 当前布局尺寸（逻辑单位）
    fn layout_size(&self) -> Size;

    /// 设备像素密度
    fn pixel_ratio(&self) -> f64;

    /// # Summary
    /// 设置本帧的后备缓冲区尺寸（设备像素）。
    ///
    /// # Logic
    /// 每次绘制开始时调用一次，实现者应丢弃上一帧的内容。
    fn set_backing_size(&mut self, size: Size);

    /// 填充矩形
    fn fill_rect(&mut self, rect: Rect, color: &Color);

    /// 描边线段
    fn stroke_line(&mut self, from: Point, to: Point, color: &Color, thickness: f64);

    /// 以 `at` 为左侧垂直居中基线绘制文字
    fn draw_text(&mut self, at: Point, text: &str, color: &Color, font_size: f64);

    /// 一帧绘制结束
    fn present(&mut self) {}
}

/// # Summary
/// 尺寸变化事件源。
///
/// # Invariants
/// - 监听器按注册顺序调用。
/// - 注销后的监听器不会再被调用。
pub trait ResizeSource {
    /// # Summary
    /// 注册尺寸变化监听器。
    ///
    /// # Arguments
    /// * `listener`: 收到新布局尺寸的回调。
    ///
    /// # Returns
    /// 用于注销的句柄。
    fn subscribe(&mut self, listener: Box<dyn FnMut(Size)>) -> SubscriptionId;

    /// # Summary
    /// 注销监听器。
    ///
    /// # Returns
    /// 句柄存在并被移除时返回 true。
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}
