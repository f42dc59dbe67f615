use thiserror::Error;

/// # Summary
/// 图表域错误枚举。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 只在配置加载阶段产生；绘制过程本身没有失败路径。
#[derive(Error, Debug)]
pub enum ChartError {
    // 样式参数不合法（非正数、非有限值等）
    #[error("Invalid style: {0}")]
    InvalidStyle(String),
}
