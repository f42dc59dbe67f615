use crate::scale::{ceil_count, index_to_f64};

/// # Summary
/// 价格轴刻度：从 `min` 到 `max` 的等距取值。
///
/// # Invariants
/// - `values` 自下而上（从 `min` 到 `max`）排列。
/// - 步长为原始线性步长 `(max - min) / (count - 1)`，不做取整美化。
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTicks {
    pub values: Vec<f64>,
    pub step: f64,
}

impl AxisTicks {
    /// # Summary
    /// 计算给定高度可以容纳的标签数量。
    ///
    /// # Logic
    /// `ceil(height / (font_size + label_spacing))`，高度为 0 时为 0。
    pub fn count_for(height: f64, font_size: f64, label_spacing: f64) -> usize {
        ceil_count(height / (font_size + label_spacing))
    }

    /// # Summary
    /// 生成线性刻度。
    ///
    /// # Logic
    /// 1. `count == 0`：没有刻度。
    /// 2. `count == 1`：只有 `min` 一个刻度，步长 0。
    /// 3. 其余：`step = (max - min) / (count - 1)`，第 i 个刻度为 `min + i * step`。
    pub fn linear(min: f64, max: f64, count: usize) -> Self {
        match count {
            0 => Self {
                values: Vec::new(),
                step: 0.0,
            },
            1 => Self {
                values: vec![min],
                step: 0.0,
            },
            n => {
                let step = (max - min) / index_to_f64(n - 1);
                Self {
                    values: (0..n).map(|i| min + index_to_f64(i) * step).collect(),
                    step,
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 价格标签固定保留两位小数
pub fn format_label(value: f64) -> String {
    format!("{:.2}", value)
}
