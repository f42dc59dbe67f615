use kline_core::chart::entity::{Color, Point, Rect, Size};
use kline_core::chart::port::Surface;
use std::path::PathBuf;
use tracing::warn;

/// # Summary
/// 把每一帧输出为 SVG 文档的绘图表面。
///
/// # Invariants
/// - `set_backing_size` 开始新的一帧并丢弃未提交的内容。
/// - `present` 时若配置了输出路径则整帧写入文件；写入失败只记录日志。
pub struct SvgSurface {
    // 布局尺寸（逻辑单位）
    layout: Size,
    ratio: f64,
    // 输出文件，None 表示只保存在内存中
    output: Option<PathBuf>,
    // 当前帧的后备尺寸（设备像素）
    backing: Size,
    // 当前帧已绘制的元素
    body: String,
    // 最近一次提交的完整文档
    last_frame: String,
}

impl SvgSurface {
    pub fn new(layout: Size, ratio: f64, output: Option<PathBuf>) -> Self {
        Self {
            layout,
            ratio,
            output,
            backing: Size::default(),
            body: String::new(),
            last_frame: String::new(),
        }
    }

    /// 宿主布局变化时更新逻辑尺寸
    pub fn set_layout_size(&mut self, layout: Size) {
        self.layout = layout;
    }

    /// 最近一次提交的 SVG 文档
    pub fn last_frame(&self) -> &str {
        &self.last_frame
    }

    fn document(&self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = self.backing.width,
            h = self.backing.height,
            body = self.body
        )
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl Surface for SvgSurface {
    fn layout_size(&self) -> Size {
        self.layout
    }

    fn pixel_ratio(&self) -> f64 {
        self.ratio
    }

    fn set_backing_size(&mut self, size: Size) {
        self.backing = size;
        self.body.clear();
    }

    fn fill_rect(&mut self, rect: Rect, color: &Color) {
        self.body.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            escape(color.as_str())
        ));
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: &Color, thickness: f64) {
        self.body.push_str(&format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>\n",
            from.x,
            from.y,
            to.x,
            to.y,
            escape(color.as_str()),
            thickness
        ));
    }

    fn draw_text(&mut self, at: Point, text: &str, color: &Color, font_size: f64) {
        self.body.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" fill=\"{}\" font-size=\"{}\" font-family=\"arial\" dominant-baseline=\"middle\">{}</text>\n",
            at.x,
            at.y,
            escape(color.as_str()),
            font_size,
            escape(text)
        ));
    }

    fn present(&mut self) {
        self.last_frame = self.document();
        if let Some(path) = &self.output
            && let Err(e) = std::fs::write(path, &self.last_frame)
        {
            warn!("failed to write chart frame to {}: {}", path.display(), e);
        }
    }
}
