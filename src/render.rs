//! 卡片栅格化：关闭抗锯齿的文字渲染
//!
//! 字形覆盖率按阈值二值化（≥50% 记为文字颜色，否则保留背景），字形原点对齐整像素，
//! 因此输出中只有背景色与文字色，没有半透明的过渡像素。
//! cosmic-text 不暴露字体 hinting 开关，这一项无法关闭。

use cosmic_text::{
    Attrs, Buffer, Family, FontSystem, LayoutRun, Metrics, Shaping, SwashCache, SwashContent,
    SwashImage, Wrap,
};
use image::RgbaImage;

use crate::card::{Align, CardPreview, Field, Kerning, PreviewLabel, Rgba};
use crate::config::ComposerConfig;
use crate::error::ExportError;

/// 卡片逻辑尺寸（点），渲染时按目标像素尺寸缩放
pub const LOGICAL_SIZE: f32 = 540.0;
/// 导出 PNG 的边长（像素）
pub const EXPORT_SIZE: u32 = 1080;
/// 界面预览纹理的边长（像素）
pub const PREVIEW_SIZE: u32 = 540;

/// 左右留白（点）
const MARGIN: f32 = 32.0;
/// 标签之间的间距（点）
const LABEL_GAP: f32 = 12.0;
/// 覆盖率阈值
const COVERAGE_THRESHOLD: u8 = 128;

/// 各标签的字号（点）
fn font_size(field: Field) -> f32 {
    match field {
        Field::Word => 64.0,
        Field::FragmentedWord => 36.0,
        Field::Meaning => 26.0,
        Field::Example => 22.0,
    }
}

fn metrics(field: Field, scale: f32) -> Metrics {
    let size = font_size(field) * scale;
    Metrics::new(size, (size * 1.25).ceil())
}

fn card_attrs(family: Option<&str>) -> Attrs<'_> {
    match family {
        Some(name) => Attrs::new().family(Family::Name(name)),
        None => Attrs::new().family(Family::SansSerif),
    }
}

/// 字间距范围内、字符序号小于 `c` 的字符数
fn kerned_before(kerning: &Kerning, c: usize) -> usize {
    c.min(kerning.range.end).saturating_sub(kerning.range.start)
}

/// 一行内每个字形因字间距产生的右移量，以及整行增加的宽度
struct RunKerning {
    shifts: Vec<f32>,
    extra_width: f32,
}

impl RunKerning {
    fn compute(run: &LayoutRun<'_>, line_start: usize, kerning: Option<&Kerning>, scale: f32) -> Self {
        let Some(kerning) = kerning else {
            return Self {
                shifts: vec![0.0; run.glyphs.len()],
                extra_width: 0.0,
            };
        };
        let char_index = |byte: usize| line_start + run.text[..byte].chars().count();
        let spacing = kerning.spacing * scale;

        let run_start = run.glyphs.first().map(|g| char_index(g.start)).unwrap_or(line_start);
        let run_end = run.glyphs.last().map(|g| char_index(g.end)).unwrap_or(run_start);
        let base = kerned_before(kerning, run_start);

        let shifts = run
            .glyphs
            .iter()
            .map(|g| kerned_before(kerning, char_index(g.start)).saturating_sub(base) as f32 * spacing)
            .collect();
        let extra_width = kerned_before(kerning, run_end).saturating_sub(base) as f32 * spacing;
        Self { shifts, extra_width }
    }
}

/// RGBA8 画布
struct Canvas {
    size: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    fn filled(size: u32, color: Rgba) -> Self {
        let pixels = color.to_array().repeat((size as usize) * (size as usize));
        Self { size, pixels }
    }

    fn put(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.size as i32 || y >= self.size as i32 {
            return;
        }
        let i = ((y as usize) * (self.size as usize) + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&color);
    }

    /// 按阈值把字形位图画到 (x, y)，不做任何混合
    fn blit_glyph(&mut self, image: &SwashImage, x: i32, y: i32, color: Rgba) {
        let w = image.placement.width as usize;
        let h = image.placement.height as usize;
        let left = x + image.placement.left;
        let top = y - image.placement.top;
        for row in 0..h {
            for col in 0..w {
                let i = row * w + col;
                let pixel = match image.content {
                    SwashContent::Mask => {
                        (image.data[i] >= COVERAGE_THRESHOLD).then_some(color.to_array())
                    }
                    SwashContent::Color => {
                        let p = &image.data[i * 4..i * 4 + 4];
                        (p[3] >= COVERAGE_THRESHOLD).then_some([p[0], p[1], p[2], 255])
                    }
                    SwashContent::SubpixelMask => {
                        let p = &image.data[i * 4..i * 4 + 3];
                        let coverage = ((p[0] as u16 + p[1] as u16 + p[2] as u16) / 3) as u8;
                        (coverage >= COVERAGE_THRESHOLD).then_some(color.to_array())
                    }
                };
                if let Some(pixel) = pixel {
                    self.put(left + col as i32, top + row as i32, pixel);
                }
            }
        }
    }
}

/// 卡片渲染器，界面预览与导出共用
pub struct CardRenderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    family: Option<String>,
}

impl CardRenderer {
    pub fn new(config: &ComposerConfig) -> Self {
        let mut font_system = FontSystem::new();
        if let Some(path) = &config.font_path {
            match font_system.db_mut().load_font_file(path) {
                Ok(()) => log::info!("loaded card font {}", path.display()),
                Err(e) => log::warn!("failed to load font {}: {}", path.display(), e),
            }
        }
        let renderer = Self {
            font_system,
            swash_cache: SwashCache::new(),
            family: config.font_family.clone(),
        };
        if !renderer.has_fonts() {
            log::warn!("no font faces available, card text will not be drawn");
        }
        renderer
    }

    /// 字体库中是否至少有一个字体
    pub fn has_fonts(&self) -> bool {
        self.font_system.db().faces().next().is_some()
    }

    fn shape(&mut self, label: &PreviewLabel, scale: f32) -> Buffer {
        let width = (LOGICAL_SIZE - MARGIN * 2.0) * scale;
        let mut buffer = Buffer::new(&mut self.font_system, metrics(label.field, scale));
        buffer.set_size(&mut self.font_system, Some(width), None);
        buffer.set_wrap(&mut self.font_system, Wrap::WordOrGlyph);
        let attrs = card_attrs(self.family.as_deref());
        buffer.set_text(&mut self.font_system, &label.text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    /// 渲染为 `size`×`size` 的 RGBA 位图
    pub fn render(&mut self, preview: &CardPreview, size: u32) -> Result<RgbaImage, ExportError> {
        let scale = size as f32 / LOGICAL_SIZE;
        let mut canvas = Canvas::filled(size, preview.background);

        let buffers: Vec<Buffer> = preview
            .labels
            .iter()
            .map(|label| self.shape(label, scale))
            .collect();
        let heights: Vec<f32> = buffers
            .iter()
            .map(|b| b.layout_runs().count().max(1) as f32 * b.metrics().line_height)
            .collect();
        let gap = LABEL_GAP * scale;
        let total = heights.iter().sum::<f32>() + gap * (heights.len() - 1) as f32;

        let mut top = ((size as f32 - total) / 2.0).max(0.0);
        for ((label, buffer), height) in preview.labels.iter().zip(&buffers).zip(&heights) {
            self.draw_label(&mut canvas, label, buffer, top, scale);
            top += height + gap;
        }

        RgbaImage::from_raw(size, size, canvas.pixels)
            .ok_or(ExportError::Surface { width: size, height: size })
    }

    fn draw_label(&mut self, canvas: &mut Canvas, label: &PreviewLabel, buffer: &Buffer, top: f32, scale: f32) {
        let margin = MARGIN * scale;
        let content_width = canvas.size as f32 - margin * 2.0;
        let line_starts = line_char_starts(&label.text);
        let kerning = label.style.kerning.as_ref();

        for run in buffer.layout_runs() {
            let line_start = line_starts.get(run.line_i).copied().unwrap_or(0);
            let kern = RunKerning::compute(&run, line_start, kerning, scale);
            let left = match label.style.align() {
                Align::Left => margin,
                Align::Center => margin + (content_width - run.line_w - kern.extra_width) / 2.0,
            };
            let baseline = (top + run.line_y).round();

            for (glyph, shift) in run.glyphs.iter().zip(&kern.shifts) {
                // 原点取整，避免亚像素定位
                let x = (left + glyph.x + shift).round();
                let physical = glyph.physical((x - glyph.x, baseline), 1.0);
                if let Some(image) = self
                    .swash_cache
                    .get_image(&mut self.font_system, physical.cache_key)
                {
                    canvas.blit_glyph(image, physical.x, physical.y, label.color);
                }
            }
        }
    }
}

/// 每个逻辑行首字符在全文中的字符序号
fn line_char_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    let mut count = 0;
    for line in text.split('\n') {
        count += line.chars().count() + 1;
        starts.push(count);
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardDraft, TextMode};

    fn renderer() -> CardRenderer {
        CardRenderer::new(&ComposerConfig::default())
    }

    fn sample_draft(mode: TextMode, background: Rgba) -> CardDraft {
        let mut draft = CardDraft::default();
        draft.input_changed(Field::Word, "Ephemeral");
        draft.input_changed(Field::FragmentedWord, "e·phem·er·al");
        draft.input_changed(Field::Meaning, "lasting for a very short time");
        draft.input_changed(Field::Example, "Fashions are ephemeral: new ones regularly drive out the old.");
        draft.set_text_mode(mode);
        draft.set_background(background);
        draft
    }

    fn count_color(image: &RgbaImage, color: [u8; 4]) -> usize {
        image.pixels().filter(|p| p.0 == color).count()
    }

    /// 指定颜色像素的水平跨度
    fn text_width(image: &RgbaImage, color: Rgba) -> i64 {
        let color = color.to_array();
        let xs: Vec<i64> = image
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 == color)
            .map(|(x, _, _)| x as i64)
            .collect();
        match (xs.iter().min(), xs.iter().max()) {
            (Some(min), Some(max)) => max - min + 1,
            _ => 0,
        }
    }

    #[test]
    fn empty_card_is_solid_background() {
        let preview = CardDraft::default().preview();
        let image = renderer().render(&preview, PREVIEW_SIZE).unwrap();
        assert_eq!(image.dimensions(), (PREVIEW_SIZE, PREVIEW_SIZE));
        assert!(image.pixels().all(|p| p.0 == [204, 153, 204, 255]));
    }

    #[test]
    fn export_surface_has_no_blended_pixels() {
        let mut renderer = renderer();
        for (mode, background) in [
            (TextMode::Light, Rgba::rgb(40, 90, 160)),
            (TextMode::Dark, Rgba::rgb(250, 240, 200)),
        ] {
            let preview = sample_draft(mode, background).preview();
            let image = renderer.render(&preview, EXPORT_SIZE).unwrap();
            assert_eq!(image.dimensions(), (1080, 1080));

            let text = mode.text_color().to_array();
            let bg = background.to_array();
            let blended = image.pixels().filter(|p| p.0 != text && p.0 != bg).count();
            assert_eq!(blended, 0, "found anti-aliased pixels for {:?}", mode);
            if renderer.has_fonts() {
                assert!(count_color(&image, text) > 0, "no text drawn for {:?}", mode);
            }
        }
    }

    #[test]
    fn letter_spacing_widens_word() {
        let mut renderer = renderer();
        if !renderer.has_fonts() {
            return;
        }
        let mut draft = CardDraft::default();
        draft.input_changed(Field::Word, "MMMMM");
        let kerned = draft.preview();
        let mut plain = kerned.clone();
        plain.labels[0].style.kerning = None;

        let kerned_width = text_width(&renderer.render(&kerned, EXPORT_SIZE).unwrap(), Rgba::WHITE);
        let plain_width = text_width(&renderer.render(&plain, EXPORT_SIZE).unwrap(), Rgba::WHITE);
        // 4 个间距 × 1.25 点 × 2 倍缩放 = 10 像素，允许取整误差
        let extra = kerned_width - plain_width;
        assert!((9..=11).contains(&extra), "kerned {} plain {}", kerned_width, plain_width);
    }

    #[test]
    fn translucent_background_is_kept_verbatim() {
        let background = Rgba { r: 10, g: 200, b: 30, a: 90 };
        let preview = sample_draft(TextMode::Dark, background).preview();
        let mut renderer = renderer();
        let image = renderer.render(&preview, PREVIEW_SIZE).unwrap();
        assert!(
            image
                .pixels()
                .all(|p| p.0 == background.to_array() || p.0 == [20, 20, 20, 255])
        );
        if renderer.has_fonts() {
            assert!(count_color(&image, [20, 20, 20, 255]) > 0);
        }
    }

    #[test]
    fn kerned_before_counts_only_range() {
        let kerning = Kerning { spacing: 1.25, range: 0..4 };
        assert_eq!(kerned_before(&kerning, 0), 0);
        assert_eq!(kerned_before(&kerning, 3), 3);
        assert_eq!(kerned_before(&kerning, 4), 4);
        // 最后一个字符之后不再加间距
        assert_eq!(kerned_before(&kerning, 5), 4);
    }

    #[test]
    fn line_starts_follow_newlines() {
        assert_eq!(line_char_starts("ab\ncde\n"), vec![0, 3, 7, 8]);
        assert_eq!(line_char_starts(""), vec![0, 1]);
    }
}
