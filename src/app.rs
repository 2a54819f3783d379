//! egui 主界面：左侧输入与控件，右侧卡片预览，导出按钮

use eframe::egui;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::card::{CardDraft, CardPreview, Field, Rgba, TextMode};
use crate::config::ComposerConfig;
use crate::export::{self, ExportOutcome};
use crate::render::{CardRenderer, PREVIEW_SIZE};

/// 界面配色
mod theme {
    /// 左侧面板底色
    pub const PANEL_RGB: (u8, u8, u8) = (255, 255, 255);
    /// 右侧预览区底色
    pub const STAGE_RGB: (u8, u8, u8) = (236, 236, 240);
    /// 导出按钮
    pub const ACCENT_RGB: (u8, u8, u8) = (204, 153, 204);
    /// 次要文字
    pub const TEXT_DIM: (u8, u8, u8) = (110, 110, 120);
}

/// 左侧输入面板宽度
const INPUT_PANEL_WIDTH: f32 = 320.0;

/// 各平台常见的中日韩字体，保证输入框里的释义、例句不出现方框
#[cfg(windows)]
const SYSTEM_FONT_PATHS: &[&str] = &[
    r"C:\Windows\Fonts\msyh.ttc",
    r"C:\Windows\Fonts\simhei.ttf",
    r"C:\Windows\Fonts\simsun.ttc",
];
#[cfg(target_os = "macos")]
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Medium.ttc",
];
#[cfg(not(any(windows, target_os = "macos")))]
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
];

/// 界面字体：优先用配置的字体，其次系统字体，找不到则保持 egui 默认字体
fn install_ui_fonts(ctx: &egui::Context, config: &ComposerConfig) {
    let candidates = config
        .font_path
        .iter()
        .cloned()
        .chain(SYSTEM_FONT_PATHS.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else { continue };
        let mut fonts = egui::FontDefinitions::default();
        fonts
            .font_data
            .insert("ui".to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
        for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
            fonts.families.entry(family).or_default().insert(0, "ui".to_owned());
        }
        ctx.set_fonts(fonts);
        log::info!("ui font: {}", path.display());
        return;
    }
    log::warn!("no CJK font found, falling back to egui default fonts");
}

/// 跨会话保存的界面状态（只记上次导出目录，不保存卡片）
#[derive(Default, Serialize, Deserialize)]
struct PersistedState {
    last_export_dir: Option<PathBuf>,
}

/// 导出后的提示框
enum Notice {
    Saved(PathBuf),
    Failed(String),
}

pub struct WordRollsApp {
    config: ComposerConfig,
    draft: CardDraft,
    renderer: CardRenderer,
    texture: Option<egui::TextureHandle>,
    /// 当前纹理对应的预览，未变化时不重绘
    rendered: Option<CardPreview>,
    last_export_dir: Option<PathBuf>,
    notice: Option<Notice>,
}

impl WordRollsApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: ComposerConfig) -> Self {
        install_ui_fonts(&cc.egui_ctx, &config);
        let state: PersistedState = cc
            .storage
            .and_then(|s| eframe::get_value(s, eframe::APP_KEY))
            .unwrap_or_default();

        Self {
            renderer: CardRenderer::new(&config),
            config,
            draft: CardDraft::default(),
            texture: None,
            rendered: None,
            last_export_dir: state.last_export_dir,
            notice: None,
        }
    }

    fn field_label(field: Field) -> &'static str {
        match field {
            Field::Word => "单词",
            Field::FragmentedWord => "拆分",
            Field::Meaning => "释义",
            Field::Example => "例句",
        }
    }

    /// 草稿变化后重新渲染预览纹理
    fn refresh_preview(&mut self, ctx: &egui::Context) {
        let preview = self.draft.preview();
        if self.texture.is_some() && self.rendered.as_ref() == Some(&preview) {
            return;
        }
        let image = match self.renderer.render(&preview, PREVIEW_SIZE) {
            Ok(image) => image,
            Err(e) => {
                log::error!("preview render failed: {}", e);
                return;
            }
        };
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        match &mut self.texture {
            Some(texture) => texture.set(color_image, egui::TextureOptions::NEAREST),
            None => {
                self.texture =
                    Some(ctx.load_texture("card-preview", color_image, egui::TextureOptions::NEAREST));
            }
        }
        self.rendered = Some(preview);
    }

    /// 「导出」：弹出保存对话框，确认后渲染并写入
    fn export(&mut self) {
        let preview = self.draft.preview();
        let suggested = export::suggested_file_name(chrono::Local::now());
        let start_dir = self
            .last_export_dir
            .clone()
            .or_else(|| self.config.export_dir.clone());

        let outcome = export::export_requested(&mut self.renderer, &preview, &suggested, |name| {
            let mut dialog = rfd::FileDialog::new()
                .set_title("导出卡片")
                .set_file_name(name)
                .add_filter("PNG", &["png"])
                .set_can_create_directories(true);
            if let Some(dir) = &start_dir {
                dialog = dialog.set_directory(dir);
            }
            dialog.save_file()
        });

        self.notice = match outcome {
            ExportOutcome::Cancelled => None,
            ExportOutcome::Saved(path) => {
                self.last_export_dir = path.parent().map(|p| p.to_path_buf());
                Some(Notice::Saved(path))
            }
            ExportOutcome::Failed(message) => Some(Notice::Failed(message)),
        };
    }
}

impl eframe::App for WordRollsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_inputs(ctx);
        self.refresh_preview(ctx);
        self.ui_preview(ctx);

        if self.notice.is_some() {
            self.ui_notice(ctx);
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let state = PersistedState {
            last_export_dir: self.last_export_dir.clone(),
        };
        eframe::set_value(storage, eframe::APP_KEY, &state);
    }
}

impl WordRollsApp {
    fn ui_inputs(&mut self, ctx: &egui::Context) {
        use theme::{ACCENT_RGB, PANEL_RGB, TEXT_DIM};

        egui::SidePanel::left("inputs")
            .resizable(false)
            .exact_width(INPUT_PANEL_WIDTH)
            .frame(
                egui::Frame::NONE
                    .fill(egui::Color32::from_rgb(PANEL_RGB.0, PANEL_RGB.1, PANEL_RGB.2))
                    .inner_margin(egui::Margin::same(16)),
            )
            .show(ctx, |ui| {
                for field in Field::ALL {
                    ui.label(
                        egui::RichText::new(Self::field_label(field))
                            .color(egui::Color32::from_rgb(TEXT_DIM.0, TEXT_DIM.1, TEXT_DIM.2)),
                    );
                    // 输入框编辑的是草稿文本的副本，变化后写回草稿
                    let mut text = self.draft.text(field).to_owned();
                    let edit = match field {
                        Field::Word | Field::FragmentedWord => egui::TextEdit::singleline(&mut text),
                        Field::Meaning | Field::Example => {
                            egui::TextEdit::multiline(&mut text).desired_rows(3)
                        }
                    };
                    if ui.add(edit.desired_width(f32::INFINITY)).changed() {
                        self.draft.input_changed(field, &text);
                    }
                    ui.add_space(10.0);
                }

                ui.separator();
                ui.add_space(6.0);

                ui.horizontal(|ui| {
                    ui.label("底色");
                    let mut rgba = self.draft.background.to_array();
                    if ui.color_edit_button_srgba_unmultiplied(&mut rgba).changed() {
                        self.draft.set_background(Rgba::from_array(rgba));
                    }
                });
                ui.add_space(6.0);

                // 两段切换：白字 / 黑字
                ui.horizontal(|ui| {
                    ui.label("文字");
                    let current = match self.draft.text_mode {
                        TextMode::Light => 0,
                        TextMode::Dark => 1,
                    };
                    let mut segment = current;
                    ui.selectable_value(&mut segment, 0, "白字");
                    ui.selectable_value(&mut segment, 1, "黑字");
                    if segment != current {
                        self.draft.set_text_mode(TextMode::from_segment(segment));
                    }
                });
                ui.add_space(16.0);

                let export = egui::Button::new(
                    egui::RichText::new("导出 PNG").color(egui::Color32::WHITE).size(16.0),
                )
                .fill(egui::Color32::from_rgb(ACCENT_RGB.0, ACCENT_RGB.1, ACCENT_RGB.2))
                .min_size(egui::vec2(ui.available_width(), 36.0));
                if ui.add(export).on_hover_text("导出 1080×1080 图片").clicked() {
                    self.export();
                }
            });
    }

    fn ui_preview(&mut self, ctx: &egui::Context) {
        use theme::STAGE_RGB;

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::from_rgb(STAGE_RGB.0, STAGE_RGB.1, STAGE_RGB.2)))
            .show(ctx, |ui| {
                let Some(texture) = &self.texture else { return };
                let side = (ui.available_width().min(ui.available_height()) - 32.0).max(1.0);
                ui.centered_and_justified(|ui| {
                    ui.add(egui::Image::new(texture).fit_to_exact_size(egui::vec2(side, side)));
                });
            });
    }

    /// 导出结果提示框，成功与失败都提示
    fn ui_notice(&mut self, ctx: &egui::Context) {
        use theme::TEXT_DIM;

        let (title, body) = match &self.notice {
            Some(Notice::Saved(path)) => ("导出成功", format!("图片已保存到\n{}", path.display())),
            Some(Notice::Failed(message)) => ("导出失败", message.clone()),
            None => return,
        };
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(8.0);
                    ui.label(
                        egui::RichText::new(body)
                            .size(14.0)
                            .color(egui::Color32::from_rgb(TEXT_DIM.0, TEXT_DIM.1, TEXT_DIM.2)),
                    );
                    ui.add_space(12.0);
                    if ui.button("确定").clicked() {
                        self.notice = None;
                    }
                });
            });
    }
}
