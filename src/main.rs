//! Word Rolls — 单词卡片制作工具（Rust + egui）

mod app;
mod card;
mod config;
mod error;
mod export;
mod render;

use config::ComposerConfig;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ComposerConfig::from_env();
    log::debug!("config: {:?}", config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 600.0])
            .with_min_inner_size([720.0, 480.0])
            .with_title("Word Rolls"),
        ..Default::default()
    };
    eframe::run_native(
        "Word Rolls",
        options,
        Box::new(|cc| Ok(Box::new(app::WordRollsApp::new(cc, config)))),
    )
}
