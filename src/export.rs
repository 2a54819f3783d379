//! 导出：选择保存路径、渲染 1080×1080 PNG 并原子写入

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::ImageFormat;
use tempfile::NamedTempFile;

use crate::card::CardPreview;
use crate::error::ExportError;
use crate::render::{CardRenderer, EXPORT_SIZE};

/// 一次导出请求的结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// 用户取消了保存对话框
    Cancelled,
    Saved(PathBuf),
    /// 写入失败，附带错误描述
    Failed(String),
}

/// 建议文件名：当前时间 + .png（不含冒号，各平台都能直接保存）
pub fn suggested_file_name(now: DateTime<Local>) -> String {
    format!("{}.png", now.format("%Y-%m-%d %H-%M-%S"))
}

/// 渲染导出尺寸的位图，编码为 PNG，先写入同目录临时文件再改名覆盖目标
pub fn render_and_save(
    renderer: &mut CardRenderer,
    preview: &CardPreview,
    path: &Path,
) -> Result<(), ExportError> {
    let image = renderer.render(preview, EXPORT_SIZE)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        image.write_to(&mut writer, ImageFormat::Png)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    // PersistError 仍持有临时文件，只保留 io::Error 让临时文件立即删除
    tmp.persist(path).map_err(|e| ExportError::Persist(e.error))?;
    Ok(())
}

/// 处理「导出」按钮：`prompt` 返回 None 表示取消
pub fn export_requested(
    renderer: &mut CardRenderer,
    preview: &CardPreview,
    suggested_name: &str,
    prompt: impl FnOnce(&str) -> Option<PathBuf>,
) -> ExportOutcome {
    let Some(path) = prompt(suggested_name) else {
        log::debug!("export cancelled");
        return ExportOutcome::Cancelled;
    };

    log::info!("exporting card to {}", path.display());
    match render_and_save(renderer, preview, &path) {
        Ok(()) => {
            log::info!("card exported to {}", path.display());
            ExportOutcome::Saved(path)
        }
        Err(e) => {
            log::error!("failed to export card to {}: {}", path.display(), e);
            ExportOutcome::Failed(e.to_string())
        }
    }
}
