//! 启动配置：字体与默认导出目录，可由环境变量覆盖

use std::path::PathBuf;

pub const ENV_FONT: &str = "WORD_ROLLS_FONT";
pub const ENV_FONT_FAMILY: &str = "WORD_ROLLS_FONT_FAMILY";
pub const ENV_EXPORT_DIR: &str = "WORD_ROLLS_EXPORT_DIR";

#[derive(Clone, Debug, PartialEq)]
pub struct ComposerConfig {
    /// 额外加载的字体文件（卡片与界面共用）
    pub font_path: Option<PathBuf>,
    /// 卡片文字字体族，None 时用系统无衬线字体
    pub font_family: Option<String>,
    /// 保存对话框的初始目录
    pub export_dir: Option<PathBuf>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            font_family: None,
            export_dir: dirs::picture_dir(),
        }
    }
}

impl ComposerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 空字符串视为未设置
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            font_path: get(ENV_FONT).map(PathBuf::from),
            font_family: get(ENV_FONT_FAMILY),
            export_dir: get(ENV_EXPORT_DIR).map(PathBuf::from).or(defaults.export_dir),
        }
    }
}
