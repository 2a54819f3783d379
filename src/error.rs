//! 导出过程中的错误类型

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encode error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("could not move image into place: {0}")]
    Persist(std::io::Error),

    #[error("pixel buffer does not match a {width}x{height} surface")]
    Surface { width: u32, height: u32 },
}
