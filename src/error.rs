use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 处理流程的错误类型
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("未选择图片文件")]
    NoFileSelected,

    #[error("读取文件失败 {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("图片解码失败: {0}")]
    Decode(#[from] image::ImageError),

    #[error("OCR 识别失败: {0}")]
    Ocr(#[from] OcrError),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("后台任务失败: {0}")]
    Task(String),
}

/// OCR 引擎的错误类型
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR 引擎不可用: {0}")]
    EngineNotAvailable(String),

    #[error("OCR 处理失败: {0}")]
    Processing(String),

    #[error("不支持的语言: {0}")]
    InvalidLanguage(String),

    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),

    #[error("图片编码失败: {0}")]
    Encode(#[from] image::ImageError),
}

pub type OverlayResult<T> = Result<T, OverlayError>;

#[cfg(windows)]
impl From<windows::core::Error> for OcrError {
    fn from(err: windows::core::Error) -> Self {
        OcrError::Processing(format!("Windows API 错误: {err:?}"))
    }
}
