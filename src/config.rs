use crate::error::{OverlayError, OverlayResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 运行参数，可从 JSON 文件加载，缺省字段使用默认值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// OCR 语言代码
    pub language: String,
    /// 文字元素使用的字体
    pub font_family: String,
    /// 打字机动画每个字符的间隔（毫秒）
    pub typing_delay_ms: u64,
    /// 未选择文件时的提示
    pub no_file_message: String,
    /// 处理失败时的提示
    pub failure_message: String,
    /// 识别完成后是否把提取的文本交给打字机动画
    pub animate_extracted_text: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            font_family: "Arial, sans-serif".to_string(),
            typing_delay_ms: 100,
            no_file_message: "Por favor, selecione uma imagem.".to_string(),
            failure_message: "Erro ao processar a imagem.".to_string(),
            animate_extracted_text: false,
        }
    }
}

impl OverlayConfig {
    pub fn from_json(json: &str) -> OverlayResult<Self> {
        serde_json::from_str(json).map_err(|e| OverlayError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> OverlayResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| OverlayError::Config(format!("无法读取 {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }
}
