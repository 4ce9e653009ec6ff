//! OCR 引擎接口及其实现。

use crate::error::OcrError;
use crate::surface::Surface;
use crate::{BoundingBox, RecognizedWord};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// 识别过程中的进度信息
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    /// 当前阶段描述
    pub status: String,
    /// 0.0 ~ 1.0
    pub progress: f32,
}

impl Recognition {
    pub fn new(status: impl Into<String>, progress: f32) -> Self {
        Self {
            status: status.into(),
            progress,
        }
    }
}

/// 进度回调，只用于诊断日志
pub type ProgressFn = dyn Fn(Recognition) + Send + Sync;

/// 外部 OCR 引擎
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// 引擎标识
    fn name(&self) -> &'static str;

    /// 识别绘制表面上的文字
    ///
    /// # 参数
    /// - `surface` - 已绘制图片的画布，返回的坐标相对于它
    /// - `language` - 语言代码（如 "eng"）
    /// - `progress` - 进度回调
    async fn recognize(
        &self,
        surface: &Surface,
        language: &str,
        progress: &ProgressFn,
    ) -> Result<Vec<RecognizedWord>, OcrError>;
}

/// 调用本地安装的 `tesseract` 命令行
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: String,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// 获取已安装的语言列表
    pub async fn available_languages(&self) -> Result<Vec<String>, OcrError> {
        let output = Command::new(&self.program)
            .arg("--list-langs")
            .output()
            .await
            .map_err(|e| OcrError::EngineNotAvailable(format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Processing(stderr.trim().to_string()));
        }

        // 第一行是 "List of available languages ..."
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .skip(1)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognize(
        &self,
        surface: &Surface,
        language: &str,
        progress: &ProgressFn,
    ) -> Result<Vec<RecognizedWord>, OcrError> {
        // 形如 "eng"、"chi_sim"、"eng+por"
        let valid = !language.is_empty()
            && language
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '+');
        if !valid {
            return Err(OcrError::InvalidLanguage(language.to_string()));
        }

        progress(Recognition::new("encoding image", 0.0));
        let png = surface.to_png()?;

        progress(Recognition::new("recognizing text", 0.1));
        let mut child = Command::new(&self.program)
            .args(["stdin", "stdout", "-l", language, "tsv"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| OcrError::EngineNotAvailable(format!("{}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&png).await?;
            // 关闭 stdin，tesseract 才会开始处理
            drop(stdin);
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Processing(format!("tesseract 失败: {}", stderr.trim())));
        }

        let words = parse_tsv_words(&String::from_utf8_lossy(&output.stdout));
        debug!(count = words.len(), "tesseract finished");
        progress(Recognition::new("recognizing text", 1.0));
        Ok(words)
    }
}

/// 解析 tesseract 的 TSV 输出，只保留单词级（level 5）的行
fn parse_tsv_words(tsv: &str) -> Vec<RecognizedWord> {
    let mut words = Vec::new();

    // 第一行是表头
    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }

        let text = cols[11].trim();
        let conf: f32 = cols[10].parse().unwrap_or(-1.0);
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let parse = |s: &str| s.trim().parse::<u32>().ok();
        let (Some(left), Some(top), Some(width), Some(height)) =
            (parse(cols[6]), parse(cols[7]), parse(cols[8]), parse(cols[9]))
        else {
            continue;
        };

        words.push(RecognizedWord::new(
            text,
            BoundingBox::from_origin_size(left, top, width, height),
        ));
    }

    words
}

#[cfg(windows)]
pub use self::windows_ocr::WindowsOcr;

#[cfg(windows)]
mod windows_ocr {
    use super::{OcrEngine, ProgressFn, Recognition};
    use crate::error::OcrError;
    use crate::surface::Surface;
    use crate::{BoundingBox, RecognizedWord};
    use async_trait::async_trait;
    use windows::{
        core::HSTRING,
        Globalization::Language,
        Graphics::Imaging::BitmapDecoder,
        Media::Ocr::{OcrEngine as WinOcrEngine, OcrResult as WinOcrResult},
        Storage::Streams::{DataWriter, InMemoryRandomAccessStream},
    };

    /// Windows.Media.Ocr 引擎
    #[derive(Debug, Clone, Copy, Default)]
    pub struct WindowsOcr;

    impl WindowsOcr {
        /// 获取系统支持的 OCR 语言列表
        pub fn available_languages() -> Result<Vec<String>, OcrError> {
            let languages = WinOcrEngine::AvailableRecognizerLanguages()?;
            let count = languages.Size()?;

            let mut result = Vec::new();
            for i in 0..count {
                let lang = languages.GetAt(i)?;
                result.push(lang.LanguageTag()?.to_string());
            }

            Ok(result)
        }
    }

    /// Tesseract 风格的语言代码转换为 BCP-47 标签
    fn language_tag(language: &str) -> &str {
        match language {
            "eng" => "en-US",
            "por" => "pt-BR",
            "spa" => "es-ES",
            "fra" => "fr-FR",
            "deu" => "de-DE",
            "chi_sim" => "zh-Hans-CN",
            "chi_tra" => "zh-Hant-TW",
            "jpn" => "ja-JP",
            "kor" => "ko-KR",
            other => other,
        }
    }

    fn recognize_png(png: &[u8], language: &str) -> Result<Vec<RecognizedWord>, OcrError> {
        // 创建内存流并写入图片数据
        let stream = InMemoryRandomAccessStream::new()?;
        let writer = DataWriter::CreateDataWriter(&stream)?;
        writer.WriteBytes(png)?;
        writer.StoreAsync()?.get()?;
        writer.FlushAsync()?.get()?;
        stream.Seek(0)?;

        let decoder = BitmapDecoder::CreateAsync(&stream)?.get()?;
        let bitmap = decoder.GetSoftwareBitmapAsync()?.get()?;

        let tag = language_tag(language);
        let language_obj = Language::CreateLanguage(&HSTRING::from(tag))?;
        if !WinOcrEngine::IsLanguageSupported(&language_obj)? {
            return Err(OcrError::InvalidLanguage(language.to_string()));
        }
        let engine = WinOcrEngine::TryCreateFromLanguage(&language_obj)?;

        let result = engine.RecognizeAsync(&bitmap)?.get()?;
        convert_ocr_result(&result)
    }

    /// 展开行结构，按阅读顺序输出单词
    fn convert_ocr_result(win_result: &WinOcrResult) -> Result<Vec<RecognizedWord>, OcrError> {
        let mut words = Vec::new();

        let win_lines = win_result.Lines()?;
        for i in 0..win_lines.Size()? {
            let win_words = win_lines.GetAt(i)?.Words()?;

            for j in 0..win_words.Size()? {
                let win_word = win_words.GetAt(j)?;
                let rect = win_word.BoundingRect()?;

                // 负坐标按 0 处理，右下角向外取整
                let x0 = rect.X.max(0.0).floor() as u32;
                let y0 = rect.Y.max(0.0).floor() as u32;
                let x1 = (rect.X + rect.Width).max(0.0).ceil() as u32;
                let y1 = (rect.Y + rect.Height).max(0.0).ceil() as u32;

                words.push(RecognizedWord::new(
                    win_word.Text()?.to_string(),
                    BoundingBox::new(x0, y0, x1, y1),
                ));
            }
        }

        Ok(words)
    }

    #[async_trait]
    impl OcrEngine for WindowsOcr {
        fn name(&self) -> &'static str {
            "windows-media-ocr"
        }

        async fn recognize(
            &self,
            surface: &Surface,
            language: &str,
            progress: &ProgressFn,
        ) -> Result<Vec<RecognizedWord>, OcrError> {
            progress(Recognition::new("encoding image", 0.0));
            let png = surface.to_png()?;
            let language = language.to_string();

            progress(Recognition::new("recognizing text", 0.1));
            // WinRT 的 .get() 会阻塞当前线程
            let words = tokio::task::spawn_blocking(move || recognize_png(&png, &language))
                .await
                .map_err(|e| OcrError::Processing(e.to_string()))??;

            progress(Recognition::new("recognizing text", 1.0));
            Ok(words)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t\n\
4\t1\t1\t1\t1\t0\t36\t92\t200\t30\t-1\t\n\
5\t1\t1\t1\t1\t1\t36\t92\t60\t30\t96.5\tEste\n\
5\t1\t1\t1\t1\t2\t104\t92\t12\t30\t95.1\té\n\
5\t1\t1\t1\t1\t3\t124\t94\t40\t28\t-1\t \n\
5\t1\t1\t1\t1\t4\t170\t92\t66\t30\t91.0\ttexto\n";

    #[test]
    fn parses_word_rows_only() {
        let words = parse_tsv_words(TSV);
        let texts: Vec<_> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["Este", "é", "texto"]);
        assert_eq!(words[0].bbox, BoundingBox::new(36, 92, 96, 122));
        assert_eq!(words[2].bbox, BoundingBox::new(170, 92, 236, 122));
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let tsv = "header\n5\t1\t1\t1\t1\t1\tx\t0\t1\t1\t90\tbad\n5\t1\n";
        assert!(parse_tsv_words(tsv).is_empty());
        assert!(parse_tsv_words("").is_empty());
    }

    #[tokio::test]
    async fn rejects_suspicious_language_codes() {
        let engine = TesseractCli::new("definitely-not-installed-tesseract");
        let err = engine
            .recognize(&Surface::new(1, 1), "eng; rm", &|_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::InvalidLanguage(_)));
    }

    #[tokio::test]
    async fn missing_binary_is_reported_as_unavailable() {
        let engine = TesseractCli::new("definitely-not-installed-tesseract");
        let err = engine
            .recognize(&Surface::new(2, 2), "eng", &|_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::EngineNotAvailable(_)));
    }

    #[tokio::test]
    #[ignore = "requires a local tesseract installation"]
    async fn blank_surface_yields_no_words() {
        let words = TesseractCli::default()
            .recognize(&Surface::new(64, 64), "eng", &|p| println!("{p:?}"))
            .await
            .expect("tesseract runs");
        assert!(words.is_empty());
    }
}
