//! 上传并识别：读取文件 → 解码 → 绘制到画布 → OCR → 渲染。

use crate::config::OverlayConfig;
use crate::engine::{OcrEngine, Recognition};
use crate::error::{OverlayError, OverlayResult};
use crate::render::{render_words, SpanContainer};
use crate::surface::{decode_image, Surface};
use crate::typewriter::{SharedText, Typewriter};
use crate::{join_words, RecognizedWord};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 阻塞式提示框
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// 把提示写入日志
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        warn!(target: "notification", "{message}");
    }
}

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// 结果已渲染到输出容器
    Rendered { run: u64, words: usize },
    /// 期间有新的运行开始，本次结果被丢弃
    Superseded { run: u64 },
}

/// 上传识别流程
///
/// 每次点击分配一个递增的运行编号，只有最新一次运行的回调能修改输出容器
/// 或弹出提示，过期的回调直接丢弃。
pub struct OverlayApp<E, C> {
    engine: E,
    container: Arc<Mutex<C>>,
    surface: Arc<Mutex<Surface>>,
    notifier: Arc<dyn Notifier>,
    config: OverlayConfig,
    current_run: AtomicU64,
    typewriter: Typewriter,
    animation_target: Option<SharedText>,
}

impl<E, C> OverlayApp<E, C>
where
    E: OcrEngine,
    C: SpanContainer + Send,
{
    /// 以引擎、输出容器、通知方式和配置创建
    pub fn new(
        engine: E,
        container: Arc<Mutex<C>>,
        notifier: Arc<dyn Notifier>,
        config: OverlayConfig,
    ) -> Self {
        Self {
            engine,
            container,
            surface: Arc::new(Mutex::new(Surface::default())),
            notifier,
            config,
            current_run: AtomicU64::new(0),
            typewriter: Typewriter::new(),
            animation_target: None,
        }
    }

    /// 识别完成后把文本交给打字机动画写入 `target`
    ///
    /// 仅在配置了 `animate_extracted_text` 时生效。
    pub fn with_animation_target(mut self, target: SharedText) -> Self {
        self.animation_target = Some(target);
        self
    }

    /// 当前配置
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// 使用的 OCR 引擎
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// 识别文本使用的打字机动画
    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    /// 当前画布的副本
    pub fn surface(&self) -> Surface {
        self.surface.lock().clone()
    }

    /// 最近一次运行的编号，尚未运行时为 0
    pub fn current_run(&self) -> u64 {
        self.current_run.load(Ordering::SeqCst)
    }

    fn is_current(&self, run: u64) -> bool {
        self.current_run() == run
    }

    /// 点击“处理图片”
    ///
    /// 未选择文件时提示用户并返回 [`OverlayError::NoFileSelected`]，不做任何绘制和识别。
    /// 读取、解码或识别失败时提示用户并返回对应错误，输出容器保持不变。
    pub async fn on_upload_click<P: AsRef<Path>>(
        &self,
        file: Option<P>,
    ) -> OverlayResult<RunOutcome> {
        let Some(path) = file else {
            self.notifier.notify(&self.config.no_file_message);
            return Err(OverlayError::NoFileSelected);
        };

        let path = path.as_ref();
        let run = self.current_run.fetch_add(1, Ordering::SeqCst) + 1;
        info!(run, path = %path.display(), engine = self.engine.name(), "processing image");

        match self.recognize(run, path).await {
            Ok((words, surface)) => Ok(self.on_recognition_complete(run, words, &surface)),
            Err(err) => {
                self.on_recognition_failed(run, &err);
                Err(err)
            }
        }
    }

    async fn recognize(
        &self,
        run: u64,
        path: &Path,
    ) -> OverlayResult<(Vec<RecognizedWord>, Surface)> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| OverlayError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let image = tokio::task::spawn_blocking(move || decode_image(&bytes))
            .await
            .map_err(|e| OverlayError::Task(e.to_string()))??;

        // 画布尺寸与图片一致，识别使用同一份像素
        let surface = {
            let mut canvas = self.surface.lock();
            canvas.draw_image(&image);
            canvas.clone()
        };
        debug!(run, width = surface.width(), height = surface.height(), "image drawn");

        let progress = move |p: Recognition| {
            debug!(run, status = %p.status, progress = p.progress, "ocr progress");
        };
        let words = self
            .engine
            .recognize(&surface, &self.config.language, &progress)
            .await?;

        Ok((words, surface))
    }

    /// 识别成功的回调：清空输出容器并渲染本次结果
    pub fn on_recognition_complete(
        &self,
        run: u64,
        words: Vec<RecognizedWord>,
        surface: &Surface,
    ) -> RunOutcome {
        if !self.is_current(run) {
            warn!(run, current = self.current_run(), "discarding stale recognition result");
            return RunOutcome::Superseded { run };
        }

        render_words(
            &words,
            surface,
            &mut *self.container.lock(),
            &self.config.font_family,
        );
        info!(run, words = words.len(), "recognition rendered");

        if self.config.animate_extracted_text {
            if let Some(target) = &self.animation_target {
                self.typewriter.type_text(
                    join_words(&words),
                    target.clone(),
                    self.config.typing_delay(),
                );
            }
        }

        RunOutcome::Rendered {
            run,
            words: words.len(),
        }
    }

    /// 识别失败的回调：记录错误并提示用户，输出容器保持不变
    ///
    /// 返回是否处理了该错误；过期运行的错误被忽略。
    pub fn on_recognition_failed(&self, run: u64, err: &OverlayError) -> bool {
        if !self.is_current(run) {
            warn!(run, error = %err, "discarding stale recognition failure");
            return false;
        }

        error!(run, error = %err, "image processing failed");
        self.notifier.notify(&self.config.failure_message);
        true
    }
}
