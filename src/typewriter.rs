//! 打字机动画：按固定间隔把字符串逐字追加到目标文本中。

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::debug;

/// 动画写入的目标
pub trait TextSink: Send + 'static {
    fn clear(&mut self);
    fn push(&mut self, c: char);
}

/// 可共享的文本缓冲，克隆后指向同一份内容
#[derive(Debug, Clone, Default)]
pub struct SharedText {
    inner: Arc<Mutex<String>>,
}

impl SharedText {
    /// 以初始内容创建
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial.into())),
        }
    }

    /// 当前内容的副本
    pub fn text(&self) -> String {
        self.inner.lock().clone()
    }
}

impl TextSink for SharedText {
    fn clear(&mut self) {
        self.inner.lock().clear();
    }

    fn push(&mut self, c: char) {
        self.inner.lock().push(c);
    }
}

/// 动画状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingState {
    Idle,
    Typing,
    Done,
}

/// 打字机动画
///
/// 每次调用 [`Typewriter::type_text`] 都会使之前仍在运行的动画失效，
/// 旧动画在下一次计时触发时直接退出，不再修改目标文本。
///
/// 代数检查、写入字符和状态更新都在同一把锁内完成，
/// 新动画的清空操作也持有这把锁，因此旧动画的字符不会混进新文本。
#[derive(Debug, Clone)]
pub struct Typewriter {
    shared: Arc<Mutex<Progress>>,
}

#[derive(Debug)]
struct Progress {
    generation: u64,
    state: TypingState,
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Typewriter {
    /// 默认字符间隔
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

    /// 创建处于 `Idle` 状态的动画
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Progress {
                generation: 0,
                state: TypingState::Idle,
            })),
        }
    }

    /// 当前状态
    pub fn state(&self) -> TypingState {
        self.shared.lock().state
    }

    /// 清空 `sink`，然后每隔 `delay` 追加一个字符，全部写完后停止
    ///
    /// 第一个字符在 `delay` 之后出现。必须在 tokio 运行时中调用。
    pub fn type_text<S: TextSink>(
        &self,
        text: impl Into<String>,
        mut sink: S,
        delay: Duration,
    ) -> TypingHandle {
        let chars: Vec<char> = text.into().chars().collect();
        // tokio 的 interval 不接受 0 间隔
        let delay = delay.max(Duration::from_millis(1));

        let current = {
            let mut progress = self.shared.lock();
            progress.generation += 1;
            sink.clear();
            progress.state = if chars.is_empty() {
                TypingState::Done
            } else {
                TypingState::Typing
            };
            progress.generation
        };

        let shared = Arc::clone(&self.shared);
        let mut ticker = time::interval_at(Instant::now() + delay, delay);

        let task = tokio::spawn(async move {
            for (index, c) in chars.iter().enumerate() {
                ticker.tick().await;

                let mut progress = shared.lock();
                if progress.generation != current {
                    debug!(generation = current, "typing animation superseded");
                    return false;
                }

                sink.push(*c);
                if index + 1 == chars.len() {
                    progress.state = TypingState::Done;
                }
            }
            true
        });

        TypingHandle { task }
    }
}

/// 正在运行的动画
#[derive(Debug)]
pub struct TypingHandle {
    task: JoinHandle<bool>,
}

impl TypingHandle {
    /// 等待动画结束；完整写完返回 `true`，被新的动画取代返回 `false`
    pub async fn finished(self) -> bool {
        self.task.await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    const TICK: Duration = Duration::from_millis(10);

    #[tokio::test(start_paused = true)]
    async fn reveals_one_character_per_tick_then_stops() {
        let typewriter = Typewriter::new();
        let output = SharedText::new("old content");

        let handle = typewriter.type_text("abc", output.clone(), TICK);
        let mut seen = vec![output.text()];

        // 在两次触发之间采样
        sleep(TICK / 2).await;
        for _ in 0..3 {
            sleep(TICK).await;
            seen.push(output.text());
        }
        assert_eq!(seen, ["", "a", "ab", "abc"]);

        sleep(TICK * 10).await;
        assert_eq!(output.text(), "abc");
        assert!(handle.finished().await);
        assert_eq!(typewriter.state(), TypingState::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn state_moves_from_idle_to_typing_to_done() {
        let typewriter = Typewriter::new();
        assert_eq!(typewriter.state(), TypingState::Idle);

        let handle = typewriter.type_text("hi", SharedText::default(), TICK);
        assert_eq!(typewriter.state(), TypingState::Typing);

        assert!(handle.finished().await);
        assert_eq!(typewriter.state(), TypingState::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_text_finishes_immediately() {
        let typewriter = Typewriter::new();
        let output = SharedText::new("x");
        assert!(typewriter.type_text("", output.clone(), TICK).finished().await);
        assert_eq!(output.text(), "");
        assert_eq!(typewriter.state(), TypingState::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn new_animation_supersedes_running_one() {
        let typewriter = Typewriter::new();
        let output = SharedText::default();

        let first = typewriter.type_text("abc", output.clone(), TICK);
        sleep(TICK + TICK / 2).await;
        assert_eq!(output.text(), "a");

        let second = typewriter.type_text("xy", output.clone(), TICK);
        assert_eq!(output.text(), "");

        assert!(!first.finished().await);
        assert!(second.finished().await);
        assert_eq!(output.text(), "xy");
    }

    #[tokio::test(start_paused = true)]
    async fn multibyte_characters_are_typed_whole() {
        let typewriter = Typewriter::new();
        let output = SharedText::default();
        let handle = typewriter.type_text("é!", output.clone(), TICK);

        sleep(TICK + TICK / 2).await;
        assert_eq!(output.text(), "é");
        assert!(handle.finished().await);
        assert_eq!(output.text(), "é!");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn superseded_animation_never_leaks_into_new_text() {
        let typewriter = Typewriter::new();
        let output = SharedText::default();
        let fast = Duration::from_millis(1);

        for _ in 0..50 {
            let stale = typewriter.type_text("abcdefgh", output.clone(), fast);
            sleep(Duration::from_millis(2)).await;

            let fresh = typewriter.type_text("xyz", output.clone(), fast);
            assert!(fresh.finished().await);
            assert_eq!(output.text(), "xyz");
            assert_eq!(typewriter.state(), TypingState::Done);

            stale.finished().await;
            assert_eq!(output.text(), "xyz");
            assert_eq!(typewriter.state(), TypingState::Done);
        }
    }
}
