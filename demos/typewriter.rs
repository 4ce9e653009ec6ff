// 打字机动画示例：逐字显示一段固定文本

use ocr_overlay::{SharedText, Typewriter};
use std::io::Write;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let text = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "Este é o texto extraído da imagem!".to_string());
    let delay = args
        .get(2)
        .and_then(|ms| ms.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Typewriter::DEFAULT_DELAY);

    let output = SharedText::default();
    let typewriter = Typewriter::new();
    let handle = typewriter.type_text(text, output.clone(), delay);

    // 每个间隔刷新一次当前行
    let watcher = {
        let output = output.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(delay);
            loop {
                ticker.tick().await;
                print!("\r{}", output.text());
                let _ = std::io::stdout().flush();
            }
        })
    };

    handle.finished().await;
    watcher.abort();
    println!("\r{}", output.text());
}
