// 识别图片并生成文字覆盖层页面
// 演示完整流程：读取 → 绘制 → OCR → 按位置、字号、颜色重建文字

use ocr_overlay::logging::init_logging;
use ocr_overlay::{
    overlay_page, LogNotifier, OverlayApp, OverlayConfig, RunOutcome, SpanContainer, SpanList,
};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging("info");

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("用法: cargo run --example overlay_page <图片路径> [输出.html] [配置.json]");
        eprintln!("示例: cargo run --example overlay_page scan.png");
        eprintln!("示例: cargo run --example overlay_page scan.png out.html overlay.json");
        return Ok(());
    }

    let image_path = Path::new(&args[1]);
    let output_path = args.get(2).map(String::as_str).unwrap_or("overlay.html");
    let config = match args.get(3) {
        Some(path) => OverlayConfig::load(path)?,
        None => OverlayConfig::default(),
    };

    #[cfg(windows)]
    let engine = ocr_overlay::WindowsOcr;
    #[cfg(not(windows))]
    let engine = ocr_overlay::TesseractCli::default();

    let container = Arc::new(Mutex::new(SpanList::new()));
    let app = OverlayApp::new(engine, container.clone(), Arc::new(LogNotifier), config);

    match app.on_upload_click(Some(image_path)).await {
        Ok(RunOutcome::Rendered { words, .. }) => {
            println!("识别到 {words} 个单词");

            let surface = app.surface();
            let spans = container.lock();
            for span in spans.spans().iter().take(5) {
                println!(
                    "  {:<16} x={:<5} y={:<5} 字号={:<4} 颜色={}",
                    span.text, span.left, span.top, span.font_size, span.color
                );
            }

            let page = overlay_page(
                &image_path.display().to_string(),
                surface.width(),
                surface.height(),
                spans.spans(),
            );
            std::fs::write(output_path, page)?;
            println!("\n已写入 {output_path}");
        }
        Ok(RunOutcome::Superseded { run }) => {
            println!("运行 {run} 已被新的运行取代");
        }
        Err(e) => {
            eprintln!("错误: {e}");
        }
    }

    Ok(())
}
