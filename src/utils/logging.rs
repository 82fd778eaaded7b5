/// 日志工具模块
///
/// 初始化 tracing 订阅器，以及启动 / 汇总横幅的输出
use crate::config::Config;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时 `verbose` 决定默认级别（debug / info）。
/// 重复调用是安全的，只有第一次生效
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}", now());
    info!("🌐 后端地址: {}", config.api_base_url);
    info!("⏱️ 请求超时: {} 秒", config.request_timeout_secs);
    info!("{}", "=".repeat(60));
}

/// 记录分节标题
pub fn log_section(title: &str) {
    info!("\n{}", "─".repeat(60));
    info!("{}", title);
    info!("{}", "─".repeat(60));
}

/// 打印最终汇总
///
/// # 参数
/// - `user`: 当前用户显示名（未登录时为 `None`）
/// - `loaded`: 成功加载的板块数
/// - `failed`: 加载失败的板块数
pub fn print_summary(user: Option<&str>, loaded: usize, failed: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 运行完成统计");
    info!("完成时间: {}", now());
    info!("{}", "=".repeat(60));
    info!("👤 当前用户: {}", user.unwrap_or("未登录"));
    info!("✅ 成功加载: {}/{}", loaded, loaded + failed);
    info!("❌ 加载失败: {}", failed);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
