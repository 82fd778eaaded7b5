use anyhow::Result;
use exam_portal_client::utils::logging;
use exam_portal_client::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置（EXAM_CONFIG 指向的 TOML 文件 + 环境变量覆盖）
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let stats = App::initialize(config).await?.run().await?;
    if stats.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
