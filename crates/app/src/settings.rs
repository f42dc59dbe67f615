use config::{Config, ConfigError, Environment, File};
use kline_core::config::{AppConfig, LogConfig};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// 环境变量前缀，例如 `KLINE_FEED__SYMBOL=ethusdt`
pub const ENV_PREFIX: &str = "KLINE";

/// # Summary
/// 加载应用配置。
///
/// # Logic
/// 1. 读取可选的配置文件（不存在时跳过）。
/// 2. 叠加 `KLINE_` 前缀的环境变量，嵌套字段以 `__` 分隔。
/// 3. 反序列化为 `AppConfig`，缺失字段取默认值。
///
/// # Arguments
/// * `path`: 配置文件路径，不含扩展名时按 `config` crate 规则探测格式。
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let file = path.as_ref().to_string_lossy().into_owned();
    Config::builder()
        .add_source(File::with_name(&file).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// # Summary
/// 初始化全局日志。
///
/// # Logic
/// 1. `RUST_LOG` 优先，否则使用配置中的级别。
/// 2. 始终输出到终端。
/// 3. 配置了目录时额外按天滚动写入文件。
///
/// # Returns
/// 文件写入线程的守卫，必须持有到进程退出，否则尾部日志会丢失。
pub fn init_tracing(log: &LogConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log.level.as_str()));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer());

    match &log.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "kline.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}
