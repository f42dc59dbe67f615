use futures::StreamExt;
use kline_app::{ChartApp, init_tracing, load_config};
use kline_chart::SvgSurface;
use kline_core::market::port::MarketDataProvider;
use kline_feed::BinanceProvider;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// # Summary
/// 应用启动入口。负责装配所有具体实现并驱动事件循环。
///
/// # Logic
/// 1. 安装 TLS 加密后端，加载配置并初始化日志。
/// 2. 实例化行情源，拉取历史 K 线（失败时以空序列启动）。
/// 3. 构造图表上下文（首帧写入 SVG 文件）。
/// 4. 订阅实时流，逐条交给上下文，直到流结束或收到退出信号。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 基础设施
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider already installed");
    }
    let config = load_config("config/default")?;
    config.chart.validate()?;
    let _log_guard = init_tracing(&config.log);
    info!(
        symbol = %config.feed.symbol,
        timeframe = %config.feed.timeframe,
        "kline chart starting..."
    );

    // 2. 行情源与历史数据
    let provider = BinanceProvider::new(&config.feed)?;
    let history = match provider
        .fetch_history(
            &config.feed.symbol,
            config.feed.timeframe,
            config.feed.history_limit,
        )
        .await
    {
        Ok(history) => history,
        Err(e) => {
            warn!("history fetch failed, starting empty: {}", e);
            Vec::new()
        }
    };

    // 3. 图表上下文
    let surface = SvgSurface::new(
        config.chart.layout_size(),
        config.chart.pixel_ratio,
        Some(PathBuf::from(&config.chart.output)),
    );
    let mut app = ChartApp::new(history, surface, &config.chart.style);

    // 4. 事件循环
    let mut stream = provider
        .subscribe_candles(&config.feed.symbol, config.feed.timeframe)
        .await?;
    info!(output = %config.chart.output, "streaming. Waiting for signals...");

    loop {
        tokio::select! {
            next = stream.next() => match next {
                Some(candle) => {
                    app.on_tick(candle);
                }
                None => {
                    error!("market stream closed");
                    break;
                }
            },
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("failed to listen for shutdown signal: {}", e);
                }
                info!("Shutdown signal received. Exiting...");
                break;
            }
        }
    }

    app.shutdown();
    Ok(())
}
