use anyhow::Context;
use clap::Parser;
use port_bridge::config::LogFormat;
use port_bridge::core::replay::{self, ReplaySummary};
use port_bridge::core::CacheStore;
use port_bridge::utils::error::ErrorSeverity;
use port_bridge::utils::{logger, validation::Validate};
use port_bridge::{
    Bridge, BridgeConfig, CliArgs, Collaborators, FileCache, LocalPortTable, MemoryCache,
    MemoryDocument, SimulatedAudio,
};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 載入 TOML 配置
    let config = match BridgeConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config.display(), e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if args.json_logs || config.log_format() == LogFormat::Json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting port-bridge host");
    tracing::debug!("Config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let script = read_script(&args)?;

    match run(&args, &config, &script).await {
        Ok(summary) => {
            tracing::info!(
                "✅ Replay finished: {} delivered, {} dropped, {} rejected, {} skipped",
                summary.delivered,
                summary.dropped,
                summary.rejected,
                summary.skipped
            );
            if summary.halted_by_reload {
                println!("🔄 Host reloaded; remaining messages belong to the next instance");
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Bridge failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn read_script(args: &CliArgs) -> anyhow::Result<String> {
    match &args.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display())),
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("reading script from stdin")?;
            Ok(content)
        }
    }
}

async fn run(
    args: &CliArgs,
    config: &BridgeConfig,
    script: &str,
) -> port_bridge::Result<ReplaySummary> {
    let events = replay::parse_script(script)?;

    let audio = SimulatedAudio::from_current_runtime(config.audio()?)?;
    let keyframes = config.keyframes()?;
    let cache: Arc<dyn CacheStore> = match config.cache_path() {
        Some(path) => {
            tracing::info!("💾 Caching to {}", path);
            Arc::new(FileCache::new(path))
        }
        None => Arc::new(MemoryCache::new()),
    };
    let document = Arc::new(MemoryDocument::new().with_element(config.style_target_id()));

    let (ports, mut inbound) = LocalPortTable::with_receiver();

    let _bridge = Bridge::bind_with_options(
        &ports,
        Collaborators {
            audio,
            keyframes,
            cache,
            document: Arc::clone(&document),
        },
        config.bridge_options(),
    )?;

    let summary = replay::replay(&ports, events, || document.reload_requested()).await;

    // 等待尚未觸發的播放通知
    if !summary.halted_by_reload {
        tokio::time::sleep(Duration::from_millis(args.settle_ms)).await;
    }

    while let Ok(message) = inbound.try_recv() {
        println!("{}", serde_json::to_string(&message)?);
    }

    if let Some(styles) = document.text_content(config.style_target_id()) {
        tracing::debug!("Final styles:\n{}", styles);
    }

    Ok(summary)
}
