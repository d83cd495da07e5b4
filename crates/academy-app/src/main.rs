//! # academy
//!
//! AIacademy 텔레메트리 CLI.
//! 트레이스 재생, 헬스 체크, SEO 분석, 사이트맵 생성.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use academy_analytics::environment::StaticEnvironment;
use academy_app::context::{HostDeps, TelemetryContext};
use academy_app::lifecycle::LifecycleManager;
use academy_app::replay::{replay, Trace};
use academy_app::settings::apply_env_overrides;
use academy_core::config::AppConfig;
use academy_core::config_manager::ConfigManager;
use academy_core::ports::clock::SystemClock;
use academy_core::ports::performance::Capabilities;
use academy_core::ports::random::ThreadRandom;
use academy_core::ports::storage::KeyValueStore;
use academy_monitor::source::PerformanceHub;
use academy_network::http_probe::HttpConnectivityClient;
use academy_seo::sitemap::{default_pages, generate_sitemap, render_sitemap_xml, SitemapPage};
use academy_seo::types::SeoConfig;
use academy_seo::SeoManager;
use academy_storage::memory::MemoryStore;
use academy_storage::sqlite::{SqliteKvStore, DB_FILE_NAME};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// AIacademy 텔레메트리 도구
#[derive(Parser, Debug)]
#[command(name = "academy")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info", global = true)]
    log_level: String,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 녹화된 페이지 로드 재생 후 대시보드 출력
    Replay {
        /// 트레이스 JSON 파일
        trace: PathBuf,
        /// 결과 전체를 JSON으로 출력
        #[arg(long)]
        json: bool,
        /// 세션 ID/스냅샷을 SQLite 저장소에 기록 (기본: 인메모리)
        #[arg(long)]
        persist: bool,
    },
    /// 헬스 프로브 실행
    Health {
        /// 대상 페이지 URL
        #[arg(long, default_value = "http://localhost:8080/")]
        url: String,
        /// N초마다 반복 (Ctrl+C로 종료)
        #[arg(long)]
        watch: Option<u64>,
    },
    /// HTML 파일 SEO 분석
    Seo {
        /// HTML 파일
        file: PathBuf,
        /// 내부 링크 판별 기준 origin
        #[arg(long, default_value = "")]
        origin: String,
    },
    /// sitemap.xml 생성
    Sitemap {
        /// 사이트 기준 URL
        base_url: String,
        /// 추가 경로 (예: /courses)
        #[arg(long = "page")]
        pages: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "academy={lvl},academy_app={lvl},academy_core={lvl},academy_storage={lvl},academy_monitor={lvl},academy_network={lvl},academy_experiment={lvl},academy_analytics={lvl},academy_seo={lvl}",
        lvl = args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Replay {
            trace,
            json,
            persist,
        } => run_replay(&trace, json, persist, config).await,
        Command::Health { url, watch } => run_health(&url, watch, config).await,
        Command::Seo { file, origin } => run_seo(&file, &origin),
        Command::Sitemap { base_url, pages } => {
            let mut all = default_pages();
            all.extend(
                pages
                    .iter()
                    .map(|path| SitemapPage::new(path, "weekly", "0.8")),
            );
            print!(
                "{}",
                render_sitemap_xml(&generate_sitemap(&base_url, &all, Utc::now()))
            );
            Ok(())
        }
    }
}

/// 설정 파일 로드 후 환경변수 오버라이드
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let manager = match path {
        Some(path) => Some(ConfigManager::with_path(path.to_path_buf())?),
        None => match ConfigManager::new() {
            Ok(manager) => Some(manager),
            Err(e) => {
                warn!("설정 파일을 사용할 수 없음, 기본값 사용: {e}");
                None
            }
        },
    };
    let base = manager.map(|m| m.get()).unwrap_or_default();
    Ok(apply_env_overrides(&base)?)
}

/// SQLite 경로 결정: 설정값 → 플랫폼 데이터 디렉토리 → 현재 디렉토리
fn resolve_db_path(config: &AppConfig) -> PathBuf {
    config
        .storage
        .data_dir
        .clone()
        .or_else(|| ConfigManager::data_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DB_FILE_NAME)
}

/// SQLite 저장소를 열고, 실패하면 인메모리로 대체
fn open_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    let path = resolve_db_path(config);
    if let Some(dir) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!("데이터 디렉토리 생성 실패: {}: {e}", dir.display());
        }
    }
    match SqliteKvStore::open(&path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("SQLite 저장소 사용 불가, 인메모리로 대체: {e}");
            Arc::new(MemoryStore::new())
        }
    }
}

async fn run_replay(path: &Path, json: bool, persist: bool, config: AppConfig) -> Result<()> {
    let trace = Trace::load(path)
        .with_context(|| format!("트레이스 로드 실패: {}", path.display()))?;
    let store: Arc<dyn KeyValueStore> = if persist {
        open_store(&config)
    } else {
        Arc::new(MemoryStore::new())
    };

    let outcome = replay(&trace, config, store).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    print!("{}", outcome.dashboard);
    println!();
    println!("Session {}", outcome.session_id);
    println!(
        "  duration {}ms, page views {}, events {}",
        outcome.summary.duration_ms, outcome.summary.page_views, outcome.summary.event_count
    );
    for top in &outcome.summary.top_events {
        println!("  {:<20} {}", top.event_type, top.count);
    }
    for (test_id, variant) in &outcome.variants {
        println!("Experiment {test_id}: {variant}");
    }
    for violation in &outcome.resource_violations {
        println!("Budget: {violation}");
    }
    println!("Analytics events dispatched: {}", outcome.events.len());
    Ok(())
}

async fn run_health(url: &str, watch: Option<u64>, config: AppConfig) -> Result<()> {
    let clock = Arc::new(SystemClock);
    let env = Arc::new(StaticEnvironment::from_url(url)?);
    let client = HttpConnectivityClient::new(config.health.request_timeout())?;
    let store = open_store(&config);

    let ctx = TelemetryContext::new(
        config,
        HostDeps {
            store,
            env,
            performance: Arc::new(PerformanceHub::new(Capabilities::default(), Utc::now())),
            clock,
            random: Arc::new(ThreadRandom),
            connectivity: Some(Arc::new(client)),
        },
    );

    let Some(secs) = watch else {
        print_health(&ctx).await;
        return Ok(());
    };

    let lifecycle = Arc::new(LifecycleManager::new());
    let mut shutdown_rx = lifecycle.subscribe();
    let signal_waiter = lifecycle.clone();
    tokio::spawn(async move { signal_waiter.wait_for_signal().await });

    let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => print_health(&ctx).await,
            _ = shutdown_rx.changed() => break,
        }
    }
    info!("헬스 감시 종료");
    Ok(())
}

async fn print_health(ctx: &TelemetryContext) {
    let results = ctx.run_health_checks().await;
    if let Some(overall) = ctx.dashboard_snapshot().overall {
        println!("System {overall}");
    }
    for result in results {
        println!(
            "  {:<18} {:<8} {:>7.0}ms  {}",
            result.service,
            result.status.to_string(),
            result.response_time_ms,
            result.message
        );
    }
}

fn run_seo(file: &Path, origin: &str) -> Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("HTML 파일 읽기 실패: {}", file.display()))?;
    let manager = SeoManager::new(SeoConfig::default(), origin);
    let metrics = manager.analyze_content(&html)?;
    let report = manager.generate_report(&html)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "metrics": metrics,
            "report": report,
        }))?
    );
    Ok(())
}
