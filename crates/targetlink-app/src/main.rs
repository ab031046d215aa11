//! # targetlink-app
//!
//! targetlink CLI 바이너리 진입점.
//! 설정 로드 → 어댑터 생성(토큰 캐시, HTTP 클라이언트) → 집계기 → 명령 실행.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use targetlink_core::config::AppConfig;
use targetlink_core::config_loader::load_config;
use targetlink_core::models::activity::ActivityQuery;
use targetlink_core::models::offer::OfferType;
use targetlink_core::ports::api_client::TargetApi;
use targetlink_network::auth::TokenCache;
use targetlink_network::http_client::HttpTargetClient;
use targetlink_offers::aggregator::ActivityOfferAggregator;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Adobe Target 오퍼 조회 도구
///
/// 이름 표식과 승인 상태로 액티비티를 골라 활성 오퍼를 JSON으로 출력한다.
#[derive(Parser, Debug)]
#[command(name = "targetlink")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (JSON/TOML/YAML)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 토큰 발급 확인 (토큰 값은 출력하지 않음)
    Token,

    /// 액티비티 목록 한 페이지
    Activities {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u64>,
        #[arg(long)]
        sort_by: Option<String>,
    },

    /// 액티비티 상세
    Activity {
        id: String,
        /// ab 또는 xt
        activity_type: String,
    },

    /// 오퍼 상세
    Offer {
        id: String,
        #[arg(default_value = "json")]
        offer_type: String,
    },

    /// 액티비티 하나의 오퍼 집계
    ActivityOffers {
        id: String,
        activity_type: String,
        /// 첫 번째 오퍼만
        #[arg(long)]
        first: bool,
    },

    /// 표식이 붙은 승인 액티비티 전체의 오퍼 집계 (기본)
    Offers,
}

/// 조립된 어댑터 묶음
struct Services {
    tokens: Arc<TokenCache>,
    api: Arc<HttpTargetClient>,
    aggregator: ActivityOfferAggregator,
}

impl Services {
    fn build(config: &AppConfig) -> Result<Self> {
        let tokens = Arc::new(
            TokenCache::from_config(&config.auth, config.request_timeout())
                .context("토큰 캐시 생성 실패")?,
        );
        let api = Arc::new(
            HttpTargetClient::from_config(config, tokens.clone())
                .context("HTTP 클라이언트 생성 실패")?,
        );
        let aggregator = ActivityOfferAggregator::new(api.clone(), config.filter.clone());
        Ok(Self {
            tokens,
            api,
            aggregator,
        })
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("출력 직렬화 실패")?;
    println!("{rendered}");
    Ok(())
}

async fn run(command: Command, services: &Services) -> Result<()> {
    match command {
        Command::Token => {
            let token = services
                .tokens
                .fetch_access_token()
                .await
                .context("토큰 발급 실패")?;
            let expires_at = services.tokens.expires_at().await;
            print_json(&json!({
                "tokenLength": token.len(),
                "expiresAt": expires_at,
            }))
        }
        Command::Activities {
            limit,
            offset,
            sort_by,
        } => {
            let query = ActivityQuery {
                limit,
                offset,
                sort_by,
            };
            let page = services
                .api
                .get_activities(&query)
                .await
                .context("액티비티 목록 조회 실패")?;
            print_json(&page)
        }
        Command::Activity { id, activity_type } => {
            let details = services
                .api
                .get_activity_details(&id, &activity_type)
                .await
                .with_context(|| format!("액티비티 상세 조회 실패: {id}"))?;
            print_json(&details)
        }
        Command::Offer { id, offer_type } => {
            let details = services
                .api
                .get_offer_details(&id, &OfferType::from_raw(&offer_type))
                .await
                .with_context(|| format!("오퍼 상세 조회 실패: {id}"))?;
            print_json(&details)
        }
        Command::ActivityOffers {
            id,
            activity_type,
            first,
        } => {
            if first {
                let offer = services
                    .aggregator
                    .get_json_offer_from_activity(&id, &activity_type)
                    .await
                    .with_context(|| format!("액티비티 오퍼 조회 실패: {id}"))?;
                print_json(&offer)
            } else {
                let offers = services
                    .aggregator
                    .get_json_offers_from_activity(&id, &activity_type)
                    .await
                    .with_context(|| format!("액티비티 오퍼 조회 실패: {id}"))?;
                print_json(&offers)
            }
        }
        Command::Offers => {
            let offers = services
                .aggregator
                .get_trava_telas_offers()
                .await
                .context("오퍼 집계 실패")?;
            info!("오퍼 {}건 출력", offers.len());
            print_json(&offers)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG가 있으면 우선, 없으면 --log-level. 로그는 stderr, 결과는 stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(args.config.as_deref()).context("설정 로드 실패")?;
    config.validate().context("설정 검증 실패")?;
    debug!(
        "설정 로드 완료: base_url={}, tenant={}",
        config.api.base_url, config.api.tenant_id
    );

    let services = Services::build(&config)?;
    run(args.command.unwrap_or(Command::Offers), &services).await
}
