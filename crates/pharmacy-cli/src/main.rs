//! 약국 알림 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 약국 123으로 접속해 알림 대기 (자동 수락)
//! pharmacy listen --pharmacy-id 123 --auto accept
//!
//! # 약국 123에 주문 알림 트리거
//! pharmacy notify --pharmacy-id 123 --drug Aspirin --drug Ibuprofen --total 23000
//!
//! # 다른 서버 지정
//! pharmacy --server http://10.0.0.5:3001 listen --pharmacy-id 456
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pharmacy_cli::{websocket_url, PharmacyListener, TriggerClient};
use pharmacy_core::{init_logging, LogConfig, NotifyRequest, PharmacyId};

#[derive(Parser)]
#[command(name = "pharmacy")]
#[command(about = "Pharmacy alert CLI - 주문 알림 수신 및 트리거", long_about = None)]
#[command(version)]
struct Cli {
    /// 알림 서버 주소
    #[arg(long, global = true, env = "PHARMACY_SERVER", default_value = "http://127.0.0.1:3001")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 약국으로 접속해 주문 알림 대기
    Listen {
        /// 약국 ID
        #[arg(short, long)]
        pharmacy_id: String,

        /// 알림에 자동 응답 (지정하지 않으면 응답하지 않음)
        #[arg(long, value_enum)]
        auto: Option<AutoReply>,
    },

    /// 주문 알림 트리거
    Notify {
        /// 대상 약국 ID
        #[arg(short, long)]
        pharmacy_id: String,

        /// 약품명 (여러 번 지정 가능)
        #[arg(short, long = "drug", required = true)]
        drugs: Vec<String>,

        /// 주문 총액
        #[arg(short, long)]
        total: i64,
    },
}

/// 자동 응답 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AutoReply {
    Accept,
    Reject,
}

impl AutoReply {
    fn accepted(self) -> bool {
        matches!(self, AutoReply::Accept)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    init_logging(LogConfig::from_env())
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Listen { pharmacy_id, auto } => {
            let pharmacy_id = PharmacyId::new(pharmacy_id).context("잘못된 약국 ID")?;
            let url = websocket_url(&cli.server)?;

            let shutdown = CancellationToken::new();
            tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

            info!(%url, pharmacy_id = %pharmacy_id, "Listening for orders");
            let listener = PharmacyListener::new(url, pharmacy_id).with_shutdown(shutdown);

            listener
                .run(|call| {
                    println!(
                        "[주문] 약국 {} / 약품: {} / 총액: {}",
                        call.pharmacy_id,
                        call.drugs.join(", "),
                        call.total
                    );
                    auto.map(AutoReply::accepted)
                })
                .await?;
        }

        Commands::Notify {
            pharmacy_id,
            drugs,
            total,
        } => {
            let client = TriggerClient::new(cli.server)?;
            let ack = client
                .notify(&NotifyRequest::new(pharmacy_id, drugs, total))
                .await?;
            println!("{}", ack.message);
        }
    }

    Ok(())
}

/// Ctrl+C 수신 시 종료 토큰 취소.
async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => warn!("Received Ctrl+C, stopping listener..."),
        Err(e) => {
            warn!("Failed to install Ctrl+C handler: {}", e);
            return;
        }
    }
    shutdown.cancel();
}
