use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tracing::info;

use crate::bot::handler::Bot;
use crate::catalog::source::HttpCatalog;
use crate::chat::api::SlackApi;
use crate::chat::supervisor::Supervisor;
use crate::cli::BotArgs;
use crate::config::{BotConfig, RetryPolicy, DEFAULT_SESSION_METHOD};

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub bot: BotArgs,

    /// The bot's own user id, e.g. U03ABCDEF
    #[arg(long, env = "BOT_USERID")]
    pub bot_user_id: String,

    /// API method that starts a realtime session
    #[arg(long, default_value = DEFAULT_SESSION_METHOD)]
    pub session_method: String,

    /// Seconds between liveness probes
    #[arg(long, default_value = "15")]
    pub probe_interval: u64,

    /// Messages answered concurrently
    #[arg(long, default_value = "4")]
    pub workers: usize,

    /// Messages held while every worker is busy; more are dropped
    #[arg(long, default_value = "32")]
    pub queue_capacity: usize,

    /// First reconnect delay ceiling, in milliseconds
    #[arg(long, default_value = "500")]
    pub retry_base_ms: u64,

    /// Largest reconnect delay, in milliseconds
    #[arg(long, default_value = "30000")]
    pub retry_max_ms: u64,
}

impl RunArgs {
    #[must_use]
    pub fn into_config(self) -> BotConfig {
        let mut config = self.bot.into_config().with_bot_user_id(self.bot_user_id);
        config.session_method = self.session_method;
        config.probe_interval = Duration::from_secs(self.probe_interval);
        config.workers = self.workers;
        config.queue_capacity = self.queue_capacity;
        config.retry = RetryPolicy {
            base: Duration::from_millis(self.retry_base_ms),
            max: Duration::from_millis(self.retry_max_ms),
        };
        config
    }
}

/// Run the realtime bot until interrupted
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a client cannot be built.
pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = args.into_config();
    config.validate_realtime()?;
    let config = Arc::new(config);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_bot(config).await })
}

async fn run_bot(config: Arc<BotConfig>) -> anyhow::Result<()> {
    let api = Arc::new(SlackApi::new(&config)?);
    let catalog = Arc::new(HttpCatalog::new(&config)?);
    let bot = Arc::new(Bot::new(catalog, &config));
    let supervisor = Supervisor::new(config.clone(), api, bot);

    tokio::select! {
        () = supervisor.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Interrupted; shutting down.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_run_args_build_config() {
        let cli = Cli::try_parse_from([
            "bits-bot",
            "run",
            "--slack-token",
            "tok",
            "--bit-auth",
            "auth",
            "--bot-user-id",
            "UBOT",
            "--workers",
            "2",
            "--retry-base-ms",
            "100",
            "--retry-max-ms",
            "1000",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = args.into_config();
        assert_eq!(config.bot_tag(), "<@UBOT>");
        assert_eq!(config.workers, 2);
        assert_eq!(config.retry.base, Duration::from_millis(100));
        assert_eq!(config.retry.max, Duration::from_secs(1));
        assert_eq!(config.session_method, "rtm.start");
        assert!(config.validate_realtime().is_ok());
    }
}
