use std::{process::ExitCode, sync::Arc};

use hwb_core::{
    alerts::AlertForwarder, config::Config, logging, poller::Poller, practicum::PracticumClient,
    utils::unix_now,
};
use hwb_telegram::TelegramMessenger;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let log_file = hwb_core::config::log_file_from_env();
    let alert_queue = match logging::init("hwb", &log_file) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(forward = false, "required environment variables are missing: {e}");
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let source = match PracticumClient::new(&cfg.endpoint, &cfg.practicum_token, cfg.http_timeout) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(forward = false, "{e}");
            return ExitCode::FAILURE;
        }
    };
    let messenger = Arc::new(TelegramMessenger::from_token(cfg.telegram_token.clone()));

    let alerts = cfg
        .alerts_enabled
        .then(|| AlertForwarder::new(alert_queue, cfg.telegram_chat_id));

    let mut poller = Poller::new(
        source,
        messenger,
        cfg.telegram_chat_id,
        cfg.retry_time,
        unix_now(),
    );
    poller.run(alerts).await;

    ExitCode::SUCCESS
}
