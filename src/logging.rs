use std::env;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directory, relative to the working directory, holding the chat log
const LOG_DIR: &str = ".sitechat";

/// Send logs to `.sitechat/chat.log` so they do not interleave with the REPL
pub fn setup_chat_logging() -> anyhow::Result<()> {
    let log_dir = env::current_dir()?.join(LOG_DIR);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::NEVER, log_dir, "chat.log");

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(file_layer)
        .init();

    Ok(())
}
