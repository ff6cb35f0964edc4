use std::io;

use time::macros::format_description;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, time::LocalTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::cli::types::{LogFormat, LogLevel};

pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub file_path: Option<String>,
    pub max_log_files: Option<usize>,
}

pub fn configure_global_tracing(config: LogConfig) {
    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ));

    let level = config.level.as_tracing_level();
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("caching_proxy={}", level).parse().unwrap())
        .add_directive("trust_dns_proto=warn".parse().unwrap())
        .add_directive("trust_dns_resolver=warn".parse().unwrap())
        .add_directive("tokio=warn".parse().unwrap());

    let registry = tracing_subscriber::registry().with(filter);

    let file_writer = config.file_path.as_deref().map(|prefix| {
        rolling_file_writer(prefix, config.max_log_files.unwrap_or(7))
    });

    match config.format {
        LogFormat::Pretty => {
            let console_layer = fmt::layer()
                .pretty()
                .with_thread_ids(true)
                .with_line_number(false)
                .with_file(true)
                .with_timer(timer.clone())
                .with_writer(io::stdout);

            match file_writer {
                Some(writer) => {
                    let file_layer = fmt::layer()
                        .with_thread_ids(true)
                        .with_ansi(false)
                        .with_timer(timer)
                        .with_writer(writer);
                    registry.with(console_layer).with(file_layer).init();
                }
                None => registry.with(console_layer).init(),
            }
        }
        LogFormat::Json => {
            let console_layer = fmt::layer()
                .json()
                .with_timer(timer.clone())
                .with_writer(io::stdout);

            match file_writer {
                Some(writer) => {
                    let file_layer = fmt::layer().json().with_timer(timer).with_writer(writer);
                    registry.with(console_layer).with(file_layer).init();
                }
                None => registry.with(console_layer).init(),
            }
        }
        LogFormat::Compact => {
            let console_layer = fmt::layer()
                .compact()
                .with_timer(timer.clone())
                .with_writer(io::stdout);

            match file_writer {
                Some(writer) => {
                    let file_layer = fmt::layer()
                        .compact()
                        .with_ansi(false)
                        .with_timer(timer)
                        .with_writer(writer);
                    registry.with(console_layer).with(file_layer).init();
                }
                None => registry.with(console_layer).init(),
            }
        }
    }
}

/// Daily-rotated file writer under ./logs. The flush guard is deliberately
/// leaked: logging stays alive for the whole process.
fn rolling_file_writer(prefix: &str, max_files: usize) -> NonBlocking {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(max_files)
        .build("./logs")
        .expect("Failed to create rolling file appender");

    let (writer, guard) = tracing_appender::non_blocking(appender);
    std::mem::forget(guard);
    writer
}
