pub mod types;

use clap::Parser;

use crate::{
    cache::HttpCache,
    cli::types::{LogFormat, LogLevel},
    config::{DEFAULT_HOST, DEFAULT_PORT, ProxyConfig},
    logging::{LogConfig, configure_global_tracing},
    server::start_proxy_server,
};

#[derive(Parser, Debug)]
#[command(
    name = "caching-proxy",
    version = env!("CARGO_PKG_VERSION"),
    about = "A forward HTTP proxy that serves GET responses from a bounded LRU cache",
    long_about = None
)]
pub struct Cli {
    /// Port to listen on
    #[arg(default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[arg(
        short = 'H',
        long,
        default_value = DEFAULT_HOST,
        help = "Host address to bind the proxy server"
    )]
    pub host: String,

    #[arg(
        short,
        long,
        default_value = "info",
        value_enum,
        help = "Logging level"
    )]
    pub log_level: LogLevel,

    #[arg(long, help = "Path to log file (if not specified, logs go to stdout)")]
    pub log_file: Option<String>,

    #[arg(long, default_value = "pretty", value_enum, help = "Log output format")]
    pub log_format: LogFormat,

    #[arg(
        long,
        help = "Maximum number of log files to retain (only applies if log_file is set)"
    )]
    pub log_max_files: Option<usize>,
}

impl Cli {
    pub async fn execute(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let log_config = LogConfig {
            level: self.log_level,
            format: self.log_format,
            file_path: self.log_file.clone(),
            max_log_files: self.log_max_files,
        };

        configure_global_tracing(log_config);

        let config = ProxyConfig {
            host: self.host.clone(),
            port: self.port,
            ..ProxyConfig::default()
        };

        println!("Starting caching proxy v{}", env!("CARGO_PKG_VERSION"));
        println!("  → Listening on: {}:{}", config.host, config.port);
        println!("  → Concurrent clients: {}", config.max_clients);
        println!(
            "  → Cache: {} MiB total, {} KiB per entry",
            config.cache.max_size >> 20,
            config.cache.max_element_size >> 10
        );
        println!("  → Log Level: {:?}", self.log_level);

        // The one long-lived cache, shared by every worker.
        let cache = HttpCache::new(config.cache);

        // A bind/listen failure propagates out of main, which exits with
        // status 1.
        start_proxy_server(config, cache).await
    }
}
