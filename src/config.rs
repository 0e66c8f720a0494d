use std::{fs::read_to_string, net::SocketAddr, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Server {
    ///
    /// signaling server listen
    ///
    /// The address and port browsers open their websocket connection to. The
    /// binding address supports ipv4 and ipv6.
    ///
    #[serde(default = "Server::listen")]
    pub listen: SocketAddr,
    ///
    /// Maximum size of a single websocket message or frame in bytes.
    ///
    /// A peer sending anything larger is disconnected. Session descriptions
    /// are the largest payloads relayed and stay well below the default.
    ///
    #[serde(default = "Server::max_message_size")]
    pub max_message_size: usize,
    ///
    /// Maximum number of frames queued for delivery to one peer.
    ///
    /// Frames addressed to a peer whose queue is full are dropped, a peer that
    /// stops reading can't make the server buffer without bound.
    ///
    #[serde(default = "Server::max_queued_messages")]
    pub max_queued_messages: usize,
    ///
    /// static assets directory
    ///
    /// When set, plain http requests to the listen address are answered with
    /// the files of this directory, so the browser client can be hosted by
    /// the signaling server itself.
    ///
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Server {
    fn listen() -> SocketAddr {
        "127.0.0.1:3001".parse().unwrap()
    }

    fn max_message_size() -> usize {
        64 * 1024
    }

    fn max_queued_messages() -> usize {
        256
    }
}

impl Default for Server {
    fn default() -> Self {
        Self {
            listen: Self::listen(),
            max_message_size: Self::max_message_size(),
            max_queued_messages: Self::max_queued_messages(),
            static_dir: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Runtime {
    ///
    /// Maximum number of threads the signaling server can use.
    ///
    #[serde(default = "Runtime::max_threads")]
    pub max_threads: usize,
}

impl Runtime {
    fn max_threads() -> usize {
        num_cpus::get()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self {
            max_threads: Self::max_threads(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_level(&self) -> log::Level {
        match *self {
            Self::Error => log::Level::Error,
            Self::Debug => log::Level::Debug,
            Self::Trace => log::Level::Trace,
            Self::Warn => log::Level::Warn,
            Self::Info => log::Level::Info,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Log {
    ///
    /// log level
    ///
    /// An enum representing the available verbosity levels of the logger.
    ///
    #[serde(default)]
    pub level: LogLevel,
    ///
    /// statistics interval
    ///
    /// How often, in seconds, the relay totals are written to the log. Zero
    /// disables the report.
    ///
    #[serde(default = "Log::stats_interval")]
    pub stats_interval: u64,
}

impl Log {
    fn stats_interval() -> u64 {
        60
    }
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            stats_interval: Self::stats_interval(),
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub runtime: Runtime,
    #[serde(default)]
    pub log: Log,
}

#[derive(Parser, Debug)]
#[command(
    about = env!("CARGO_PKG_DESCRIPTION"),
    version = env!("CARGO_PKG_VERSION"),
)]
struct Cli {
    ///
    /// Specify the configuration file path
    ///
    /// Example: peer-signaling --config /etc/peer-signaling/config.json5
    ///
    #[arg(long, short)]
    config: Option<String>,
}

impl Config {
    ///
    /// Load configure from config file and command line parameters.
    ///
    /// Load command line parameters, if the configuration file path is specified,
    /// the configuration is read from the configuration file, otherwise the
    /// default configuration is used.
    ///
    pub fn load() -> Result<Self> {
        match Cli::parse().config {
            Some(path) => Self::parse(&read_to_string(path)?),
            None => Ok(Self::default()),
        }
    }

    /// # Test
    ///
    /// ```
    /// use peer_signaling::config::*;
    ///
    /// let config = Config::parse(
    ///     r#"{
    ///         server: { listen: "0.0.0.0:8080", "static-dir": "./public" },
    ///         log: { level: "debug", "stats-interval": 0 },
    ///     }"#,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(config.server.listen, "0.0.0.0:8080".parse().unwrap());
    /// assert_eq!(config.server.max_message_size, 64 * 1024);
    /// assert_eq!(config.server.max_queued_messages, 256);
    /// assert_eq!(config.server.static_dir, Some(std::path::PathBuf::from("./public")));
    /// assert_eq!(config.log.level.as_level(), log::Level::Debug);
    /// assert_eq!(config.log.stats_interval, 0);
    /// ```
    pub fn parse(value: &str) -> Result<Self> {
        Ok(serde_json5::from_str::<Self>(value)?)
    }
}
