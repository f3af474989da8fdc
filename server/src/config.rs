use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use clap::Args;
use sweeper_protocol::{DEFAULT_PORT, DEFAULT_SCORES_PATH, DEFAULT_STOP_SECRET};

/// Settings for one leaderboard server instance.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "SWEEPER_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Port to listen on, 0 picks a free one.
    #[arg(short, long, env = "SWEEPER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// File the scores are loaded from and saved to.
    #[arg(long = "scores", env = "SWEEPER_SCORES", default_value = DEFAULT_SCORES_PATH)]
    pub scores_path: PathBuf,

    /// Password expected by `/stop`.
    #[arg(
        long,
        env = "SWEEPER_STOP_SECRET",
        default_value = DEFAULT_STOP_SECRET,
        hide_env_values = true,
        hide_default_value = true
    )]
    pub stop_secret: String,
}

impl ServerConfig {
    /// Loopback config on a free port, handy for embedding and tests.
    pub fn local(scores_path: impl Into<PathBuf>) -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            scores_path: scores_path.into(),
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            scores_path: PathBuf::from(DEFAULT_SCORES_PATH),
            stop_secret: DEFAULT_STOP_SECRET.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        server: ServerConfig,
    }

    #[test]
    fn cli_defaults_match_default_config() {
        let cli = Cli::try_parse_from(["sweeper-server"]).unwrap();
        let default = ServerConfig::default();

        assert_eq!(cli.server.port, default.port);
        assert_eq!(cli.server.bind, default.bind);
        assert_eq!(cli.server.scores_path, default.scores_path);
        assert_eq!(cli.server.stop_secret, default.stop_secret);
    }

    #[test]
    fn cli_overrides() {
        let cli = Cli::try_parse_from([
            "sweeper-server",
            "--port",
            "8080",
            "--scores",
            "/tmp/board.txt",
            "--bind",
            "127.0.0.1",
        ])
        .unwrap();

        assert_eq!(cli.server.port, 8080);
        assert_eq!(cli.server.scores_path, PathBuf::from("/tmp/board.txt"));
        assert_eq!(cli.server.bind, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
}
