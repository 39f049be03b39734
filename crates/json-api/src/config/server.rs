//! Listener Config

use clap::Args;

/// Where the Martina JSON API accepts connections.
#[derive(Debug, Args)]
pub struct ListenConfig {
    /// Interface to listen on, IPv4 or IPv6
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value = "8698")]
    pub port: u16,
}

impl ListenConfig {
    /// The `host:port` string the TCP listener binds to.
    ///
    /// Bare IPv6 hosts are bracketed, so `::` becomes `[::]:8698`.
    #[must_use]
    pub fn socket_addr(&self) -> String {
        let host = self.host.trim_matches(|c| c == '[' || c == ']');

        if host.contains(':') {
            format!("[{host}]:{}", self.port)
        } else {
            format!("{host}:{}", self.port)
        }
    }
}
