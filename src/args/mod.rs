use clap::{builder::FalseyValueParser, Parser};
use std::time::Duration;

use crate::config::{ClientConfig, ReadMode, TlsVersion};

/// Represents command line arguments for the client
#[derive(Debug, Clone, Parser)]
#[command(name = "rawcurl", version)]
#[command(about = "rawcurl - A minimal HTTP(S) client")]
#[command(after_help = "Examples:\n    \
    rawcurl http://127.0.0.1:8080/\n    \
    rawcurl -k https://10.0.0.5/status\n    \
    rawcurl -c HELP ftp://10.0.0.7")]
pub struct Args {
    /// Target URL; the host must be a dotted-quad IPv4 address
    pub url: String,

    /// Send COMMAND over the URL's ftp, telnet or ssh scheme instead of the HTTP methods
    #[arg(short, long, value_name = "COMMAND")]
    pub command: Option<String>,

    /// Print the parsed components of the URL and exit
    #[arg(long)]
    pub dump_url: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Connect, read and write timeout in milliseconds (0 waits forever)
    #[arg(long = "timeout", value_name = "MS", env = "RAWCURL_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Minimum TLS version (1.0, 1.1 or 1.2)
    #[arg(long, value_name = "VERSION", default_value = "1.2", env = "RAWCURL_TLS_VERSION")]
    pub tls_version: TlsVersion,

    /// Accept invalid TLS certificates and hostnames
    #[arg(short = 'k', long, env = "RAWCURL_INSECURE", value_parser = FalseyValueParser::new())]
    pub insecure: bool,

    /// Keep reading until the server closes the connection instead of a single 8 KiB read
    #[arg(long, env = "RAWCURL_READ_UNTIL_CLOSE", value_parser = FalseyValueParser::new())]
    pub read_until_close: bool,

    /// Send the URL's query string on the request line along with the path
    #[arg(long, env = "RAWCURL_FORWARD_QUERY", value_parser = FalseyValueParser::new())]
    pub forward_query: bool,
}

impl Args {
    /// Build the client configuration these arguments describe.
    pub fn client_config(&self) -> ClientConfig {
        let read_mode = if self.read_until_close {
            ReadMode::UntilClose
        } else {
            ReadMode::Single
        };

        ClientConfig::default()
            .with_min_tls_version(self.tls_version)
            .with_accept_invalid_certs(self.insecure)
            .with_timeout(
                self.timeout_ms
                    .filter(|ms| *ms > 0)
                    .map(Duration::from_millis),
            )
            .with_read_mode(read_mode)
            .with_forward_query(self.forward_query)
    }
}
