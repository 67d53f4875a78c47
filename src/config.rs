use std::{fmt, str::FromStr, time::Duration};

/// How many reads make up one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// A single read of at most 8192 bytes. Longer responses are truncated.
    #[default]
    Single,
    /// Keep reading until the peer closes the connection or the declared
    /// `Content-Length` has arrived, up to 10 MiB.
    UntilClose,
}

/// Minimum TLS protocol version accepted during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVersion {
    V1_0,
    V1_1,
    #[default]
    V1_2,
}

impl TlsVersion {
    pub fn protocol(self) -> native_tls::Protocol {
        match self {
            TlsVersion::V1_0 => native_tls::Protocol::Tlsv10,
            TlsVersion::V1_1 => native_tls::Protocol::Tlsv11,
            TlsVersion::V1_2 => native_tls::Protocol::Tlsv12,
        }
    }
}

impl FromStr for TlsVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.0" => Ok(TlsVersion::V1_0),
            "1.1" => Ok(TlsVersion::V1_1),
            "1.2" => Ok(TlsVersion::V1_2),
            other => Err(format!(
                "Unsupported TLS version '{}' (expected 1.0, 1.1 or 1.2)",
                other
            )),
        }
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = match self {
            TlsVersion::V1_0 => "1.0",
            TlsVersion::V1_1 => "1.1",
            TlsVersion::V1_2 => "1.2",
        };
        f.write_str(version)
    }
}

/// Settings shared by every request a [`Client`](crate::client::Client) makes.
///
/// The defaults reproduce the plain behavior: TLS 1.2 or newer with
/// certificate verification, no timeouts, a single bounded read, and a
/// request line that carries the bare path.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub min_tls_version: TlsVersion,
    /// Skip certificate and hostname verification.
    pub accept_invalid_certs: bool,
    /// Applied to connect, read and write when set.
    pub timeout: Option<Duration>,
    pub read_mode: ReadMode,
    /// Append `?query` to the path on the request line.
    pub forward_query: bool,
}

impl ClientConfig {
    pub fn with_min_tls_version(mut self, version: TlsVersion) -> Self {
        self.min_tls_version = version;
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_read_mode(mut self, read_mode: ReadMode) -> Self {
        self.read_mode = read_mode;
        self
    }

    pub fn with_forward_query(mut self, forward: bool) -> Self {
        self.forward_query = forward;
        self
    }
}
