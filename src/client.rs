use std::{fmt, io, net::SocketAddr};

use crate::{
    config::{ClientConfig, ReadMode},
    http::{
        request,
        response::HttpResponse,
        transport::{self, Transport},
        url::{self, ParsedUrl},
    },
};

/// Body sent back by [`ssh_request`].
pub const SSH_NOT_IMPLEMENTED: &str = "SSH request not implemented";

/// Error type for request operations
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectError),
    #[error("TLS error: {0}")]
    Tls(String),
    #[error("Write error: {0}")]
    Write(#[source] io::Error),
    #[error("Read error: {0}")]
    Read(#[source] io::Error),
    #[error("Request too large: {size} bytes exceeds the {limit} byte limit")]
    RequestTooLarge { size: usize, limit: usize },
}

/// The distinct ways opening a connection can fail.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("invalid host address '{0}' (expected a dotted-quad IPv4 address)")]
    InvalidAddress(String),
    #[error("invalid port {0}")]
    InvalidPort(i32),
    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("socket setup failed: {0}")]
    Socket(#[source] io::Error),
}

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    /// Sent on the wire as `UPDATE`.
    Update,
    Trace,
    Head,
    Options,
}

impl Method {
    /// Every method, in the order the command line runs them.
    pub const ALL: [Method; 8] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Update,
        Method::Trace,
        Method::Head,
        Method::Options,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Update => "UPDATE",
            Method::Trace => "TRACE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    /// Whether the command line sends a body with this method.
    pub fn takes_body(self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Update)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The protocols a request can be made over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
    Ftp,
    Telnet,
    /// Recognized, but no SSH exchange is implemented.
    Ssh,
}

impl Protocol {
    /// Map a URL scheme to a protocol, ignoring case.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "http" => Some(Protocol::Http),
            "https" => Some(Protocol::Https),
            "ftp" => Some(Protocol::Ftp),
            "telnet" => Some(Protocol::Telnet),
            "ssh" => Some(Protocol::Ssh),
            _ => None,
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Http => 80,
            Protocol::Https => 443,
            Protocol::Ftp => 21,
            Protocol::Telnet => 23,
            Protocol::Ssh => 22,
        }
    }

    pub fn uses_tls(self) -> bool {
        self == Protocol::Https
    }

    pub fn is_implemented(self) -> bool {
        self != Protocol::Ssh
    }

    pub fn name(self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
            Protocol::Ftp => "FTP",
            Protocol::Telnet => "TELNET",
            Protocol::Ssh => "SSH",
        }
    }
}

/// A blocking client that makes one request per call.
///
/// Every call opens its own connection, sends `Connection: close`, and closes
/// the connection before returning, whether the request succeeded or not.
#[derive(Debug, Clone, Default)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Send an HTTP request and parse the response.
    ///
    /// # Arguments
    ///
    /// * `method` - The request method.
    /// * `url` - The target URL. It is normalized first, so `10.0.0.1` means `http://10.0.0.1/`.
    /// * `body` - An optional request body.
    ///
    /// # Returns
    ///
    /// * `Result<HttpResponse, RequestError>` - The parsed response, or an error if the request could not be completed.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
    ) -> Result<HttpResponse, RequestError> {
        let parsed = url::parse(&url::normalize(url));
        let scheme = require_host_and_scheme(&parsed)?;

        let protocol = if scheme.eq_ignore_ascii_case("https") {
            Protocol::Https
        } else {
            Protocol::Http
        };
        let port = parsed.effective_port(protocol.default_port())?;

        log::debug!("{} {} ({}:{})", method, url, parsed.host, port);
        let target = if self.config.forward_query {
            Some(parsed.request_target())
        } else {
            parsed.path.clone()
        };
        let request_bytes =
            request::build(method.as_str(), target.as_deref(), &parsed.host, body)?;

        let mut transport = Transport::connect(&parsed.host, port, protocol.uses_tls(), &self.config)?;
        let exchanged = exchange(&mut transport, &request_bytes, self.config.read_mode);
        transport.close();

        Ok(HttpResponse::parse(&exchanged?))
    }

    pub fn get(&self, url: &str) -> Result<HttpResponse, RequestError> {
        self.request(Method::Get, url, None)
    }

    pub fn post(&self, url: &str, body: Option<&str>) -> Result<HttpResponse, RequestError> {
        self.request(Method::Post, url, body)
    }

    pub fn put(&self, url: &str, body: Option<&str>) -> Result<HttpResponse, RequestError> {
        self.request(Method::Put, url, body)
    }

    pub fn delete(&self, url: &str) -> Result<HttpResponse, RequestError> {
        self.request(Method::Delete, url, None)
    }

    pub fn update(&self, url: &str, body: Option<&str>) -> Result<HttpResponse, RequestError> {
        self.request(Method::Update, url, body)
    }

    pub fn trace(&self, url: &str) -> Result<HttpResponse, RequestError> {
        self.request(Method::Trace, url, None)
    }

    pub fn head(&self, url: &str) -> Result<HttpResponse, RequestError> {
        self.request(Method::Head, url, None)
    }

    pub fn options(&self, url: &str) -> Result<HttpResponse, RequestError> {
        self.request(Method::Options, url, None)
    }

    /// Send a literal command over FTP, TELNET or SSH and return whatever
    /// comes back as the body.
    ///
    /// The URL is used as given, without normalization, and must carry both
    /// a scheme and a host. A single bounded read is made regardless of the
    /// configured read mode, since these peers keep the connection open.
    /// `Protocol::Ssh` makes no connection at all.
    pub fn raw_request(
        &self,
        protocol: Protocol,
        url: &str,
        command: &str,
    ) -> Result<HttpResponse, RequestError> {
        if !protocol.is_implemented() {
            return Ok(HttpResponse::with_body(SSH_NOT_IMPLEMENTED));
        }

        let payload = match protocol {
            Protocol::Ftp => request::build_ftp_command(command)?,
            Protocol::Telnet => request::build_telnet_command(command)?,
            Protocol::Http | Protocol::Https | Protocol::Ssh => {
                return Err(RequestError::InvalidUrl(format!(
                    "{} is not a raw command protocol",
                    protocol.name()
                )))
            }
        };

        let parsed = url::parse(url);
        require_host_and_scheme(&parsed)?;
        let port = parsed.effective_port(protocol.default_port())?;

        log::debug!("{} {:?} ({}:{})", protocol.name(), command, parsed.host, port);
        let mut transport = Transport::connect(&parsed.host, port, false, &self.config)?;
        let exchanged = exchange(&mut transport, &payload, ReadMode::Single);
        transport.close();

        Ok(HttpResponse::raw(&exchanged?))
    }

    pub fn ftp(&self, url: &str, command: &str) -> Result<HttpResponse, RequestError> {
        self.raw_request(Protocol::Ftp, url, command)
    }

    pub fn telnet(&self, url: &str, command: &str) -> Result<HttpResponse, RequestError> {
        self.raw_request(Protocol::Telnet, url, command)
    }

    pub fn ssh(&self, url: &str, command: &str) -> Result<HttpResponse, RequestError> {
        self.raw_request(Protocol::Ssh, url, command)
    }
}

fn require_host_and_scheme(parsed: &ParsedUrl) -> Result<&str, RequestError> {
    match parsed.scheme.as_deref() {
        Some(scheme) if parsed.has_host() => Ok(scheme),
        _ => {
            log::error!("Invalid URL: missing host or scheme");
            Err(RequestError::InvalidUrl(
                "URL must name a scheme and a host".to_string(),
            ))
        }
    }
}

fn exchange(
    transport: &mut Transport,
    payload: &[u8],
    mode: ReadMode,
) -> Result<Vec<u8>, RequestError> {
    transport::send_request(transport, payload)?;
    transport::read_response(transport, mode)
}

pub fn http_get(url: &str) -> Result<HttpResponse, RequestError> {
    Client::default().get(url)
}

pub fn http_post(url: &str, body: Option<&str>) -> Result<HttpResponse, RequestError> {
    Client::default().post(url, body)
}

pub fn http_put(url: &str, body: Option<&str>) -> Result<HttpResponse, RequestError> {
    Client::default().put(url, body)
}

pub fn http_delete(url: &str) -> Result<HttpResponse, RequestError> {
    Client::default().delete(url)
}

pub fn http_update(url: &str, body: Option<&str>) -> Result<HttpResponse, RequestError> {
    Client::default().update(url, body)
}

pub fn http_trace(url: &str) -> Result<HttpResponse, RequestError> {
    Client::default().trace(url)
}

pub fn http_head(url: &str) -> Result<HttpResponse, RequestError> {
    Client::default().head(url)
}

pub fn http_options(url: &str) -> Result<HttpResponse, RequestError> {
    Client::default().options(url)
}

pub fn ftp_request(url: &str, command: &str) -> Result<HttpResponse, RequestError> {
    Client::default().ftp(url, command)
}

pub fn telnet_request(url: &str, command: &str) -> Result<HttpResponse, RequestError> {
    Client::default().telnet(url, command)
}

/// Placeholder for SSH: no connection is made and the body says so.
pub fn ssh_request(url: &str, command: &str) -> Result<HttpResponse, RequestError> {
    Client::default().ssh(url, command)
}
