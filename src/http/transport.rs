use native_tls::{TlsConnector, TlsStream};
use std::io::{self, ErrorKind, Read, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, SocketAddrV4, TcpStream};

use crate::client::{ConnectError, RequestError};
use crate::config::{ClientConfig, ReadMode};
use crate::http::response::{find_header_end, header_value};

/// Size of the receive buffer, and the most a single read will return.
pub const MAX_RESPONSE_READ: usize = 8192;

/// Upper bound on a response read in [`ReadMode::UntilClose`].
pub const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// An open connection, plaintext or TLS.
///
/// The variant is chosen once at connect time; everything above this layer
/// talks to it through `Read` and `Write`.
pub enum Transport {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl Transport {
    /// Open a connection to `host:port`, optionally wrapped in TLS.
    ///
    /// `host` must be a literal IPv4 address; names are never resolved.
    pub fn connect(
        host: &str,
        port: u16,
        tls: bool,
        config: &ClientConfig,
    ) -> Result<Self, RequestError> {
        let stream = setup_tcp_stream(host, port, config)?;

        if !tls {
            return Ok(Transport::Plain(stream));
        }

        let connector = tls_connector(config)?;
        log::debug!("Starting TLS handshake with {} (minimum TLS {})", host, config.min_tls_version);

        // On failure the handshake error owns the socket, so dropping it
        // closes the connection as well.
        match connector.connect(host, stream) {
            Ok(tls_stream) => Ok(Transport::Tls(Box::new(tls_stream))),
            Err(err) => {
                log::error!("TLS handshake with {}:{} failed: {}", host, port, err);
                Err(RequestError::Tls(format!("TLS handshake error: {}", err)))
            }
        }
    }

    /// Shut the connection down and release the socket.
    pub fn close(self) {
        let result = match self {
            Transport::Plain(stream) => stream.shutdown(Shutdown::Both),
            Transport::Tls(mut stream) => {
                if let Err(err) = stream.shutdown() {
                    log::debug!("TLS close_notify failed: {}", err);
                }
                stream.get_ref().shutdown(Shutdown::Both)
            }
        };

        if let Err(err) = result {
            log::debug!("Socket shutdown failed: {}", err);
        }
    }
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(stream) => stream.read(buf),
            Transport::Tls(stream) => stream.read(buf),
        }
    }
}

impl Write for Transport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(stream) => stream.write(buf),
            Transport::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Transport::Plain(stream) => stream.flush(),
            Transport::Tls(stream) => stream.flush(),
        }
    }
}

/// Connect a TCP stream to a literal IPv4 address and apply the configured
/// timeouts.
pub fn setup_tcp_stream(
    host: &str,
    port: u16,
    config: &ClientConfig,
) -> Result<TcpStream, ConnectError> {
    let ip: Ipv4Addr = host.parse().map_err(|_| {
        log::error!("Invalid host address: {}", host);
        ConnectError::InvalidAddress(host.to_string())
    })?;
    let addr = SocketAddr::V4(SocketAddrV4::new(ip, port));

    log::debug!("Connecting to {}...", addr);
    let connected = match config.timeout {
        Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
        None => TcpStream::connect(addr),
    };
    let stream = connected.map_err(|source| {
        log::error!("Connection to {} failed: {}", addr, source);
        ConnectError::Connect { addr, source }
    })?;

    if config.timeout.is_some() {
        stream
            .set_read_timeout(config.timeout)
            .and_then(|_| stream.set_write_timeout(config.timeout))
            .map_err(|err| {
                log::error!("Failed to set socket timeouts: {}", err);
                ConnectError::Socket(err)
            })?;
    }

    Ok(stream)
}

fn tls_connector(config: &ClientConfig) -> Result<TlsConnector, RequestError> {
    TlsConnector::builder()
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .danger_accept_invalid_hostnames(config.accept_invalid_certs)
        .min_protocol_version(Some(config.min_tls_version.protocol()))
        .build()
        .map_err(|err| {
            log::error!("Unable to create TLS context: {}", err);
            RequestError::Tls(format!("Unable to create TLS context: {}", err))
        })
}

/// Write the whole request to the stream.
pub fn send_request<W: Write>(stream: &mut W, request: &[u8]) -> Result<(), RequestError> {
    log::debug!("Sending {} bytes...", request.len());
    stream
        .write_all(request)
        .and_then(|_| stream.flush())
        .map_err(|err| {
            log::error!("Write error: {}", err);
            RequestError::Write(err)
        })
}

/// Read a response from any stream that implements `Read`.
///
/// # Arguments
///
/// * `stream` - The connection to read from.
/// * `mode` - Whether to stop after one read or keep going until the peer is done.
///
/// # Returns
///
/// * `Result<Vec<u8>, RequestError>` - The bytes received, or a `Read` error if nothing could be read.
pub fn read_response<R: Read>(stream: &mut R, mode: ReadMode) -> Result<Vec<u8>, RequestError> {
    log::debug!("Waiting for response...");
    let response = match mode {
        ReadMode::Single => read_once(stream)?,
        ReadMode::UntilClose => read_until_close(stream)?,
    };
    log::debug!("Received {} bytes", response.len());
    Ok(response)
}

fn read_once<R: Read>(stream: &mut R) -> Result<Vec<u8>, RequestError> {
    let mut buffer = vec![0u8; MAX_RESPONSE_READ];
    let n = loop {
        match stream.read(&mut buffer) {
            Ok(n) => break n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                log::error!("Read error: {}", err);
                return Err(RequestError::Read(err));
            }
        }
    };

    if n == MAX_RESPONSE_READ {
        log::warn!(
            "Response filled the {} byte receive buffer and may be truncated",
            MAX_RESPONSE_READ
        );
    }
    buffer.truncate(n);
    Ok(buffer)
}

fn read_until_close<R: Read>(stream: &mut R) -> Result<Vec<u8>, RequestError> {
    let mut response = Vec::new();
    let mut buffer = [0u8; MAX_RESPONSE_READ];

    loop {
        match stream.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                response.extend_from_slice(&buffer[..n]);

                if let Some(expected) = expected_size(&response) {
                    if response.len() >= expected {
                        log::debug!("Response complete based on Content-Length");
                        break;
                    }
                }

                if response.len() >= MAX_RESPONSE_SIZE {
                    log::warn!("Response too large, truncating at {} bytes", MAX_RESPONSE_SIZE);
                    response.truncate(MAX_RESPONSE_SIZE);
                    break;
                }
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if !response.is_empty() => {
                log::debug!(
                    "Read error, keeping partial response of {} bytes: {}",
                    response.len(),
                    err
                );
                break;
            }
            Err(err) => {
                log::error!("Read error: {}", err);
                return Err(RequestError::Read(err));
            }
        }
    }

    Ok(response)
}

/// Total size of the response once its header block announces a
/// `Content-Length`.
fn expected_size(response: &[u8]) -> Option<usize> {
    let header_end = find_header_end(response)?;
    let headers = String::from_utf8_lossy(&response[..header_end]);
    let length = header_value(&headers, "Content-Length")?.parse::<usize>().ok()?;
    header_end.checked_add(4)?.checked_add(length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::net::TcpListener;

    /// Hands out one chunk per read and fails once the chunks run out.
    struct ChunkedReader {
        chunks: Vec<Vec<u8>>,
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Err(io::Error::new(ErrorKind::Other, "read past the last chunk"));
            }
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn test_single_read_truncates() {
        let mut stream = Cursor::new(vec![b'a'; MAX_RESPONSE_READ + 1000]);
        let response = read_response(&mut stream, ReadMode::Single).unwrap();
        assert_eq!(response.len(), MAX_RESPONSE_READ);
    }

    #[test]
    fn test_single_read_takes_only_the_first_chunk() {
        let mut stream = ChunkedReader {
            chunks: vec![b"HTTP/1.1 200 OK\r\n".to_vec(), b"\r\nbody".to_vec()],
        };
        let response = read_response(&mut stream, ReadMode::Single).unwrap();
        assert_eq!(response, b"HTTP/1.1 200 OK\r\n");
    }

    #[test]
    fn test_until_close_reads_to_eof() {
        let mut stream = Cursor::new(vec![b'z'; MAX_RESPONSE_READ * 3]);
        let response = read_response(&mut stream, ReadMode::UntilClose).unwrap();
        assert_eq!(response.len(), MAX_RESPONSE_READ * 3);
    }

    #[test]
    fn test_until_close_stops_at_content_length() {
        let mut stream = ChunkedReader {
            chunks: vec![
                b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nhello".to_vec(),
                b"world".to_vec(),
            ],
        };
        let response = read_response(&mut stream, ReadMode::UntilClose).unwrap();
        assert!(response.ends_with(b"helloworld"));
    }

    #[test]
    fn test_until_close_survives_huge_content_length() {
        let mut stream = Cursor::new(
            b"HTTP/1.1 200 OK\r\nContent-Length: 18446744073709551615\r\n\r\nx".to_vec(),
        );
        let response = read_response(&mut stream, ReadMode::UntilClose).unwrap();
        assert!(response.ends_with(b"\r\n\r\nx"));
    }

    #[test]
    fn test_until_close_keeps_partial_response_on_error() {
        let mut stream = ChunkedReader {
            chunks: vec![b"HTTP/1.1 200 OK\r\n\r\npartial".to_vec()],
        };
        let response = read_response(&mut stream, ReadMode::UntilClose).unwrap();
        assert!(response.ends_with(b"partial"));
    }

    #[test]
    fn test_read_error_without_data() {
        let mut stream = ChunkedReader { chunks: Vec::new() };
        assert!(matches!(
            read_response(&mut stream, ReadMode::Single),
            Err(RequestError::Read(_))
        ));
    }

    #[test]
    fn test_hostnames_are_not_resolved() {
        let result = Transport::connect("localhost", 80, false, &ClientConfig::default());
        assert!(matches!(
            result,
            Err(RequestError::Connection(ConnectError::InvalidAddress(host))) if host == "localhost"
        ));
    }

    #[test]
    fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = setup_tcp_stream("127.0.0.1", port, &ClientConfig::default());
        assert!(matches!(result, Err(ConnectError::Connect { .. })));
    }

    #[test]
    fn test_plain_connect_and_close() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let transport = Transport::connect("127.0.0.1", port, false, &ClientConfig::default())
            .unwrap();
        assert!(matches!(transport, Transport::Plain(_)));
        let (mut accepted, _) = listener.accept().unwrap();
        transport.close();

        let mut buffer = [0u8; 16];
        assert_eq!(accepted.read(&mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_send_request_writes_everything() {
        let mut sink = Vec::new();
        send_request(&mut sink, b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(sink, b"GET / HTTP/1.1\r\n\r\n");
    }
}
