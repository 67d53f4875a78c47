use crate::client::RequestError;

/// Largest HTTP request the builder will serialize, in bytes.
pub const MAX_REQUEST_SIZE: usize = 4096;

/// Largest FTP/TELNET command line, in bytes, including any line terminator.
pub const MAX_COMMAND_SIZE: usize = 1024;

/// Build an HTTP/1.1 request.
///
/// The request carries exactly three headers: `Host`, `Connection: close` and
/// `Content-Length` (0 when there is no body). The body follows the blank line
/// verbatim.
///
/// # Arguments
///
/// * `method` - The request method token, e.g. `GET`.
/// * `path` - The request target. `/` is used when absent.
/// * `host` - The value of the `Host` header.
/// * `body` - An optional request body.
///
/// # Returns
///
/// * `Result<Vec<u8>, RequestError>` - The serialized request, or `RequestTooLarge` when it exceeds [`MAX_REQUEST_SIZE`].
pub fn build(
    method: &str,
    path: Option<&str>,
    host: &str,
    body: Option<&str>,
) -> Result<Vec<u8>, RequestError> {
    let body = body.unwrap_or("");
    let request = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\nContent-Length: {}\r\n\r\n",
        method,
        path.unwrap_or("/"),
        host,
        body.len()
    );

    let mut request_bytes = request.into_bytes();
    request_bytes.extend_from_slice(body.as_bytes());

    check_size(request_bytes, MAX_REQUEST_SIZE)
}

/// Build an FTP command line: the command followed by CRLF.
pub fn build_ftp_command(command: &str) -> Result<Vec<u8>, RequestError> {
    check_size(format!("{}\r\n", command).into_bytes(), MAX_COMMAND_SIZE)
}

/// Build a TELNET command line. The command is sent exactly as given.
pub fn build_telnet_command(command: &str) -> Result<Vec<u8>, RequestError> {
    check_size(command.as_bytes().to_vec(), MAX_COMMAND_SIZE)
}

fn check_size(bytes: Vec<u8>, limit: usize) -> Result<Vec<u8>, RequestError> {
    if bytes.len() > limit {
        log::error!("Request of {} bytes exceeds the {} byte limit", bytes.len(), limit);
        return Err(RequestError::RequestTooLarge {
            size: bytes.len(),
            limit,
        });
    }
    Ok(bytes)
}
