/// Marks the end of the header block.
const HEADER_DELIMITER: &[u8] = b"\r\n\r\n";

/// A response as received on the wire.
///
/// The header block is kept as one opaque piece of text, exactly as the server
/// sent it (minus the terminating blank line).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code, or 0 when no status line could be read.
    pub status_code: u16,
    pub headers: Option<String>,
    pub body: Option<String>,
}

impl HttpResponse {
    /// Split raw HTTP response bytes into status code, headers and body.
    ///
    /// Without a `\r\n\r\n` delimiter neither headers nor body are set, but
    /// the status code is still extracted when a status line is present.
    pub fn parse(response: &[u8]) -> Self {
        let status_code = parse_status_code(response);

        let (headers, body) = match find_header_end(response) {
            Some(header_end) => (
                Some(String::from_utf8_lossy(&response[..header_end]).into_owned()),
                Some(
                    String::from_utf8_lossy(&response[header_end + HEADER_DELIMITER.len()..])
                        .into_owned(),
                ),
            ),
            None => (None, None),
        };

        Self {
            status_code,
            headers,
            body,
        }
    }

    /// Wrap bytes from a non-HTTP exchange: every byte becomes the body.
    pub fn raw(response: &[u8]) -> Self {
        Self {
            status_code: 0,
            headers: None,
            body: Some(String::from_utf8_lossy(response).into_owned()),
        }
    }

    /// A response that carries only a body, without any network exchange.
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            status_code: 0,
            headers: None,
            body: Some(body.into()),
        }
    }
}

/// Position of the first `\r\n\r\n`, if any.
pub fn find_header_end(response: &[u8]) -> Option<usize> {
    response
        .windows(HEADER_DELIMITER.len())
        .position(|window| window == HEADER_DELIMITER)
}

/// Find a header value inside a raw header block by case-insensitive name.
///
/// The status line is skipped, and the first matching header wins.
pub fn header_value<'a>(headers: &'a str, name: &str) -> Option<&'a str> {
    headers.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim())
    })
}

#[derive(Clone, Copy)]
enum StatusState {
    Major,
    Minor,
    Code,
}

/// Extract the status code from the first `HTTP/<major>.<minor> <code>` in
/// `response`.
///
/// The pattern is matched strictly: one or more digits, a dot, one or more
/// digits, a single space, then the code. Anything else yields 0.
pub fn parse_status_code(response: &[u8]) -> u16 {
    const MARKER: &[u8] = b"HTTP/";

    let start = match response
        .windows(MARKER.len())
        .position(|window| window == MARKER)
    {
        Some(pos) => pos + MARKER.len(),
        None => return 0,
    };

    let mut state = StatusState::Major;
    let mut digits = 0usize;
    let mut code: u32 = 0;

    for &byte in &response[start..] {
        match (state, byte) {
            (StatusState::Major, b'0'..=b'9') | (StatusState::Minor, b'0'..=b'9') => digits += 1,
            (StatusState::Major, b'.') if digits > 0 => {
                state = StatusState::Minor;
                digits = 0;
            }
            (StatusState::Minor, b' ') if digits > 0 => {
                state = StatusState::Code;
                digits = 0;
            }
            (StatusState::Code, b'0'..=b'9') => {
                digits += 1;
                code = code.saturating_mul(10).saturating_add(u32::from(byte - b'0'));
            }
            (StatusState::Code, _) => break,
            _ => return 0,
        }
    }

    match state {
        StatusState::Code if digits > 0 => u16::try_from(code).unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_not_found() {
        let response =
            HttpResponse::parse(b"HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\n\r\nNot found");
        assert_eq!(response.status_code, 404);
        assert_eq!(
            response.headers.as_deref(),
            Some("HTTP/1.1 404 Not Found\r\nContent-Type: text/plain")
        );
        assert_eq!(response.body.as_deref(), Some("Not found"));
    }

    #[test]
    fn test_parse_without_delimiter() {
        let response = HttpResponse::parse(b"HTTP/1.0 200 OK\r\nServer: x\r\n");
        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers, None);
        assert_eq!(response.body, None);
    }

    #[test]
    fn test_parse_empty_body() {
        let response = HttpResponse::parse(b"HTTP/1.1 204 No Content\r\n\r\n");
        assert_eq!(response.status_code, 204);
        assert_eq!(response.body.as_deref(), Some(""));
    }

    #[test]
    fn test_body_keeps_later_delimiters() {
        let response = HttpResponse::parse(b"HTTP/1.1 200 OK\r\n\r\na\r\n\r\nb");
        assert_eq!(response.headers.as_deref(), Some("HTTP/1.1 200 OK"));
        assert_eq!(response.body.as_deref(), Some("a\r\n\r\nb"));
    }

    #[test]
    fn test_status_code_state_machine() {
        assert_eq!(parse_status_code(b"HTTP/1.1 200 OK"), 200);
        assert_eq!(parse_status_code(b"HTTP/2.0 503"), 503);
        assert_eq!(parse_status_code(b"garbage HTTP/1.1 301 Moved"), 301);
        assert_eq!(parse_status_code(b"HTTP/1 200 OK"), 0);
        assert_eq!(parse_status_code(b"HTTP/1.1  200 OK"), 0);
        assert_eq!(parse_status_code(b"HTTP/1.1 OK"), 0);
        assert_eq!(parse_status_code(b"HTTP/.1 200"), 0);
        assert_eq!(parse_status_code(b"HTTP/1.1 99999999"), 0);
        assert_eq!(parse_status_code(b"220 FTP server ready"), 0);
        assert_eq!(parse_status_code(b""), 0);
    }

    #[test]
    fn test_raw_response() {
        let response = HttpResponse::raw(b"220 ready\r\n");
        assert_eq!(response.status_code, 0);
        assert_eq!(response.headers, None);
        assert_eq!(response.body.as_deref(), Some("220 ready\r\n"));
    }

    #[test]
    fn test_header_lookup() {
        let headers = "HTTP/1.1 200 OK\r\ncontent-length: 5\r\nX-Note: a: b";
        assert_eq!(header_value(headers, "Content-Length"), Some("5"));
        assert_eq!(header_value(headers, "x-note"), Some("a: b"));
        assert_eq!(header_value(headers, "Server"), None);
        assert_eq!(header_value("content-length: 9", "Content-Length"), None);
    }
}
