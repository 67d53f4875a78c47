//! HTTP/1.1 over raw sockets: URL parsing, request serialization, the
//! plaintext/TLS transport, and response splitting.

pub mod request;
pub mod response;
pub mod transport;
pub mod url;

pub use request::{build as build_http_request, MAX_COMMAND_SIZE, MAX_REQUEST_SIZE};
pub use response::HttpResponse;
pub use transport::{Transport, MAX_RESPONSE_READ, MAX_RESPONSE_SIZE};
pub use url::{
    decode_percent_encoding, decode_percent_encoding_lossy, normalize, parse as parse_url,
    ParsedUrl,
};
