pub mod args;
pub mod client;
pub mod config;
pub mod http;
pub mod output;

// Re-export main types for easy access
pub use args::Args;
pub use client::{
    ftp_request, http_delete, http_get, http_head, http_options, http_post, http_put,
    http_trace, http_update, ssh_request, telnet_request, Client, ConnectError, Method,
    Protocol, RequestError,
};
pub use config::{ClientConfig, ReadMode, TlsVersion};
pub use http::{HttpResponse, ParsedUrl};
pub use output::format_response;
