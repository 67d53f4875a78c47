use std::io::{self, Write};

use crate::http::HttpResponse;

/// Render a response as a labelled block.
///
/// Unset headers or body print as `(null)`.
///
/// # Arguments
///
/// * `label` - What produced the response, e.g. `GET` or `FTP`.
/// * `response` - The response to render.
///
/// # Returns
///
/// * `String` - The block, ending with a newline.
pub fn format_response(label: &str, response: &HttpResponse) -> String {
    format!(
        "{} Response:\nStatus: {}\nHeaders:\n{}\nBody:\n{}\n",
        label,
        response.status_code,
        response.headers.as_deref().unwrap_or("(null)"),
        response.body.as_deref().unwrap_or("(null)"),
    )
}

/// Print a response to stdout.
pub fn print_response(label: &str, response: &HttpResponse) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(format_response(label, response).as_bytes())?;
    stdout.flush()
}
