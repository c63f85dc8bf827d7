//! HTTP response handlers.

use anyhow::{Result, anyhow};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use staticfiles::OpenFile;
use staticfiles::utils::mime::{self, types::{HTML, PLAIN}};
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Characters escaped in listing links.
const LINK_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Stream an opened file with its MIME type.
pub fn respond_file(request: Request, file: OpenFile) -> Result<()> {
    let content_type = mime::from_path(file.path());

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let length = usize::try_from(file.len()).ok();
    let response = Response::new(
        StatusCode(200),
        vec![make_header("Content-Type", content_type)],
        file,
        length,
        None,
    );
    request.respond(response)?;
    Ok(())
}

/// Respond with an HTML listing of a directory.
pub fn respond_listing(request: Request, path: &str, entries: &[String]) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 200, HTML);
    }
    send_body(request, 200, HTML, render_listing(path, entries).into_bytes())
}

pub fn respond_not_found(request: Request) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 404, PLAIN);
    }
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// 301 to `location` (directory requests missing their trailing slash).
pub fn respond_redirect(request: Request, location: &str) -> Result<()> {
    let location = Header::from_bytes("Location", location.as_bytes())
        .map_err(|_| anyhow!("invalid redirect location `{location}`"))?;
    let response = Response::empty(StatusCode(301)).with_header(location);
    request.respond(response)?;
    Ok(())
}

/// Render a minimal index page; directory entries end with `/`.
fn render_listing(path: &str, entries: &[String]) -> String {
    let title = escape_html(&format!("/{path}"));
    let mut body = format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n<ul>\n"
    );
    if !path.is_empty() {
        body.push_str("<li><a href=\"../\">../</a></li>\n");
    }
    for name in entries {
        let href = utf8_percent_encode(name, LINK_ESCAPE).to_string();
        body.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            escape_html(&href),
            escape_html(name)
        ));
    }
    body.push_str("</ul>\n</body></html>\n");
    body
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response =
        Response::empty(StatusCode(status)).with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}
