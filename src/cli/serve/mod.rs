//! File server over the file access adapter.
//!
//! Requests map to [`AssetFs::open`]: files are streamed with their MIME
//! type, directories serve `index.html` when present and a listing
//! otherwise, and anything the adapter reports as not found is a 404.

mod response;

use std::net::{IpAddr, SocketAddr};
use std::thread;

use anyhow::{Context, Result, anyhow};
use staticfiles::utils::path::request::decode_url_path;
use staticfiles::{AssetFs, Storage, debug, log};
use tiny_http::{Request, Server};

use crate::config::Config;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Threads pulling requests off the shared server.
const WORKERS: usize = 4;

/// Bind and run the request loop (blocking).
pub fn serve(config: &Config) -> Result<()> {
    let output = &config.collect.output;
    let mut storage = Storage::new(output)
        .with_context(|| format!("Failed to open storage at {}", output.display()))?;
    for input in &config.collect.inputs {
        storage.add_input_dir(input);
    }
    storage.enabled = config.serve.enabled;
    storage.allow_listing = config.serve.listing;

    let (server, addr) = bind_with_retry(config.serve.interface, config.serve.port)?;
    if storage.enabled {
        log!("serve"; "http://{} ({})", addr, output.display());
    } else {
        log!("serve"; "http://{} (passthrough)", addr);
    }

    let fs = storage.file_system();
    thread::scope(|s| {
        for _ in 0..WORKERS {
            s.spawn(|| run_request_loop(&server, &fs));
        }
    });
    Ok(())
}

/// Bind to the specified interface and port, with automatic port retry.
fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_err = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_err.map(|e| e.to_string()).unwrap_or_default()
    ))
}

fn run_request_loop(server: &Server, fs: &AssetFs) {
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, fs) {
            log!("serve"; "request error: {e:#}");
        }
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, fs: &AssetFs) -> Result<()> {
    debug!("serve"; "{} {}", request.method(), request.url());

    let Some(path) = decode_url_path(request.url()) else {
        return response::respond_not_found(request);
    };

    let file = match fs.open(&path) {
        Ok(file) => file,
        Err(e) if e.is_not_found() => return response::respond_not_found(request),
        Err(e) => return Err(e.into()),
    };

    if !file.is_dir() {
        return response::respond_file(request, file);
    }

    // Relative links in index pages and listings need the trailing slash
    let url_path = url_path(request.url());
    if !url_path.ends_with('/') {
        let location = format!("{url_path}/");
        return response::respond_redirect(request, &location);
    }

    match fs.open(&join_request_path(&path, "index.html")) {
        Ok(index) if !index.is_dir() => return response::respond_file(request, index),
        Ok(_) => {}
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e.into()),
    }

    let entries = file.read_dir()?;
    response::respond_listing(request, &path, &entries)
}

/// Path component of a request URL, without query or fragment.
fn url_path(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

fn join_request_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}
