//! Request path cleaning.

use percent_encoding::percent_decode_str;

/// Clean a request path the way an HTTP directory handler does.
///
/// The path is treated as rooted: `.` segments are dropped, `..` pops a
/// segment but never climbs above the root, and empty segments collapse.
/// The result is relative (no leading `/`) and safe to join onto a root.
pub fn clean_request_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Decode a request URL into a cleaned path: percent-decoding,
/// query string and fragment removal.
pub fn decode_url_path(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    Some(clean_request_path(&decoded))
}
