// src/server/listing.rs

use std::path::Path;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::server::inject::inject_client_script;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Bytes that cannot appear raw in one path segment of an `href`.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Read `dir` into listing rows: directories first, then files, each group
/// sorted by name.
pub async fn read_listing(dir: &Path) -> std::io::Result<Vec<ListingEntry>> {
    let mut entries = Vec::new();
    let mut rd = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        let is_dir = entry.file_type().await?.is_dir();
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

/// HTML page for `url_path` (which ends with `/`), with the reload client
/// already injected.
pub fn render_listing(url_path: &str, entries: &[ListingEntry]) -> String {
    let title = escape_html(url_path);
    let mut rows = String::new();
    if url_path != "/" {
        rows.push_str("<li><a href=\"../\">../</a></li>\n");
    }
    for entry in entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        let href = escape_html(&utf8_percent_encode(&entry.name, SEGMENT).to_string());
        let name = escape_html(&entry.name);
        rows.push_str(&format!("<li><a href=\"{href}{suffix}\">{name}{suffix}</a></li>\n"));
    }

    let page = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Index of {title}</title></head>\n\
         <body>\n<h1>Index of {title}</h1>\n<ul>\n{rows}</ul>\n</body>\n</html>\n"
    );
    inject_client_script(&page)
}
