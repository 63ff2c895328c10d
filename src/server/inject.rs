// src/server/inject.rs

//! Live-reload client script and its injection into HTML pages.

/// SSE endpoint the client subscribes to.
pub const EVENTS_PATH: &str = "/__mackerel/events";
/// Path the client script is served from.
pub const CLIENT_PATH: &str = "/__mackerel/client.js";

/// Reloads the page on every `reload` event, reconnecting after drops.
pub const CLIENT_JS: &str = r#"(function(){
  var retry = null;
  function connect(){
    var source = new EventSource('/__mackerel/events');
    source.addEventListener('reload', function(){
      location.reload();
    });
    source.onerror = function(){
      source.close();
      if (retry) clearTimeout(retry);
      retry = setTimeout(connect, 1000);
    };
  }
  connect();
})();
"#;

pub fn client_tag() -> String {
    format!(r#"<script src="{CLIENT_PATH}"></script>"#)
}

/// Insert the client tag before the last `</body>` (any case), or append
/// it when there is none. Pages that already carry the tag are untouched.
pub fn inject_client_script(html: &str) -> String {
    let tag = client_tag();
    if html.contains(&tag) {
        return html.to_string();
    }

    // ASCII lowercasing keeps byte offsets intact.
    let lower = html.to_ascii_lowercase();
    match lower.rfind("</body>") {
        Some(idx) => format!("{}{}{}", &html[..idx], tag, &html[idx..]),
        None => format!("{html}{tag}"),
    }
}
