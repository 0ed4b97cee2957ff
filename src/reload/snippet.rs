// src/reload/snippet.rs

use crate::reload::notifier::RELOAD_PAYLOAD;

/// Script appended to the JavaScript slot when the viewer server runs.
///
/// On page load it opens the reload socket and reloads the page when the
/// reload payload arrives.
pub fn reload_snippet(port: u16, reload_path: &str) -> String {
    format!(
        r#"
(function () {{
    window.addEventListener("load", function () {{
        var socket = new WebSocket("ws://localhost:{port}{reload_path}");
        socket.addEventListener("message", function (evt) {{
            if (evt.data === "{RELOAD_PAYLOAD}") {{
                console.log("File change detected, reloading page.");
                window.location.reload();
            }}
        }});
    }});
}})();"#
    )
}
