// src/reload/browser.rs

use std::path::PathBuf;

use tokio::process::Command;
use tracing::{error, info};

/// Open `target` with the platform's default handler, in the background.
///
/// Failures are only logged.
pub fn open_in_browser(target: PathBuf) {
    tokio::spawn(async move {
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg("start").arg("").arg(&target);
            c
        } else if cfg!(target_os = "macos") {
            let mut c = Command::new("open");
            c.arg(&target);
            c
        } else {
            let mut c = Command::new("xdg-open");
            c.arg(&target);
            c
        };

        match cmd.status().await {
            Ok(status) if status.success() => {
                info!(target = %target.display(), "opened in browser");
            }
            Ok(status) => {
                error!(target = %target.display(), code = ?status.code(), "browser command failed");
            }
            Err(err) => {
                error!(target = %target.display(), error = %err, "failed to open in browser");
            }
        }
    });
}
