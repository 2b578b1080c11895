//! Desktop notification delivery.
//!
//! macOS uses `osascript` with an AppleScript `display notification`;
//! other platforms use the `notify-rust` crate. Both paths are
//! fire-and-forget: failures are logged and never propagated.

/// Escape a string for embedding inside an AppleScript double-quoted string.
///
/// Backslashes must be escaped first so the later replacements do not
/// double-escape them.
#[cfg(any(target_os = "macos", test))]
pub(crate) fn escape_for_applescript(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Deliver a native desktop notification.
pub fn deliver(title: &str, body: &str) {
    #[cfg(target_os = "macos")]
    {
        let script = format!(
            r#"display notification "{}" with title "{}""#,
            escape_for_applescript(body),
            escape_for_applescript(title),
        );
        if let Err(e) = std::process::Command::new("osascript")
            .arg("-e")
            .arg(&script)
            .output()
        {
            tracing::warn!("failed to deliver notification: {e}");
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        use notify_rust::Notification;
        if let Err(e) = Notification::new().summary(title).body(body).show() {
            tracing::warn!("failed to deliver notification: {e}");
        }
    }
}
