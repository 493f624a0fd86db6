/// Hand a URL to the desktop's default opener.

use std::io;
use std::process::{Command, Stdio};

/// Only web links are passed on; anything else is refused.
pub fn is_web_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://")) && !url.trim().contains(char::is_whitespace)
}

pub fn open_url(url: &str) -> io::Result<()> {
    if !is_web_url(url) {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("not a web URL: {url}")));
    }

    #[cfg(target_os = "windows")]
    let mut cmd = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", url]);
        c
    };

    #[cfg(target_os = "macos")]
    let mut cmd = {
        let mut c = Command::new("open");
        c.arg(url);
        c
    };

    #[cfg(all(unix, not(target_os = "macos")))]
    let mut cmd = {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };

    // The terminal is in raw mode; keep the opener's chatter off it.
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}
