use std::process::Command;

use berth_control::BrowserLauncher;
use url::Url;

/// Opens the base URI with the platform's default opener. Development
/// convenience; callers treat every failure as non-fatal.
pub struct CommandBrowserLauncher;

impl BrowserLauncher for CommandBrowserLauncher {
    fn open(&self, uri: &Url) -> std::io::Result<()> {
        open_command(uri.as_str()).spawn().map(|_| ())
    }
}

#[cfg(target_os = "macos")]
fn open_command(uri: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(uri);
    command
}

#[cfg(target_os = "windows")]
fn open_command(uri: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", uri]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn open_command(uri: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(uri);
    command
}
