// UI layer: prompts for anything the config file leaves out, shows a
// spinner while the sync runs, and prints the outcome. The site URL is
// persisted to the home directory so the next run can offer it as the
// prompt default.

use crate::api::SpClient;
use crate::config::Settings;
use crate::digest::DigestCache;
use crate::folders::RestFolderEnsurer;
use crate::sync::FileSync;
use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Run one sync with the given settings, prompting for missing
/// credentials first. Blocks until the run completes or fails.
pub fn run_sync(mut settings: Settings) -> Result<()> {
    if settings.site.is_empty() {
        settings.site = prompt_site()?;
    }
    if settings.username.is_empty() {
        settings.username = Input::new().with_prompt("Username").interact_text()?;
    }
    if settings.password.is_empty() {
        // `Password` hides input in the terminal.
        settings.password = Password::new().with_prompt("Password").interact()?;
    }

    let client = SpClient::new(&settings.site, &settings.username, &settings.password)?;
    let ensurer = RestFolderEnsurer;
    let mut cache = DigestCache::new();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message(format!("Syncing {}...", settings.file));

    let sync = FileSync::new(&settings, &client, &ensurer);
    let result = sync.run(&mut cache);
    spinner.finish_and_clear();

    match result {
        Ok(()) => {
            println!(
                "{}",
                format!("{} synced to {}", settings.file, settings.library).green()
            );
            // Remember the site for the next run's prompt default.
            remember_site(&site_file(), &settings.site);
            Ok(())
        }
        Err(e) => {
            println!("{}", "Sync failed".red());
            Err(e)
        }
    }
}

/// Prompt for the site URL, defaulting to the last one used if a
/// persisted value exists.
fn prompt_site() -> Result<String> {
    let site: String = match load_site() {
        Ok(saved) => Input::new()
            .with_prompt("Site URL")
            .default(saved)
            .interact_text()?,
        Err(_) => Input::new().with_prompt("Site URL").interact_text()?,
    };
    Ok(site)
}

fn site_file() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(".spsync_site")
}

/// Persist the site URL for the next run. Best effort: a failed write
/// must never fail a sync that already completed.
fn remember_site(path: &Path, site: &str) {
    if let Err(e) = std::fs::write(path, site) {
        eprintln!("Could not persist the site URL: {}", e);
    }
}

/// Load the previously used site URL.
fn load_site() -> Result<String> {
    let data = std::fs::read_to_string(site_file())?;
    Ok(data.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remember_site_swallows_write_failures() {
        // Unwritable target; this must not panic or surface an error.
        remember_site(
            Path::new("/no/such/dir/.spsync_site"),
            "https://tenant.example.com/sites/x",
        );
    }

    #[test]
    fn remember_site_writes_the_url() {
        let path = std::env::temp_dir().join("spsync_remember_site_test");
        remember_site(&path, "https://tenant.example.com/sites/x");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "https://tenant.example.com/sites/x"
        );
        let _ = std::fs::remove_file(&path);
    }
}
