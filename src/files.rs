// File context resolution: turns the settings into the filename,
// destination library and content bytes one upload run works with.

use crate::config::Settings;
use anyhow::{Context, Result};
use std::path::Path;

/// Everything the sync flow needs to know about the file being uploaded.
/// Resolved once per run and read-only afterwards.
#[derive(Debug, Clone)]
pub struct FileContext {
    pub filename: String,
    pub library: String,
    pub content: Vec<u8>,
}

/// Resolve the file context from the settings. Content embedded in the
/// settings wins; otherwise the file is read from disk.
pub fn resolve(settings: &Settings) -> Result<FileContext> {
    let path = Path::new(&settings.file);
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .with_context(|| format!("No filename in path {}", settings.file))?
        .to_string();

    let content = match &settings.content {
        Some(bytes) => bytes.clone(),
        None => std::fs::read(path)
            .with_context(|| format!("Failed to read file {}", settings.file))?,
    };

    Ok(FileContext {
        filename,
        library: settings.library.trim_matches('/').to_string(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(file: &str, library: &str) -> Settings {
        Settings {
            site: String::new(),
            username: String::new(),
            password: String::new(),
            file: file.to_string(),
            library: library.to_string(),
            content: Some(b"bytes".to_vec()),
            update_metadata: false,
            files_metadata: vec![],
            publish: false,
            verbose: false,
        }
    }

    #[test]
    fn filename_is_the_last_path_component() {
        let ctx = resolve(&settings("out/reports/report.pdf", "sites/x/Shared Documents")).unwrap();
        assert_eq!(ctx.filename, "report.pdf");
        assert_eq!(ctx.content, b"bytes");
    }

    #[test]
    fn library_is_stripped_of_surrounding_slashes() {
        let ctx = resolve(&settings("report.pdf", "/sites/x/Shared Documents/")).unwrap();
        assert_eq!(ctx.library, "sites/x/Shared Documents");
    }

    #[test]
    fn inline_content_skips_the_filesystem() {
        // The path does not exist on disk; embedded content must be used.
        let ctx = resolve(&settings("no/such/dir/report.pdf", "lib")).unwrap();
        assert_eq!(ctx.content, b"bytes");
    }
}
