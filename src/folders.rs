// Folder ensuring: before a file can be uploaded, every folder along its
// destination path must exist. The trait keeps the sync flow decoupled
// from the REST calls so tests can stub the whole step out.

use crate::api::SpOps;
use crate::files::FileContext;
use anyhow::Result;

/// Guarantees the destination folder path exists before upload.
pub trait FolderEnsurer {
    fn ensure(&self, ops: &dyn SpOps, digest: &str, ctx: &FileContext) -> Result<()>;
}

/// REST-backed ensurer: walks the library path segment by segment, looks
/// each prefix up and creates the ones that are missing. The site-root
/// prefix (`sites/<name>`) always exists, so walking starts below it.
pub struct RestFolderEnsurer;

impl FolderEnsurer for RestFolderEnsurer {
    fn ensure(&self, ops: &dyn SpOps, digest: &str, ctx: &FileContext) -> Result<()> {
        for prefix in folder_prefixes(&ctx.library) {
            if !ops.folder_exists(&prefix)? {
                ops.create_folder(digest, &prefix)?;
            }
        }
        Ok(())
    }
}

/// Cumulative path prefixes that may need creating. For
/// `sites/x/Shared Documents/reports` these are
/// `sites/x/Shared Documents` and `sites/x/Shared Documents/reports`.
fn folder_prefixes(library: &str) -> Vec<String> {
    let segments: Vec<&str> = library.split('/').filter(|s| !s.is_empty()).collect();
    // Skip the `sites/<name>` prefix; it is the site itself.
    let skip = if segments.first() == Some(&"sites") { 2 } else { 1 };
    (skip + 1..=segments.len())
        .map(|end| segments[..end].join("/"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CheckinType;
    use std::cell::RefCell;
    use std::collections::HashSet;

    // Fake that reports a configurable set of folders as existing and
    // records what gets created.
    struct FakeOps {
        existing: HashSet<String>,
        created: RefCell<Vec<String>>,
    }

    impl FakeOps {
        fn with_existing(paths: &[&str]) -> Self {
            FakeOps {
                existing: paths.iter().map(|s| s.to_string()).collect(),
                created: RefCell::new(vec![]),
            }
        }
    }

    impl SpOps for FakeOps {
        fn request_digest(&self) -> Result<String> {
            unreachable!("folder ensure never requests a digest")
        }
        fn folder_exists(&self, server_relative_url: &str) -> Result<bool> {
            Ok(self.existing.contains(server_relative_url))
        }
        fn create_folder(&self, _digest: &str, server_relative_url: &str) -> Result<()> {
            self.created.borrow_mut().push(server_relative_url.to_string());
            Ok(())
        }
        fn upload(&self, _: &str, _: &str, _: &str, _: &[u8]) -> Result<()> {
            unreachable!()
        }
        fn update_metadata(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: &serde_json::Value,
        ) -> Result<()> {
            unreachable!()
        }
        fn checkout(&self, _: &str, _: &str, _: &str) -> Result<()> {
            unreachable!()
        }
        fn checkin(&self, _: &str, _: &str, _: &str, _: CheckinType) -> Result<()> {
            unreachable!()
        }
    }

    fn ctx(library: &str) -> FileContext {
        FileContext {
            filename: "report.pdf".to_string(),
            library: library.to_string(),
            content: vec![],
        }
    }

    #[test]
    fn prefixes_walk_below_the_site_root() {
        assert_eq!(
            folder_prefixes("sites/x/Shared Documents/reports"),
            vec![
                "sites/x/Shared Documents".to_string(),
                "sites/x/Shared Documents/reports".to_string(),
            ]
        );
    }

    #[test]
    fn prefixes_without_a_sites_root_skip_only_the_library() {
        assert_eq!(
            folder_prefixes("Shared Documents/reports/2026"),
            vec![
                "Shared Documents/reports".to_string(),
                "Shared Documents/reports/2026".to_string(),
            ]
        );
    }

    #[test]
    fn only_missing_folders_are_created() {
        let ops = FakeOps::with_existing(&["sites/x/Shared Documents"]);
        RestFolderEnsurer
            .ensure(&ops, "digest", &ctx("sites/x/Shared Documents/reports"))
            .unwrap();
        assert_eq!(
            *ops.created.borrow(),
            vec!["sites/x/Shared Documents/reports".to_string()]
        );
    }

    #[test]
    fn nothing_is_created_when_the_path_exists() {
        let ops = FakeOps::with_existing(&[
            "sites/x/Shared Documents",
            "sites/x/Shared Documents/reports",
        ]);
        RestFolderEnsurer
            .ensure(&ops, "digest", &ctx("sites/x/Shared Documents/reports"))
            .unwrap();
        assert!(ops.created.borrow().is_empty());
    }
}
