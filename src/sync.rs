// Sync flow: the upload orchestration for one file. Stages run strictly
// in order, each gated on the previous one: digest, folders, upload,
// metadata (optional), publish (optional). Any stage failure aborts the
// remaining stages and surfaces as the run's single error.

use crate::api::{CheckinType, SpOps};
use crate::config::{MetadataRecord, Settings};
use crate::digest::DigestCache;
use crate::files::{self, FileContext};
use crate::folders::FolderEnsurer;
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use std::time::{Instant, SystemTime};

/// Outcome of an optional stage, so callers and tests can tell a skipped
/// stage (zero network calls) from one that ran and succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Skipped,
    Executed,
}

/// States of the publish sub-flow: checkout takes Idle to CheckedOut,
/// checkin takes CheckedOut to Published. A checkin failure strands the
/// file in CheckedOut; nothing rolls that back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PublishState {
    CheckedOut,
    Published,
}

/// Orchestrates one file upload against the service. Borrows the network
/// operations and folder ensurer so the flow itself stays free of
/// transport concerns.
pub struct FileSync<'a> {
    config: &'a Settings,
    ops: &'a dyn SpOps,
    folders: &'a dyn FolderEnsurer,
}

impl<'a> FileSync<'a> {
    pub fn new(config: &'a Settings, ops: &'a dyn SpOps, folders: &'a dyn FolderEnsurer) -> Self {
        FileSync {
            config,
            ops,
            folders,
        }
    }

    /// Run the full upload sequence. The digest cache is shared across
    /// runs within one process so repeated uploads reuse a fresh digest.
    pub fn run(&self, cache: &mut DigestCache) -> Result<()> {
        let (digest, refreshed) = cache
            .get_or_refresh(SystemTime::now(), || self.ops.request_digest())
            .context("Failed to acquire a request digest")?;
        if refreshed {
            self.log_info("New digest received");
        } else {
            self.log_info("Use cached digest value");
        }

        let ctx = files::resolve(self.config)?;

        let mut started = Instant::now();
        self.folders
            .ensure(self.ops, &digest.value, &ctx)
            .context("Failed to create the destination folders")?;

        self.ops
            .upload(&digest.value, &ctx.library, &ctx.filename, &ctx.content)
            .context("Unable to upload file, it might be checked out to someone")?;
        self.log_ok("Upload successful", started);

        started = Instant::now();
        match self.update_file_metadata(&digest.value, &ctx)? {
            StageOutcome::Executed => self.log_ok("Metadata updated successfully", started),
            StageOutcome::Skipped => self.log_info("No metadata to update"),
        }

        started = Instant::now();
        match self.publish_file(&digest.value, &ctx)? {
            StageOutcome::Executed => self.log_ok("Published file", started),
            StageOutcome::Skipped => self.log_info("File must not be published"),
        }

        Ok(())
    }

    /// Apply the metadata record configured for this filename, if the
    /// stage is enabled and a record matches. Matching is a
    /// case-insensitive filename comparison; with duplicate records the
    /// first match wins.
    fn update_file_metadata(&self, digest: &str, ctx: &FileContext) -> Result<StageOutcome> {
        if !self.config.update_metadata {
            return Ok(StageOutcome::Skipped);
        }
        let Some(record) = self.matching_metadata(&ctx.filename) else {
            return Ok(StageOutcome::Skipped);
        };
        self.ops
            .update_metadata(digest, &ctx.library, &ctx.filename, &record.metadata)
            .context("Unable to update metadata of the file")?;
        Ok(StageOutcome::Executed)
    }

    fn matching_metadata(&self, filename: &str) -> Option<&MetadataRecord> {
        // Full lowercase fold, not just ASCII, so accented filenames match.
        let filename = filename.to_lowercase();
        self.config
            .files_metadata
            .iter()
            .find(|fm| fm.name.to_lowercase() == filename)
    }

    /// Publish stage: a no-op unless the publish flag is set.
    fn publish_file(&self, digest: &str, ctx: &FileContext) -> Result<StageOutcome> {
        if !self.config.publish {
            return Ok(StageOutcome::Skipped);
        }
        self.run_publish(digest, ctx)?;
        Ok(StageOutcome::Executed)
    }

    /// Checkout-then-checkin. Publishing means creating a major version,
    /// so the checkin type is always Major here. There is no rollback: if
    /// checkin fails after a successful checkout, the file stays checked
    /// out to the acting account and the error says so.
    fn run_publish(&self, digest: &str, ctx: &FileContext) -> Result<PublishState> {
        self.ops
            .checkout(digest, &ctx.library, &ctx.filename)
            .context("Unable to publish file: checkout failed")?;
        let state = PublishState::CheckedOut;
        self.log_info(&format!("{} is now {:?}", ctx.filename, state));

        self.checkin(digest, ctx, Some(CheckinType::Major)).context(
            "Unable to publish file: checkin failed, the file remains checked out",
        )?;
        let state = PublishState::Published;
        self.log_info(&format!("{} is now {:?}", ctx.filename, state));
        Ok(state)
    }

    /// Check the file in. Without an explicit type this is a minor
    /// checkin (the service default).
    fn checkin(&self, digest: &str, ctx: &FileContext, kind: Option<CheckinType>) -> Result<()> {
        self.ops.checkin(
            digest,
            &ctx.library,
            &ctx.filename,
            kind.unwrap_or_default(),
        )
    }

    fn log_info(&self, msg: &str) {
        if self.config.verbose {
            println!("INFO: {}", msg);
        }
    }

    fn log_ok(&self, msg: &str, started: Instant) {
        println!(
            "{} {}",
            msg.green(),
            format!("{}ms", started.elapsed().as_millis()).magenta()
        );
    }
}
