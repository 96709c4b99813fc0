// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) loads the settings and hands them to the UI flow.
//
// Module responsibilities:
// - `config`: Settings and per-file metadata records, loaded from JSON.
// - `digest`: Request-digest value with its retrieval time and the
//   single-slot cache that decides when a new one is needed.
// - `api`: Encapsulates the HTTP interactions with the service (digest,
//   folders, upload, metadata, checkout/checkin) behind the `SpOps` seam.
// - `files`: Resolves the filename, destination library and content
//   bytes for one run.
// - `folders`: Ensures every folder along the destination path exists.
// - `sync`: Orchestrates the staged upload sequence for a single file.
// - `ui`: Terminal prompts, spinner and result output.
//
// Keeping this separation makes it possible to test the sync flow
// against fakes instead of a live server.
pub mod api;
pub mod config;
pub mod digest;
pub mod files;
pub mod folders;
pub mod sync;
pub mod ui;
