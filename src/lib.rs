// Library root
// -----------
// This crate exposes the library surface for the CLI. The binary
// (`main.rs`) wires these modules into the interactive flow.
//
// Module responsibilities:
// - `api`: Blocking HTTP client for the GitHub REST API (contents,
//   repositories, user) with typed request/response shapes.
// - `codec`: Base64 content codec used to carry file bytes in JSON.
// - `config`: Credential file loading/saving under the home directory.
// - `paths`: Local path to remote path mapping.
// - `walker`: Recursive enumeration of the regular files under a root.
// - `sync`: Drives uploads and deletes against the remote and
//   aggregates per-file outcomes.
// - `ui`: Implements the terminal-based user interface flows and
//   delegates requests to `sync` and `api`.
//
// Keeping this separation means the sync logic can be exercised in
// tests without any terminal interaction.
pub mod api;
pub mod codec;
pub mod config;
pub mod paths;
pub mod sync;
pub mod ui;
pub mod walker;
