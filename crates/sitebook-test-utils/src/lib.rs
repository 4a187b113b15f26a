//! Shared test utilities for sitebook tests.
//!
//! Every test gets its own state file inside a fresh temporary directory.
//! Keep the returned [`TempDir`] alive for as long as the store is in use;
//! dropping it removes the directory.

use std::path::PathBuf;

use tempfile::TempDir;

use sitebook_store::StateStore;
use sitebook_store::config::StoreConfig;
use sitebook_store::queries::epos::NewEpo;

/// A small reference table with one uniform and one split community.
pub const SAMPLE_REFERENCE_TOML: &str = r#"
[[communities]]
name = "Galloway"
default_subcontractor = "America Drywall"

[[communities]]
name = "Claremont"
default_subcontractor = "Juan Trejo"

[communities.subcontractors]
Hang = "Ricardo"
Scrap = "Scrap Brothers"
"#;

/// Create a temp dir and return it with the path of a (not yet existing)
/// state file inside it.
pub fn temp_state_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("state.json");
    (dir, path)
}

/// Open an empty store backed by a temp file.
pub fn open_temp_store() -> (TempDir, StateStore) {
    let (dir, path) = temp_state_path();
    let store = StateStore::open(&StoreConfig::new(path)).expect("failed to open temp store");
    (dir, store)
}

/// A fully populated EPO request for lot 12 in Galloway.
pub fn sample_new_epo() -> NewEpo<'static> {
    NewEpo {
        lot: "12",
        community: "Galloway",
        recipient: "builder@example.com",
        amount: "$450",
        attachments: &[],
    }
}
