// src/revision.rs

/// Does a country list need reparsing? Revision ids are opaque; only
/// equality is meaningful, so "newer" never enters into it.
pub fn needs_reparse(last_synced: u64, current: u64, force_reload: bool) -> bool {
    force_reload || last_synced != current
}
