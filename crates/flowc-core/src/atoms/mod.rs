// ── FlowC Atoms ────────────────────────────────────────────────────────────
// Constants, errors, seams and plain data shared by every other module.
// Nothing in here performs I/O or imports from the rest of the crate.

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
