// garagio-core: Status-observation engine between garagio-api and consumers.
//
// The engine composes three layers — account, connectivity, poll loop —
// with switch semantics: a new upstream value drops all work derived from
// the previous one before any new work starts. Every poll outcome becomes
// a `Status` value; the pipeline itself never terminates on device errors.

pub mod account;
pub mod engine;
pub mod gate;
pub mod policy;
pub mod status;

// ── Primary re-exports ──────────────────────────────────────────────
pub use account::Account;
pub use engine::StatusEngine;
pub use gate::RefreshGate;
pub use policy::RefreshPolicy;
pub use status::Status;

// Device-level types, re-exported for consumers that match on snapshots.
pub use garagio_api::{Door, DoorState, StatusSnapshot, UNKNOWN_TEMPERATURE};
