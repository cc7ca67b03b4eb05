//! In-process repository implementations.
//!
//! Redirects and profiles live in `DashMap`s; each operation on a key runs
//! under its shard lock, which makes the visit upsert atomic per key just like
//! the PostgreSQL implementation. The activity log is a bounded ring buffer
//! (see [`MemoryActivityRepository`]). Used for local runs
//! (`STORAGE_BACKEND=memory`) and tests.

mod activity;
mod profile;
mod redirect;

pub use activity::MemoryActivityRepository;
pub use profile::MemoryProfileRepository;
pub use redirect::MemoryRedirectRepository;
