//! # Structured Store
//!
//! Generic persistence helpers shared by every record file Lominus keeps.
//!
//! ## Operations
//!
//! | Operation | Function | Notes |
//! |-----------|----------|-------|
//! | Persist | [`persist`] | CBOR-encodes any `Serialize` value, truncates on overwrite |
//! | Load | [`load`] / [`load_into`] | Never partially fills the destination |
//! | Exists | [`exists`] | Any stat error counts as "absent" |
//! | EnsureDirectory | [`ensure_dir`] | Recursive, idempotent |
//! | AutoRename | [`auto_rename`] | Prefixes `[vN]` with the lowest free `N` |
//! | SanitizeName | [`sanitize_name`] | Makes remote titles safe as path components |
//!
//! ## Concurrency
//!
//! Nothing here locks. Two writers to the same path race and the last close
//! wins; [`auto_rename`] probes and renames without holding anything in
//! between. Callers that need stronger guarantees coordinate themselves.
//!
//! ## Errors
//!
//! Every operation hands [`StoreError`] straight back to its caller: no
//! retries, no logging. [`StoreError::MissingFile`] is never raised here;
//! record loaders build it after an [`exists`] check so the user gets a
//! friendlier message than a raw `ENOENT`.

mod error;
mod file;
mod name;

pub use error::StoreError;
pub use file::{auto_rename, ensure_dir, exists, load, load_into, persist, versioned_name};
pub use name::sanitize_name;
