/*!
 * Sandbox Types
 * Shared types for sandboxed filesystem operations
 */

mod errors;
mod timestamp;

pub use errors::{FsError, FsResult};
pub use timestamp::{from_system_time, to_system_time, Timestamp};
