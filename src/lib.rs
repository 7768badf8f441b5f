/*!
 * Sandboxed Filesystem Library
 * Root-confined file access over root-relative paths
 */

mod paths;

pub mod sandbox;
pub mod types;

// Re-exports
pub use sandbox::SandboxFs;
pub use types::{from_system_time, to_system_time, FsError, FsResult, Timestamp};
