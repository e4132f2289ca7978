//! Mediaconv Storage Library
//!
//! Local filesystem storage for uploaded and converted files.
//!
//! # Layout
//!
//! Two flat directories, one per [`StorageArea`]:
//!
//! - **Incoming**: raw uploads, `file-{unix_millis}-{random}{.ext}`
//! - **Converted**: conversion outputs, `converted-{unix_millis}-{random}.{format}`
//!
//! Names are single path components. Anything containing a separator, `..` or a leading
//! dot is rejected, so a name can never resolve outside its directory.

pub mod error;
pub mod local;
pub mod naming;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use local::{LocalStorage, StorageArea};
