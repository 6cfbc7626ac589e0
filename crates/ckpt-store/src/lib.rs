//! Checkpoint store: fallible, resource-safe file I/O around the
//! `ckpt-format` codec.
//!
//! [`save_checkpoint`] turns a name→tensor map and a name→string map into
//! a checkpoint directory; [`load_checkpoint`] reads one back into record
//! and property form. External tensor payloads stay lazy on load — use
//! [`read_range`] to materialize them.
//!
//! The store is single-threaded and blocking. Callers must not save into
//! a directory concurrently or load one mid-save; nothing here locks the
//! directory.

pub mod data_file;
pub mod extract;
pub mod file_scope;
pub mod reader;
pub mod writer;

pub use data_file::{read_range, DataFileWriter};
pub use extract::{extract_tensor, ExtractedTensor};
pub use file_scope::{with_open_file, FileMode};
pub use reader::{load_checkpoint, LoadedCheckpoint};
pub use writer::{save_checkpoint, SaveOptions};
