//! Audit sink backends.

pub mod file;

pub use file::FileAuditSink;
