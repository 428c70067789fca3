//! Foundation types for gql-assist.
//!
//! This crate provides the shared vocabulary used across the workspace: editor
//! coordinates, the artifact categories a file can belong to, the edit actions
//! produced by line diffs, and the small set of host events the core reacts to.
//!
//! # Type Categories
//!
//! - **Position types**: [`Position`], [`Range`]
//! - **File types**: [`FileKind`], [`DocumentRef`]
//! - **Edit types**: [`EditAction`], [`EditActionKind`]
//! - **Event types**: [`HostEvent`]

mod edits;
mod event;
mod kind;
mod position;

pub use edits::{EditAction, EditActionKind, RawEditAction, UnknownEditActionKind};
pub use event::{DocumentRef, HostEvent};
pub use kind::{FileKind, UnknownFileKind};
pub use position::{utf16_len, Position, Range};
