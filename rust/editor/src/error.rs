// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for editor operations.
//!
//! Interactive edits never fail: a gesture that cannot apply is a no-op.
//! Errors only come from loading documents and configuration, and from
//! host calls naming an element that does not exist.

/// Result type alias for editor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the editor's API boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A floor plan document or configuration could not be (de)serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A document or configuration file could not be read or written.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No element with this id exists in the document.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// The element exists but is not of the kind the operation needs.
    #[error("element {id} is not a {expected}")]
    WrongElementKind { id: String, expected: &'static str },

    /// Room index out of range.
    #[error("room not found: index {0}")]
    RoomNotFound(usize),
}
