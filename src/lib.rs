//! Atom 1.0 feeds: a typed model, a deterministic writer and a reader with
//! strict and lenient validation.
//!
//! - [`atom`] - Serialization engine (model, writer, reader, XML tree)
//! - [`fetch`] - HTTP retrieval of remote feeds
//! - [`render`] - Console rendering of a parsed feed
//! - [`config`] - Optional TOML configuration used by the `atomfeed` binary

pub mod atom;
pub mod config;
pub mod fetch;
pub mod render;

pub use atom::{
    deserialize_reader, deserialize_slice, deserialize_str, serialize, AtomError, Feed, Mode,
    XmlDocument,
};
