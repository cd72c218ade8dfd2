//! Atom 1.0 (RFC 4287) serialization engine.
//!
//! Two entry points cover the whole surface:
//!
//! - [`serialize`] turns a [`Feed`] into an [`XmlDocument`], rejecting feeds
//!   whose required fields are empty.
//! - [`deserialize_str`] / [`deserialize_slice`] / [`deserialize_reader`] turn
//!   XML into a [`Feed`] under a [`Mode`]: `Strict` for authoritative
//!   pipelines, `Lenient` for feeds from uncontrolled sources.
//!
//! # Architecture
//!
//! - [`model`] - Typed entities (Feed, Entry, Person, Link, ...)
//! - [`tree`] - Owned XML tree built on `quick-xml`
//! - `writer` / `reader` - The two mapping directions; they share no state
//!
//! # Example
//!
//! ```
//! use atomfeed::atom::{self, Feed, Mode};
//! use chrono::Utc;
//!
//! let feed = Feed::new("urn:uuid:60a76c80", "Example Feed", Utc::now());
//! let xml = atom::to_string(&feed).unwrap();
//!
//! let parsed = atom::deserialize_str(&xml, Mode::Strict).unwrap().unwrap();
//! assert_eq!(parsed.title.value, "Example Feed");
//! ```

mod date;
mod error;
pub mod model;
mod reader;
pub mod tree;
mod writer;

pub use date::{format_timestamp, parse_timestamp};
pub use error::AtomError;
pub use model::{
    Category, Content, Entry, Feed, Generator, Link, Person, PersonRole, Source, Text, TextKind,
};
pub use reader::{deserialize_reader, deserialize_slice, deserialize_str, Mode};
pub use tree::{TreeError, XmlDocument};
pub use writer::serialize;

/// Atom XML namespace.
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Atom media type.
pub const ATOM_MIME_TYPE: &str = "application/atom+xml";

/// Serializes `feed` to compact XML text with a UTF-8 declaration.
pub fn to_string(feed: &Feed) -> Result<String, AtomError> {
    serialize(feed, Some("utf-8"))?.to_xml_string()
}
