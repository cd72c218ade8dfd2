//! Typed Atom 1.0 entities.
//!
//! Every entity owns its children by value. Required fields are plain values
//! and are only checked when a feed is written (see [`crate::atom::serialize`]);
//! optional fields are `Option`s and repeated elements are `Vec`s that keep
//! document order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Root element of an Atom document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    /// Universally unique and permanent URI identifying the feed.
    pub id: String,
    /// Human-readable title.
    pub title: Text,
    /// Last time the feed was modified.
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub authors: Vec<Person>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub contributors: Vec<Person>,
    /// Software used to generate the feed.
    pub generator: Option<Generator>,
    /// Small square image identifying the feed.
    pub icon: Option<String>,
    /// Larger image, twice as wide as it is tall.
    pub logo: Option<String>,
    pub rights: Option<Text>,
    pub subtitle: Option<String>,
}

impl Feed {
    /// Creates a feed with its three required fields and everything else empty.
    pub fn new(id: impl Into<String>, title: impl Into<Text>, updated: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            updated,
            entries: Vec::new(),
            authors: Vec::new(),
            links: Vec::new(),
            categories: Vec::new(),
            contributors: Vec::new(),
            generator: None,
            icon: None,
            logo: None,
            rights: None,
            subtitle: None,
        }
    }
}

/// A single post of a feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub title: Text,
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub authors: Vec<Person>,
    /// Inline content or a reference to it through `src`.
    pub content: Option<Content>,
    #[serde(default)]
    pub links: Vec<Link>,
    pub summary: Option<Text>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub contributors: Vec<Person>,
    /// Time of initial creation or first availability.
    pub published: Option<DateTime<Utc>>,
    pub rights: Option<Text>,
    /// Metadata of the originating feed when this entry is a copy.
    pub source: Option<Source>,
}

impl Entry {
    pub fn new(id: impl Into<String>, title: impl Into<Text>, updated: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            updated,
            authors: Vec::new(),
            content: None,
            links: Vec::new(),
            summary: None,
            categories: Vec::new(),
            contributors: Vec::new(),
            published: None,
            rights: None,
            source: None,
        }
    }
}

/// Identity of the feed an entry was copied from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub title: Text,
    pub updated: DateTime<Utc>,
}

/// Which list, and therefore which element name, a [`Person`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonRole {
    Author,
    Contributor,
}

impl PersonRole {
    /// Element name used on the wire.
    pub fn element_name(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Contributor => "contributor",
        }
    }
}

impl fmt::Display for PersonRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

/// A person, corporation, or similar entity credited as author or contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub email: Option<String>,
    /// Home page of the person, written as the `uri` child element.
    pub url: Option<String>,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            url: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Reference from a feed or entry to a Web resource.
///
/// `relation` is left unset unless given explicitly, even though Atom
/// treats a missing `rel` as `alternate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub relation: Option<String>,
    /// Media type of the resource.
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub hreflang: Option<String>,
    pub title: Option<String>,
    /// Length of the resource in bytes.
    pub length: Option<i64>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            relation: None,
            media_type: None,
            hreflang: None,
            title: None,
            length: None,
        }
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub term: String,
    /// URI of the categorization scheme.
    pub scheme: Option<String>,
    /// Human-readable label for display.
    pub label: Option<String>,
}

impl Category {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            scheme: None,
            label: None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.term)
    }
}

/// Content of an entry, either inline (`value`) or remote (`src`).
///
/// `media_type` is copied verbatim: it may be one of the text construct
/// kinds (`text`, `html`, `xhtml`) or any media type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub src: Option<String>,
}

impl Content {
    pub fn inline(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }
}

/// Encoding of a text construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    /// Plain text.
    #[default]
    Text,
    /// Entity escaped HTML.
    Html,
    /// Inline XHTML wrapped in a `div`.
    Xhtml,
}

impl TextKind {
    /// Value of the `type` attribute, `None` for the default kind.
    pub fn attribute_value(self) -> Option<&'static str> {
        match self {
            Self::Text => None,
            Self::Html => Some("html"),
            Self::Xhtml => Some("xhtml"),
        }
    }

    /// Maps a `type` attribute to a non-default kind.
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "html" => Some(Self::Html),
            "xhtml" => Some(Self::Xhtml),
            _ => None,
        }
    }
}

/// Human-readable text used by titles, summaries and rights.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
    #[serde(default)]
    pub kind: TextKind,
}

impl Text {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: TextKind::Text,
        }
    }

    pub fn html(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: TextKind::Html,
        }
    }

    pub fn xhtml(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: TextKind::Xhtml,
        }
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Software that produced the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generator {
    /// Name of the software.
    pub value: String,
    pub uri: Option<String>,
    pub version: Option<String>,
}

impl Generator {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            uri: None,
            version: None,
        }
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
