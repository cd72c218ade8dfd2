//! XML → Feed.
//!
//! Every lookup is scoped to the Atom namespace and relative to the current
//! element (feed → entry → source). How a missing or malformed required
//! value is handled depends on [`Mode`], and is decided in one place,
//! [`Mode::require`]:
//!
//! - [`Mode::Strict`] raises [`AtomError::Constraint`] naming the field.
//! - [`Mode::Lenient`] yields `None`. At feed level the caller substitutes an
//!   empty default; for entries, sources, persons, links and categories the
//!   whole element is dropped.

use std::io::Read;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::date::parse_timestamp;
use super::error::AtomError;
use super::model::{
    Category, Content, Entry, Feed, Generator, Link, Person, PersonRole, Source, Text, TextKind,
};
use super::tree::{self, Element};
use super::ATOM_NAMESPACE;

/// Validation mode threaded through every read operation.
///
/// Parsing, from strings and from configuration files, ignores case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Any structural non-compliance is an error.
    Strict,
    /// Non-compliant elements are dropped or defaulted.
    #[default]
    Lenient,
}

impl Mode {
    /// Resolves a required value.
    ///
    /// A present value is passed through. An absent one is an error in
    /// strict mode and `Ok(None)` in lenient mode.
    fn require<T>(
        self,
        value: Option<T>,
        message: impl Into<String>,
    ) -> Result<Option<T>, AtomError> {
        match (value, self) {
            (Some(value), _) => Ok(Some(value)),
            (None, Mode::Strict) => Err(AtomError::Constraint(message.into())),
            (None, Mode::Lenient) => {
                tracing::debug!(reason = %message.into(), "Tolerating non-compliant feed element");
                Ok(None)
            }
        }
    }

    /// Empty input: an argument error in strict mode, no feed otherwise.
    fn reject_empty(self, message: &str) -> Result<Option<Feed>, AtomError> {
        match self {
            Mode::Strict => Err(AtomError::Argument(message.to_string())),
            Mode::Lenient => Ok(None),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Mode::Strict),
            "lenient" => Ok(Mode::Lenient),
            other => Err(format!("unknown mode '{}' (expected strict or lenient)", other)),
        }
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Reads a feed from XML text.
///
/// Returns `Ok(None)` in lenient mode when the document is unusable: empty
/// input, malformed XML or no root element.
pub fn deserialize_str(xml: &str, mode: Mode) -> Result<Option<Feed>, AtomError> {
    if xml.is_empty() {
        return mode.reject_empty("xml string can not be empty");
    }
    read_document(xml.as_bytes(), mode)
}

/// Reads a feed from a byte buffer. See [`deserialize_str`].
pub fn deserialize_slice(buffer: &[u8], mode: Mode) -> Result<Option<Feed>, AtomError> {
    if buffer.is_empty() {
        return mode.reject_empty("xml buffer can not be empty");
    }
    read_document(buffer, mode)
}

/// Reads a feed from a stream, which is consumed to its end before parsing.
///
/// I/O failures are returned as [`AtomError::Io`] in both modes.
pub fn deserialize_reader<R: Read>(mut reader: R, mode: Mode) -> Result<Option<Feed>, AtomError> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    if buffer.is_empty() {
        return mode.reject_empty("xml stream can not be empty");
    }
    read_document(&buffer, mode)
}

fn read_document(input: &[u8], mode: Mode) -> Result<Option<Feed>, AtomError> {
    let root = match tree::parse(input) {
        Ok(root) => root,
        Err(e) if mode == Mode::Lenient => {
            tracing::warn!(error = %e, "Discarding malformed XML document");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let Some(root) = mode.require(root, "root element is missing")? else {
        return Ok(None);
    };

    // A foreign root leaves every feed-level lookup empty
    let is_feed = root.is(ATOM_NAMESPACE, "feed");
    mode.require(is_feed.then_some(()), "root element is not an atom feed")?;
    let scope = is_feed.then_some(&root);

    read_feed(scope, mode).map(Some)
}

fn child<'a>(parent: &'a Element, name: &str) -> Option<&'a Element> {
    parent.child(ATOM_NAMESPACE, name)
}

fn children<'a>(parent: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
    parent.children_named(ATOM_NAMESPACE, name)
}

/// Collects list items in document order, skipping bare placeholders
/// (no attributes, no child nodes) and items the reader rejected.
fn read_list<'a, T>(
    elements: impl Iterator<Item = &'a Element>,
    mut read: impl FnMut(&'a Element) -> Result<Option<T>, AtomError>,
) -> Result<Vec<T>, AtomError> {
    let mut items = Vec::new();
    for element in elements {
        if element.is_placeholder() {
            tracing::trace!(element = %element.name, "Skipping empty placeholder element");
            continue;
        }
        if let Some(item) = read(element)? {
            items.push(item);
        }
    }
    Ok(items)
}

fn read_feed(root: Option<&Element>, mode: Mode) -> Result<Feed, AtomError> {
    let lookup = |name: &str| root.and_then(|r| child(r, name));
    let list = |name: &'static str| root.into_iter().flat_map(move |r| children(r, name));

    let id = mode
        .require(lookup("id"), "feed id is missing")?
        .map(Element::inner_text)
        .unwrap_or_default();

    let title = match mode.require(lookup("title"), "feed title is missing")? {
        Some(title) => read_text(title, mode)?,
        None => Text::default(),
    };

    let updated = match mode.require(lookup("updated"), "feed updated is missing")? {
        Some(updated) => mode
            .require(parse_timestamp(&updated.inner_text()), "invalid feed updated")?
            .unwrap_or_default(),
        None => DateTime::<Utc>::default(),
    };

    let mut feed = Feed::new(id, title, updated);
    feed.entries = read_list(list("entry"), |e| read_entry(e, mode))?;
    feed.authors = read_list(list("author"), |e| {
        read_person(e, "feed", PersonRole::Author, mode)
    })?;
    feed.links = read_list(list("link"), |e| read_link(e, "feed", mode))?;
    feed.categories = read_list(list("category"), |e| read_category(e, "feed", mode))?;
    feed.contributors = read_list(list("contributor"), |e| {
        read_person(e, "feed", PersonRole::Contributor, mode)
    })?;

    if let Some(generator) = lookup("generator") {
        feed.generator = read_generator(generator, mode)?;
    }
    feed.icon = lookup("icon").map(Element::inner_text);
    feed.logo = lookup("logo").map(Element::inner_text);
    if let Some(rights) = lookup("rights") {
        feed.rights = Some(read_text(rights, mode)?);
    }
    feed.subtitle = lookup("subtitle").map(Element::inner_text);

    tracing::debug!(
        feed = %feed.id,
        entries = feed.entries.len(),
        ?mode,
        "Deserialized feed"
    );

    Ok(feed)
}

fn read_entry(node: &Element, mode: Mode) -> Result<Option<Entry>, AtomError> {
    let Some(id) = mode.require(child(node, "id"), "entry id is missing")? else {
        return Ok(None);
    };
    let Some(title) = mode.require(child(node, "title"), "entry title is missing")? else {
        return Ok(None);
    };
    let Some(updated) = mode.require(child(node, "updated"), "entry updated is missing")? else {
        return Ok(None);
    };
    let Some(updated) =
        mode.require(parse_timestamp(&updated.inner_text()), "invalid entry updated")?
    else {
        return Ok(None);
    };

    let mut entry = Entry::new(id.inner_text(), read_text(title, mode)?, updated);
    entry.authors = read_list(children(node, "author"), |e| {
        read_person(e, "entry", PersonRole::Author, mode)
    })?;
    entry.content = child(node, "content").map(read_content);
    entry.links = read_list(children(node, "link"), |e| read_link(e, "entry", mode))?;
    if let Some(summary) = child(node, "summary") {
        entry.summary = Some(read_text(summary, mode)?);
    }
    entry.categories = read_list(children(node, "category"), |e| {
        read_category(e, "entry", mode)
    })?;
    entry.contributors = read_list(children(node, "contributor"), |e| {
        read_person(e, "entry", PersonRole::Contributor, mode)
    })?;
    if let Some(published) = child(node, "published") {
        entry.published =
            mode.require(parse_timestamp(&published.inner_text()), "invalid entry published")?;
    }
    if let Some(rights) = child(node, "rights") {
        entry.rights = Some(read_text(rights, mode)?);
    }
    if let Some(source) = child(node, "source") {
        entry.source = read_source(source, mode)?;
    }

    Ok(Some(entry))
}

/// Text construct. A missing `type` means plain text; an unknown one is an
/// error in strict mode and plain text in lenient mode.
fn read_text(node: &Element, mode: Mode) -> Result<Text, AtomError> {
    let kind = match node.attribute("type") {
        None => TextKind::Text,
        Some(value) => mode
            .require(
                TextKind::from_attribute(value),
                format!("invalid {} text type '{}'", node.name, value),
            )?
            .unwrap_or_default(),
    };

    Ok(Text {
        value: node.inner_text(),
        kind,
    })
}

fn read_content(node: &Element) -> Content {
    Content {
        value: node.has_child_nodes().then(|| node.inner_text()),
        media_type: node.attribute("type").map(str::to_string),
        src: node.attribute("src").map(str::to_string),
    }
}

fn read_person(
    node: &Element,
    scope: &str,
    role: PersonRole,
    mode: Mode,
) -> Result<Option<Person>, AtomError> {
    let Some(name) = mode.require(
        child(node, "name"),
        format!("{} {} name is missing", scope, role),
    )?
    else {
        return Ok(None);
    };

    Ok(Some(Person {
        name: name.inner_text(),
        email: child(node, "email").map(Element::inner_text),
        // `url` is accepted from producers that do not follow the RFC element name
        url: child(node, "uri")
            .or_else(|| child(node, "url"))
            .map(Element::inner_text),
    }))
}

fn read_link(node: &Element, scope: &str, mode: Mode) -> Result<Option<Link>, AtomError> {
    let Some(href) = mode.require(
        node.attribute("href"),
        format!("{} link href attribute is missing", scope),
    )?
    else {
        return Ok(None);
    };

    Ok(Some(Link {
        href: href.to_string(),
        relation: node.attribute("rel").map(str::to_string),
        media_type: node.attribute("type").map(str::to_string),
        hreflang: node.attribute("hreflang").map(str::to_string),
        title: node.attribute("title").map(str::to_string),
        length: node
            .attribute("length")
            .and_then(|length| length.trim().parse::<i64>().ok()),
    }))
}

fn read_category(node: &Element, scope: &str, mode: Mode) -> Result<Option<Category>, AtomError> {
    let Some(term) = mode.require(
        node.attribute("term"),
        format!("{} category term attribute is missing", scope),
    )?
    else {
        return Ok(None);
    };

    Ok(Some(Category {
        term: term.to_string(),
        scheme: node.attribute("scheme").map(str::to_string),
        label: node.attribute("label").map(str::to_string),
    }))
}

fn read_generator(node: &Element, mode: Mode) -> Result<Option<Generator>, AtomError> {
    let name = Some(node.inner_text()).filter(|name| !name.is_empty());
    let Some(value) = mode.require(name, "generator name is missing")? else {
        return Ok(None);
    };

    Ok(Some(Generator {
        value,
        uri: node.attribute("uri").map(str::to_string),
        version: node.attribute("version").map(str::to_string),
    }))
}

fn read_source(node: &Element, mode: Mode) -> Result<Option<Source>, AtomError> {
    let Some(id) = mode.require(child(node, "id"), "entry source id is missing")? else {
        return Ok(None);
    };
    let Some(title) = mode.require(child(node, "title"), "entry source title is missing")? else {
        return Ok(None);
    };
    let Some(updated) = mode.require(child(node, "updated"), "entry source updated is missing")?
    else {
        return Ok(None);
    };
    let Some(updated) = mode.require(
        parse_timestamp(&updated.inner_text()),
        "invalid entry source updated",
    )?
    else {
        return Ok(None);
    };

    Ok(Some(Source {
        id: id.inner_text(),
        title: read_text(title, mode)?,
        updated,
    }))
}
