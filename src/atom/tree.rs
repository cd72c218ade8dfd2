//! Owned, namespace-aware XML tree.
//!
//! The reader materializes the whole document with [`parse`] before any
//! Atom mapping happens, and the writer accumulates an [`Element`] tree that
//! [`XmlDocument`] renders in one pass at the end.

use std::io::{Cursor, Write};

use encoding_rs::Encoding;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use quick_xml::Writer;
use thiserror::Error;

use super::error::AtomError;

/// Maximum element nesting accepted by [`parse`].
/// Atom documents nest five levels deep; XHTML content adds a few more.
const MAX_DEPTH: usize = 256;

/// Errors produced while building a tree from XML text.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("{0}")]
    Parse(#[from] quick_xml::Error),

    #[error("unexpected closing tag </{0}>")]
    UnexpectedEnd(String),

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its resolved namespace, attributes in document order,
/// and child nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Local name, without prefix.
    pub name: String,
    /// Namespace URI the element name resolved to.
    pub namespace: Option<String>,
    /// Attributes keyed by their qualified name. Namespace declarations
    /// are not kept here on read.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Element holding a single text node. Empty text yields no child.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.push_text(text);
        element
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((key.into(), value.into()));
    }

    /// Sets the attribute only when a value is present.
    pub fn set_optional_attribute(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.set_attribute(key, value);
        }
    }

    pub fn push_element(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(Node::Text(text));
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the element is `local` in namespace `namespace`.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.name == local && self.namespace.as_deref() == Some(namespace)
    }

    /// Child elements named `local` in `namespace`, in document order.
    pub fn children_named<'a, 'n>(
        &'a self,
        namespace: &'n str,
        local: &'n str,
    ) -> impl Iterator<Item = &'a Element> + 'n
    where
        'a: 'n,
    {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(element) if element.is(namespace, local) => Some(element),
            _ => None,
        })
    }

    /// First child element named `local` in `namespace`.
    pub fn child(&self, namespace: &str, local: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(element) if element.is(namespace, local) => Some(element),
            _ => None,
        })
    }

    pub fn has_child_nodes(&self) -> bool {
        !self.children.is_empty()
    }

    /// An element with neither attributes nor child nodes.
    pub fn is_placeholder(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }
}

/// Parses a complete document into its root element.
///
/// Returns `Ok(None)` when the input is well-formed but has no root element
/// (for example only an XML declaration). Whitespace-only text nodes are
/// discarded; every other text node is kept verbatim.
///
/// Text, names and attribute values are decoded with the encoding named in
/// the XML declaration (or a byte order mark), UTF-8 when neither is given.
/// The declaration is only honoured for ASCII-compatible encodings.
///
/// # Security
///
/// quick-xml (0.37) does not expand `<!ENTITY>` declarations, so entity
/// references other than the five XML builtins fail with an escape error.
pub fn parse(input: &[u8]) -> Result<Option<Element>, TreeError> {
    let mut reader = NsReader::from_reader(input);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = namespace_uri(resolved);

        match event {
            Event::Start(start) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(TreeError::MaxDepthExceeded(MAX_DEPTH));
                }
                let element = open_element(&reader, &start, namespace)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&reader, &start, namespace)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(end) => {
                let element = stack.pop().ok_or_else(|| {
                    TreeError::UnexpectedEnd(String::from_utf8_lossy(end.name().as_ref()).into())
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                if !text.trim().is_empty() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
            }
            Event::CData(data) => {
                let text = reader
                    .decoder()
                    .decode(&data)
                    .map_err(quick_xml::Error::from)?;
                if let Some(parent) = stack.last_mut() {
                    parent.push_text(text.into_owned());
                }
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions and DOCTYPE carry no data
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.pop() {
        return Err(TreeError::Unclosed(open.name));
    }

    Ok(root)
}

fn namespace_uri(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(namespace) => Some(String::from_utf8_lossy(namespace.0).into_owned()),
        _ => None,
    }
}

fn open_element<R>(
    reader: &NsReader<R>,
    start: &BytesStart<'_>,
    namespace: Option<String>,
) -> Result<Element, TreeError> {
    let decoder = reader.decoder();
    let name = decoder
        .decode(start.local_name().as_ref())
        .map_err(quick_xml::Error::from)?
        .into_owned();
    let mut element = Element {
        name,
        namespace,
        attributes: Vec::new(),
        children: Vec::new(),
    };

    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = decoder
            .decode(attr.key.as_ref())
            .map_err(quick_xml::Error::from)?
            .into_owned();
        let value = attr.decode_and_unescape_value(decoder)?;
        element.attributes.push((key, value.into_owned()));
    }

    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), TreeError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_some() => return Err(TreeError::MultipleRoots),
        None => *root = Some(element),
    }
    Ok(())
}

/// A document ready to be rendered: XML declaration plus root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    encoding: Option<String>,
    root: Element,
}

impl XmlDocument {
    pub fn new(root: Element, encoding: Option<&str>) -> Self {
        Self {
            encoding: encoding.map(str::to_string),
            root,
        }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Encoding name written into the declaration, if any.
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// Renders the document without insignificant whitespace.
    ///
    /// The result is Unicode text; use [`XmlDocument::to_xml_bytes`] to get
    /// bytes in the declared encoding.
    pub fn to_xml_string(&self) -> Result<String, AtomError> {
        self.to_xml_string_pretty(0)
    }

    /// Renders the document indenting nested elements by `indent` spaces.
    pub fn to_xml_string_pretty(&self, indent: usize) -> Result<String, AtomError> {
        String::from_utf8(self.render_utf8(indent)?)
            .map_err(|_| AtomError::Write("rendered document is not valid UTF-8".to_string()))
    }

    /// Renders the document as bytes in the declared encoding.
    ///
    /// Characters the encoding cannot represent are written as numeric
    /// character references.
    ///
    /// # Errors
    ///
    /// [`AtomError::UnsupportedValue`] when the declared encoding is unknown
    /// or cannot be produced as output (UTF-16 and friends).
    pub fn to_xml_bytes(&self, indent: usize) -> Result<Vec<u8>, AtomError> {
        let encoding = match self.encoding() {
            Some(label) => output_encoding(label)?,
            None => encoding_rs::UTF_8,
        };
        let utf8 = self.render_utf8(indent)?;
        if encoding == encoding_rs::UTF_8 {
            return Ok(utf8);
        }

        let text = String::from_utf8(utf8)
            .map_err(|_| AtomError::Write("rendered document is not valid UTF-8".to_string()))?;
        let (bytes, _, unmappable) = encoding.encode(&text);
        if unmappable {
            tracing::debug!(
                encoding = encoding.name(),
                "Wrote unmappable characters as character references"
            );
        }
        Ok(bytes.into_owned())
    }

    /// Streams the rendered document, in the declared encoding, into `out`.
    pub fn write_to<W: Write>(&self, mut out: W, indent: usize) -> Result<(), AtomError> {
        out.write_all(&self.to_xml_bytes(indent)?)?;
        Ok(())
    }

    fn render_utf8(&self, indent: usize) -> Result<Vec<u8>, AtomError> {
        let mut out = Cursor::new(Vec::new());
        if indent == 0 {
            self.write_events(&mut Writer::new(&mut out))?;
        } else {
            self.write_events(&mut Writer::new_with_indent(&mut out, b' ', indent))?;
        }
        Ok(out.into_inner())
    }

    fn write_events<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), AtomError> {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", self.encoding(), None)))
            .map_err(write_error)?;
        write_element(writer, &self.root)
    }
}

/// Resolves an encoding label to an encoding that output can be written in.
pub fn output_encoding(label: &str) -> Result<&'static Encoding, AtomError> {
    match Encoding::for_label(label.trim().as_bytes()) {
        Some(encoding) if encoding.output_encoding() == encoding => Ok(encoding),
        Some(_) => Err(AtomError::UnsupportedValue(format!(
            "encoding '{}' can not be used for output",
            label
        ))),
        None => Err(AtomError::UnsupportedValue(format!(
            "unknown encoding '{}'",
            label
        ))),
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), AtomError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    for node in &element.children {
        match node {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(write_error)
}

fn write_error(e: impl std::fmt::Display) -> AtomError {
    AtomError::Write(e.to_string())
}
