//! Feed → XML tree.
//!
//! Child elements are emitted in a fixed order so that the same [`Feed`]
//! always renders to the same bytes. Required fields are validated as they
//! are reached; the first violation aborts the whole write.

use super::date::format_timestamp;
use super::error::AtomError;
use super::model::{
    Category, Content, Entry, Feed, Generator, Link, Person, PersonRole, Source, Text,
};
use super::tree::{output_encoding, Element, XmlDocument};
use super::ATOM_NAMESPACE;

/// Element names that hold a text construct.
const TEXT_ELEMENT_NAMES: &[&str] = &["title", "subtitle", "summary", "rights"];

/// Builds the XML document for `feed`.
///
/// # Errors
///
/// [`AtomError::Constraint`] when a required field is empty: feed or entry
/// `id` / `title`, person `name`, link `href`, category `term`.
/// [`AtomError::UnsupportedValue`] when `encoding` cannot be written.
pub fn serialize(feed: &Feed, encoding: Option<&str>) -> Result<XmlDocument, AtomError> {
    if feed.id.is_empty() {
        return Err(AtomError::constraint("feed id can not be empty"));
    }
    if feed.title.value.is_empty() {
        return Err(AtomError::constraint("feed title can not be empty"));
    }

    if let Some(label) = encoding {
        output_encoding(label)?;
    }

    let mut root = Element::new("feed");
    root.set_attribute("xmlns", ATOM_NAMESPACE);

    root.push_element(Element::with_text("id", feed.id.as_str()));
    root.push_element(text_element("title", &feed.title)?);
    root.push_element(Element::with_text("updated", format_timestamp(&feed.updated)));
    push_people(&mut root, &feed.authors, PersonRole::Author)?;
    push_links(&mut root, &feed.links)?;
    push_people(&mut root, &feed.contributors, PersonRole::Contributor)?;
    push_categories(&mut root, &feed.categories)?;
    if let Some(generator) = &feed.generator {
        root.push_element(generator_element(generator));
    }
    if let Some(icon) = &feed.icon {
        root.push_element(Element::with_text("icon", icon.as_str()));
    }
    if let Some(logo) = &feed.logo {
        root.push_element(Element::with_text("logo", logo.as_str()));
    }
    if let Some(rights) = &feed.rights {
        root.push_element(text_element("rights", rights)?);
    }
    if let Some(subtitle) = &feed.subtitle {
        root.push_element(Element::with_text("subtitle", subtitle.as_str()));
    }
    for entry in &feed.entries {
        root.push_element(entry_element(entry)?);
    }

    tracing::trace!(
        feed = %feed.id,
        entries = feed.entries.len(),
        "Serialized feed"
    );

    Ok(XmlDocument::new(root, encoding))
}

fn entry_element(entry: &Entry) -> Result<Element, AtomError> {
    if entry.id.is_empty() {
        return Err(AtomError::constraint("entry id can not be empty"));
    }
    if entry.title.value.is_empty() {
        return Err(AtomError::constraint("entry title can not be empty"));
    }

    let mut element = Element::new("entry");
    element.push_element(Element::with_text("id", entry.id.as_str()));
    element.push_element(text_element("title", &entry.title)?);
    element.push_element(Element::with_text("updated", format_timestamp(&entry.updated)));
    push_people(&mut element, &entry.authors, PersonRole::Author)?;
    if let Some(content) = &entry.content {
        element.push_element(content_element(content));
    }
    push_links(&mut element, &entry.links)?;
    if let Some(summary) = &entry.summary {
        element.push_element(text_element("summary", summary)?);
    }
    push_people(&mut element, &entry.contributors, PersonRole::Contributor)?;
    push_categories(&mut element, &entry.categories)?;
    if let Some(published) = &entry.published {
        element.push_element(Element::with_text("published", format_timestamp(published)));
    }
    if let Some(rights) = &entry.rights {
        element.push_element(text_element("rights", rights)?);
    }
    if let Some(source) = &entry.source {
        element.push_element(source_element(source)?);
    }

    Ok(element)
}

fn source_element(source: &Source) -> Result<Element, AtomError> {
    if source.id.is_empty() {
        return Err(AtomError::constraint("source id can not be empty"));
    }
    if source.title.value.is_empty() {
        return Err(AtomError::constraint("source title can not be empty"));
    }

    let mut element = Element::new("source");
    element.push_element(Element::with_text("id", source.id.as_str()));
    element.push_element(text_element("title", &source.title)?);
    element.push_element(Element::with_text("updated", format_timestamp(&source.updated)));
    Ok(element)
}

/// Text construct: `type` is only written for non-default kinds.
fn text_element(name: &str, text: &Text) -> Result<Element, AtomError> {
    if !TEXT_ELEMENT_NAMES.contains(&name) {
        return Err(AtomError::UnsupportedValue(format!(
            "unsupported text element name '{}'",
            name
        )));
    }

    let mut element = Element::with_text(name, text.value.as_str());
    element.set_optional_attribute("type", text.kind.attribute_value());
    Ok(element)
}

fn content_element(content: &Content) -> Element {
    let mut element = Element::with_text("content", content.value.as_deref().unwrap_or(""));
    // "text" is the default and is left implicit
    let media_type = content.media_type.as_deref().filter(|t| *t != "text");
    element.set_optional_attribute("type", media_type);
    element.set_optional_attribute("src", content.src.as_deref());
    element
}

fn push_people(parent: &mut Element, people: &[Person], role: PersonRole) -> Result<(), AtomError> {
    for person in people {
        if person.name.is_empty() {
            return Err(AtomError::constraint(format!("{} name can not be empty", role)));
        }

        let mut element = Element::new(role.element_name());
        element.push_element(Element::with_text("name", person.name.as_str()));
        if let Some(email) = &person.email {
            element.push_element(Element::with_text("email", email.as_str()));
        }
        if let Some(url) = &person.url {
            element.push_element(Element::with_text("uri", url.as_str()));
        }
        parent.push_element(element);
    }
    Ok(())
}

fn push_links(parent: &mut Element, links: &[Link]) -> Result<(), AtomError> {
    for link in links {
        if link.href.is_empty() {
            return Err(AtomError::constraint("link href can not be empty"));
        }

        let mut element = Element::new("link");
        element.set_attribute("href", link.href.as_str());
        element.set_optional_attribute("rel", link.relation.as_deref());
        element.set_optional_attribute("type", link.media_type.as_deref());
        element.set_optional_attribute("hreflang", link.hreflang.as_deref());
        element.set_optional_attribute("title", link.title.as_deref());
        if let Some(length) = link.length {
            element.set_attribute("length", length.to_string());
        }
        parent.push_element(element);
    }
    Ok(())
}

fn push_categories(parent: &mut Element, categories: &[Category]) -> Result<(), AtomError> {
    for category in categories {
        if category.term.is_empty() {
            return Err(AtomError::constraint("category term can not be empty"));
        }

        let mut element = Element::new("category");
        element.set_attribute("term", category.term.as_str());
        element.set_optional_attribute("scheme", category.scheme.as_deref());
        element.set_optional_attribute("label", category.label.as_deref());
        parent.push_element(element);
    }
    Ok(())
}

fn generator_element(generator: &Generator) -> Element {
    let mut element = Element::with_text("generator", generator.value.as_str());
    element.set_optional_attribute("version", generator.version.as_deref());
    element.set_optional_attribute("uri", generator.uri.as_deref());
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::model::TextKind;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn updated() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 9, 8, 36, 48).unwrap()
    }

    fn child_names(element: &Element) -> Vec<String> {
        element
            .children
            .iter()
            .filter_map(|node| match node {
                crate::atom::tree::Node::Element(e) => Some(e.name.clone()),
                crate::atom::tree::Node::Text(_) => None,
            })
            .collect()
    }

    fn first_child(element: &Element) -> &Element {
        match element.children.first() {
            Some(crate::atom::tree::Node::Element(e)) => e,
            _ => panic!("Expected a child element"),
        }
    }

    fn full_entry() -> Entry {
        let mut entry = Entry::new("urn:entry", "Entry", updated());
        entry.source = Some(Source {
            id: "urn:source".into(),
            title: Text::new("Source"),
            updated: updated(),
        });
        entry.rights = Some(Text::new("Rights"));
        entry.published = Some(updated());
        entry.categories.push(Category::new("rust"));
        entry.contributors.push(Person::new("Bob"));
        entry.summary = Some(Text::new("Summary"));
        entry.links.push(Link::new("https://example.com/1"));
        entry.content = Some(Content::inline("Body"));
        entry.authors.push(Person::new("Alice"));
        entry
    }

    #[test]
    fn test_feed_child_order() {
        let mut feed = Feed::new("urn:feed", "Feed", updated());
        feed.entries.push(Entry::new("urn:entry", "Entry", updated()));
        feed.subtitle = Some("Subtitle".into());
        feed.rights = Some(Text::new("Rights"));
        feed.logo = Some("/logo.png".into());
        feed.icon = Some("/icon.png".into());
        feed.generator = Some(Generator::new("atomfeed"));
        feed.categories.push(Category::new("news"));
        feed.contributors.push(Person::new("Bob"));
        feed.links.push(Link::new("https://example.com/"));
        feed.authors.push(Person::new("Alice"));

        let document = serialize(&feed, None).unwrap();
        assert_eq!(
            child_names(document.root()),
            vec![
                "id", "title", "updated", "author", "link", "contributor", "category",
                "generator", "icon", "logo", "rights", "subtitle", "entry",
            ]
        );
        assert_eq!(document.root().attribute("xmlns"), Some(ATOM_NAMESPACE));
    }

    #[test]
    fn test_entry_child_order() {
        let element = entry_element(&full_entry()).unwrap();
        assert_eq!(
            child_names(&element),
            vec![
                "id", "title", "updated", "author", "content", "link", "summary",
                "contributor", "category", "published", "rights", "source",
            ]
        );
    }

    #[test]
    fn test_empty_feed_id_rejected_before_building() {
        let feed = Feed::new("", "", updated());
        let err = serialize(&feed, None).unwrap_err();
        assert_eq!(err.constraint_message(), Some("feed id can not be empty"));
    }

    #[test]
    fn test_empty_feed_title_rejected() {
        let feed = Feed::new("id", "", updated());
        let err = serialize(&feed, None).unwrap_err();
        assert_eq!(err.constraint_message(), Some("feed title can not be empty"));
    }

    #[test]
    fn test_empty_entry_fields_rejected() {
        let mut feed = Feed::new("id", "title", updated());
        feed.entries.push(Entry::new("", "", updated()));
        let err = serialize(&feed, None).unwrap_err();
        assert_eq!(err.constraint_message(), Some("entry id can not be empty"));

        feed.entries[0].id = "id".into();
        let err = serialize(&feed, None).unwrap_err();
        assert_eq!(err.constraint_message(), Some("entry title can not be empty"));
    }

    #[test]
    fn test_list_items_validate_required_field() {
        let mut feed = Feed::new("id", "title", updated());
        feed.contributors.push(Person::new(""));
        let err = serialize(&feed, None).unwrap_err();
        assert_eq!(err.constraint_message(), Some("contributor name can not be empty"));

        let mut feed = Feed::new("id", "title", updated());
        feed.links.push(Link::new(""));
        let err = serialize(&feed, None).unwrap_err();
        assert_eq!(err.constraint_message(), Some("link href can not be empty"));

        let mut feed = Feed::new("id", "title", updated());
        let mut entry = Entry::new("e", "t", updated());
        entry.categories.push(Category::new(""));
        feed.entries.push(entry);
        let err = serialize(&feed, None).unwrap_err();
        assert_eq!(err.constraint_message(), Some("category term can not be empty"));
    }

    #[test]
    fn test_text_type_attribute_only_for_non_default_kind() {
        let plain = text_element("title", &Text::new("a")).unwrap();
        assert_eq!(plain.attribute("type"), None);

        let html = text_element("summary", &Text::html("<b>a</b>")).unwrap();
        assert_eq!(html.attribute("type"), Some("html"));

        let xhtml = text_element("rights", &Text::xhtml("a")).unwrap();
        assert_eq!(xhtml.attribute("type"), Some("xhtml"));
        assert_eq!(Text::xhtml("a").kind, TextKind::Xhtml);
    }

    #[test]
    fn test_text_element_rejects_unknown_name() {
        let err = text_element("content", &Text::new("a")).unwrap_err();
        assert!(matches!(err, AtomError::UnsupportedValue(_)));
    }

    #[test]
    fn test_content_attributes() {
        let content = Content {
            value: Some("x".into()),
            media_type: Some("text".into()),
            src: None,
        };
        let element = content_element(&content);
        assert_eq!(element.attribute("type"), None);
        assert_eq!(element.inner_text(), "x");

        let remote = Content {
            value: None,
            media_type: Some("video/mp4".into()),
            src: Some("https://example.com/v.mp4".into()),
        };
        let element = content_element(&remote);
        assert_eq!(
            element.attributes,
            vec![
                ("type".to_string(), "video/mp4".to_string()),
                ("src".to_string(), "https://example.com/v.mp4".to_string()),
            ]
        );
        assert!(!element.has_child_nodes());
    }

    #[test]
    fn test_link_attributes_in_order_and_only_when_present() {
        let mut link = Link::new("https://example.com/");
        link.relation = Some("enclosure".into());
        link.length = Some(1024);

        let mut parent = Element::new("feed");
        push_links(&mut parent, &[link]).unwrap();
        let element = first_child(&parent);
        assert_eq!(
            element.attributes,
            vec![
                ("href".to_string(), "https://example.com/".to_string()),
                ("rel".to_string(), "enclosure".to_string()),
                ("length".to_string(), "1024".to_string()),
            ]
        );
    }

    #[test]
    fn test_person_uses_uri_element() {
        let mut parent = Element::new("entry");
        let person = Person::new("Alice").with_url("https://example.com/alice");
        push_people(&mut parent, &[person], PersonRole::Author).unwrap();
        let author = first_child(&parent);
        assert_eq!(author.name, "author");
        assert_eq!(child_names(author), vec!["name", "uri"]);
    }

    #[test]
    fn test_rendered_minimal_feed() {
        let feed = Feed::new("urn:feed", "Sample Feed", updated());
        let xml = serialize(&feed, Some("utf-8"))
            .unwrap()
            .to_xml_string()
            .unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<?xml version="1.0" encoding="utf-8"?>"#,
                r#"<feed xmlns="http://www.w3.org/2005/Atom">"#,
                "<id>urn:feed</id><title>Sample Feed</title>",
                "<updated>2024-11-09T08:36:48Z</updated></feed>"
            )
        );
    }

    #[test]
    fn test_declared_encoding_applies_to_bytes() {
        let feed = Feed::new("urn:feed", "Caf\u{e9}", updated());
        let bytes = serialize(&feed, Some("iso-8859-1"))
            .unwrap()
            .to_xml_bytes(0)
            .unwrap();
        assert!(bytes.windows(4).any(|w| w == b"Caf\xE9"));
        assert!(!bytes.windows(5).any(|w| w == "Caf\u{e9}".as_bytes()));
    }

    #[test]
    fn test_unusable_encoding_rejected() {
        let feed = Feed::new("urn:feed", "Title", updated());
        for label in ["utf-16", "no-such-encoding"] {
            assert!(matches!(
                serialize(&feed, Some(label)),
                Err(AtomError::UnsupportedValue(_))
            ));
        }
    }
}
