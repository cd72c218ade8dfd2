//! Documents shared by the strict and lenient integration tests.
//!
//! Every case breaks exactly one rule. Strict mode must name the rule;
//! lenient mode must still produce a feed in which the offending item was
//! dropped or defaulted.

#![allow(dead_code)]

use atomfeed::atom::{Feed, TextKind};
use chrono::{DateTime, Utc};

pub const FEED_HEAD: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <id>urn:uuid:01931011-954d-71ee-ade5-0146811ae69f</id>
    <title>Sample Feed</title>
    <updated>2024-11-09T08:36:48Z</updated>"#;

pub const ENTRY_HEAD: &str = r#"<id>urn:uuid:01931f1f-656d-724e-942d-184a143d56cb</id>
        <title>Sample Entry</title>
        <updated>2024-11-09T08:36:48Z</updated>"#;

const ATOM_OPEN: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom">"#;

pub fn feed_with(body: &str) -> String {
    format!("{}\n    {}\n</feed>", FEED_HEAD, body)
}

pub fn entry_with(body: &str) -> String {
    feed_with(&format!(
        "<entry>\n        {}\n        {}\n    </entry>",
        ENTRY_HEAD, body
    ))
}

fn bare_feed(body: &str) -> String {
    format!("{}{}</feed>", ATOM_OPEN, body)
}

pub struct MalformedCase {
    pub xml: String,
    /// Constraint message raised in strict mode.
    pub message: &'static str,
    /// Holds for the lenient result once the offending item is gone.
    pub repaired: fn(&Feed) -> bool,
}

fn case(xml: String, message: &'static str, repaired: fn(&Feed) -> bool) -> MalformedCase {
    MalformedCase {
        xml,
        message,
        repaired,
    }
}

/// The entry holding the offending child element was kept.
fn entry_kept(feed: &Feed) -> bool {
    feed.entries.len() == 1
}

pub fn malformed_cases() -> Vec<MalformedCase> {
    vec![
        // Document
        case(
            r#"<feed xmlns="urn:not-atom"><id>x</id></feed>"#.to_string(),
            "root element is not an atom feed",
            |feed| feed.id.is_empty(),
        ),
        // Feed
        case(bare_feed(""), "feed id is missing", |feed| {
            feed.id.is_empty()
        }),
        case(bare_feed("<id>x</id>"), "feed title is missing", |feed| {
            feed.title.value.is_empty()
        }),
        case(
            bare_feed("<id>x</id><title>t</title>"),
            "feed updated is missing",
            |feed| feed.updated == DateTime::<Utc>::default(),
        ),
        case(
            bare_feed("<id>x</id><title>t</title><updated>invalid</updated>"),
            "invalid feed updated",
            |feed| feed.updated == DateTime::<Utc>::default(),
        ),
        case(
            feed_with("<author><email>me@example.com</email></author>"),
            "feed author name is missing",
            |feed| feed.authors.is_empty(),
        ),
        case(
            feed_with("<contributor><uri>https://example.com/</uri></contributor>"),
            "feed contributor name is missing",
            |feed| feed.contributors.is_empty(),
        ),
        case(
            feed_with(r#"<link rel=""/>"#),
            "feed link href attribute is missing",
            |feed| feed.links.is_empty(),
        ),
        case(
            feed_with(r#"<link rel="alternate"/>"#),
            "feed link href attribute is missing",
            |feed| feed.links.is_empty(),
        ),
        case(
            feed_with(r#"<category label="News"/>"#),
            "feed category term attribute is missing",
            |feed| feed.categories.is_empty(),
        ),
        case(
            feed_with("<generator version=\"1.0\">\n    </generator>"),
            "generator name is missing",
            |feed| feed.generator.is_none(),
        ),
        case(
            feed_with(r#"<rights type="markdown">R</rights>"#),
            "invalid rights text type 'markdown'",
            |feed| feed.rights.as_ref().map(|r| r.kind) == Some(TextKind::Text),
        ),
        // Entry
        case(
            feed_with("<entry><title>Sample Entry</title></entry>"),
            "entry id is missing",
            |feed| feed.entries.is_empty(),
        ),
        case(
            feed_with("<entry><id>e</id></entry>"),
            "entry title is missing",
            |feed| feed.entries.is_empty(),
        ),
        case(
            feed_with("<entry><id>e</id><title>t</title></entry>"),
            "entry updated is missing",
            |feed| feed.entries.is_empty(),
        ),
        case(
            feed_with("<entry><id>e</id><title>t</title><updated>yesterday</updated></entry>"),
            "invalid entry updated",
            |feed| feed.entries.is_empty(),
        ),
        case(
            entry_with("<published>tomorrow</published>"),
            "invalid entry published",
            |feed| entry_kept(feed) && feed.entries[0].published.is_none(),
        ),
        case(
            entry_with("<author><email>me@example.com</email></author>"),
            "entry author name is missing",
            |feed| entry_kept(feed) && feed.entries[0].authors.is_empty(),
        ),
        case(
            entry_with("<contributor><email>me@example.com</email></contributor>"),
            "entry contributor name is missing",
            |feed| entry_kept(feed) && feed.entries[0].contributors.is_empty(),
        ),
        case(
            entry_with(r#"<link rel=""/>"#),
            "entry link href attribute is missing",
            |feed| entry_kept(feed) && feed.entries[0].links.is_empty(),
        ),
        case(
            entry_with(r#"<category scheme="urn:tags"/>"#),
            "entry category term attribute is missing",
            |feed| entry_kept(feed) && feed.entries[0].categories.is_empty(),
        ),
        case(
            entry_with(r#"<summary type="rtf">S</summary>"#),
            "invalid summary text type 'rtf'",
            |feed| {
                entry_kept(feed)
                    && feed.entries[0].summary.as_ref().map(|s| s.kind) == Some(TextKind::Text)
            },
        ),
        // Entry source
        case(
            entry_with("<source><title>Example, Inc.</title></source>"),
            "entry source id is missing",
            |feed| entry_kept(feed) && feed.entries[0].source.is_none(),
        ),
        case(
            entry_with("<source><id>https://example.org/</id></source>"),
            "entry source title is missing",
            |feed| entry_kept(feed) && feed.entries[0].source.is_none(),
        ),
        case(
            entry_with(concat!(
                "<source><id>https://example.org/</id>",
                "<title>Example, Inc.</title></source>"
            )),
            "entry source updated is missing",
            |feed| entry_kept(feed) && feed.entries[0].source.is_none(),
        ),
        case(
            entry_with(concat!(
                "<source><id>https://example.org/</id><title>Example, Inc.</title>",
                "<updated>never</updated></source>"
            )),
            "invalid entry source updated",
            |feed| entry_kept(feed) && feed.entries[0].source.is_none(),
        ),
    ]
}
