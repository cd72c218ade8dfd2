//! Console rendering of a feed as a box-drawing tree.

use std::fmt::Write;

use crate::atom::{format_timestamp, Feed};

const BRANCH: &str = "├─";
const LAST: &str = "└─";

/// Renders the feed header, its links and its entries.
pub fn render_feed(feed: &Feed) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_feed(&mut out, feed);
    out
}

fn write_feed(out: &mut String, feed: &Feed) -> std::fmt::Result {
    writeln!(out, "> Feed Id: {}", feed.id)?;
    writeln!(out, "> Feed Title: {}", feed.title)?;
    if let Some(subtitle) = &feed.subtitle {
        writeln!(out, "> Feed Subtitle: {}", subtitle)?;
    }
    writeln!(out, "> Feed Updated: {}", format_timestamp(&feed.updated))?;

    writeln!(out, "> Links:")?;
    for (i, link) in feed.links.iter().enumerate() {
        let prefix = if i + 1 == feed.links.len() { LAST } else { BRANCH };
        writeln!(
            out,
            "  {} Links[{}] Href: {}, Rel: {}, Type: {}",
            prefix,
            i,
            link.href,
            link.relation.as_deref().unwrap_or(""),
            link.media_type.as_deref().unwrap_or("")
        )?;
    }

    writeln!(out, "> Entries:")?;
    for (i, entry) in feed.entries.iter().enumerate() {
        let is_last = i + 1 == feed.entries.len();
        writeln!(out, "  {} Entries[{}]", if is_last { LAST } else { BRANCH }, i)?;
        let indent = if is_last { "     " } else { "  │  " };

        let published = entry
            .published
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_default();
        let author = entry
            .authors
            .first()
            .map(|a| match &a.url {
                Some(url) => format!("{} <{}>", a.name, url),
                None => a.name.clone(),
            })
            .unwrap_or_default();
        let link = entry.links.first().map(|l| l.href.as_str()).unwrap_or("");
        let content = entry
            .content
            .as_ref()
            .and_then(|c| c.value.as_deref())
            .unwrap_or("");

        writeln!(out, "{}{} Id: {}", indent, BRANCH, entry.id)?;
        writeln!(out, "{}{} Title: {}", indent, BRANCH, entry.title)?;
        writeln!(out, "{}{} Published: {}", indent, BRANCH, published)?;
        writeln!(out, "{}{} Updated: {}", indent, BRANCH, format_timestamp(&entry.updated))?;
        writeln!(out, "{}{} Author: {}", indent, BRANCH, author)?;
        writeln!(out, "{}{} Link: {}", indent, BRANCH, link)?;
        writeln!(out, "{}{} Content: {}", indent, LAST, content)?;
    }

    Ok(())
}
