// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Helpers for translating Markdown documents with Gettext catalogs.
//!
//! The functions here implement a translation workflow for plain
//! Markdown files:
//!
//! - [`markdown_to_catalog`] extracts the translatable text of one or
//!   more documents into a PO [`Catalog`], merging with an existing
//!   catalog so that translations are never lost.
//! - [`translate_markdown`] substitutes the translations found in a
//!   catalog back into a document.
//! - [`translate_markdown_to_html`] does the same but produces HTML.
//!
//! ```
//! use mdpo::{markdown_to_catalog, translate_markdown, Configuration, Source};
//!
//! let config = Configuration::default();
//! let source = Source::content("# Title\n\nHello world.\n");
//! let mut catalog = markdown_to_catalog(&[source], None, &config);
//! assert_eq!(
//!     catalog.iter().map(|entry| entry.msgid.as_str()).collect::<Vec<_>>(),
//!     vec!["Title", "Hello world."],
//! );
//!
//! catalog.set_translation("Title", "Título");
//! catalog.set_translation("Hello world.", "Hola mundo.");
//! assert_eq!(
//!     translate_markdown("# Title\n\nHello world.\n", &catalog, &config),
//!     "# Título\n\nHola mundo.\n",
//! );
//! ```

use pulldown_cmark::{CowStr, Event, LinkType, Tag};
use pulldown_cmark_to_cmark::{cmark_resume_with_options, Options};

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod html;
pub mod input;
pub mod lexicon;
pub mod po;
pub mod render;
pub mod segment;
pub mod sync;
pub mod translate;

pub use catalog::{Catalog, Entry, Header};
pub use config::{Configuration, Options as ConfigOptions};
pub use error::{Error, Result};
pub use extract::{extract_messages, markdown_to_catalog, Extractor};
pub use html::translate_markdown_to_html;
pub use input::Source;
pub use lexicon::MarkupLexicon;
pub use render::render_key;
pub use segment::{Segmenter, Unit, UnitKind};
pub use sync::synchronize;
pub use translate::{translate_events, translate_markdown};

/// Create a Markdown parser with the extensions used for all
/// documents and translations.
pub fn new_cmark_parser(text: &str) -> pulldown_cmark::Parser<'_, '_> {
    let mut options = pulldown_cmark::Options::empty();
    options.insert(pulldown_cmark::Options::ENABLE_TABLES);
    options.insert(pulldown_cmark::Options::ENABLE_FOOTNOTES);
    options.insert(pulldown_cmark::Options::ENABLE_STRIKETHROUGH);
    options.insert(pulldown_cmark::Options::ENABLE_TASKLISTS);
    options.insert(pulldown_cmark::Options::ENABLE_HEADING_ATTRIBUTES);
    pulldown_cmark::Parser::new_ext(text, options)
}

/// Extract Markdown events from `text`.
///
/// The events are labeled with the line number where they start in
/// the document. Soft breaks are turned into spaces.
///
/// # Examples
///
/// ```
/// use mdpo::extract_events;
/// use pulldown_cmark::{Event, Tag};
///
/// assert_eq!(
///     extract_events("Hello,\nworld!"),
///     vec![
///         (1, Event::Start(Tag::Paragraph)),
///         (1, Event::Text("Hello,".into())),
///         (1, Event::Text(" ".into())),
///         (2, Event::Text("world!".into())),
///         (1, Event::End(Tag::Paragraph)),
///     ]
/// );
/// ```
pub fn extract_events(text: &str) -> Vec<(usize, Event<'_>)> {
    // Offsets of each newline in the input, used to calculate line
    // numbers from byte offsets.
    let offsets = text
        .match_indices('\n')
        .map(|(offset, _)| offset)
        .collect::<Vec<_>>();

    fn expand_shortcut_link(tag: Tag) -> Tag {
        match tag {
            Tag::Link(LinkType::Shortcut, reference, title) => {
                Tag::Link(LinkType::Reference, reference, title)
            }
            Tag::Image(LinkType::Shortcut, reference, title) => {
                Tag::Image(LinkType::Reference, reference, title)
            }
            _ => tag,
        }
    }

    new_cmark_parser(text)
        .into_offset_iter()
        .map(|(event, range)| {
            let lineno = offsets.partition_point(|&o| o < range.start) + 1;
            let event = match event {
                Event::SoftBreak => Event::Text(" ".into()),
                // Shortcut links like "[foo]" are written back as
                // "[foo]", which dangles once the link definitions
                // are gone. As reference links they are expanded on
                // the fly.
                Event::Start(tag @ Tag::Link(..) | tag @ Tag::Image(..)) => {
                    Event::Start(expand_shortcut_link(tag))
                }
                Event::End(tag @ Tag::Link(..) | tag @ Tag::Image(..)) => {
                    Event::End(expand_shortcut_link(tag))
                }
                _ => event,
            };
            (lineno, event)
        })
        .collect()
}

/// Render a slice of Markdown events back to Markdown.
///
/// # Examples
///
/// ```
/// use mdpo::{extract_events, reconstruct_markdown};
///
/// let events = extract_events("Hello _world!_");
/// assert_eq!(reconstruct_markdown(&events), "Hello *world!*");
///
/// let events = extract_events("> A quote\n>\n> - with a list\n");
/// assert_eq!(reconstruct_markdown(&events), "> A quote\n>\n> - with a list");
/// ```
///
/// The output is normalized to use `*` for emphasis, `**` for strong
/// emphasis and `-` for bullet lists, matching the default
/// [`MarkupLexicon`].
pub fn reconstruct_markdown(events: &[(usize, Event)]) -> String {
    let events = escape_list_markers(events);
    let mut markdown = String::new();
    let options = Options {
        code_block_token_count: 3,
        list_token: '-',
        emphasis_token: '*',
        strong_token: "**",
        ..Options::default()
    };
    cmark_resume_with_options(events.iter(), &mut markdown, None, options)
        .expect("writing Markdown to a String cannot fail");
    // Code blocks must start on a new line, so we can get a leading
    // `\n` here.
    tidy_block_quotes(markdown.trim_start_matches('\n'))
}

/// Escape text at the start of a paragraph or list item which would
/// be read back as an ordered list or `+` list marker.
///
/// The writer only escapes the first character of a text event, and
/// only characters it knows as special. The escape is written as raw
/// Markdown between two text events.
fn escape_list_markers<'a>(events: &[(usize, Event<'a>)]) -> Vec<Event<'a>> {
    let mut escaped = Vec::with_capacity(events.len());
    let mut idx = 0;
    while let Some((_, event)) = events.get(idx) {
        escaped.push(event.clone());
        idx += 1;
        if matches!(event, Event::Start(Tag::Paragraph | Tag::Item)) {
            idx += escape_list_marker(&events[idx..], &mut escaped);
        }
    }
    escaped
}

/// Write the start of a block with its list marker escaped. Returns
/// the number of events consumed.
fn escape_list_marker<'a>(events: &[(usize, Event<'a>)], escaped: &mut Vec<Event<'a>>) -> usize {
    let is_marker_end = |rest: &str| rest.starts_with(". ") || rest.starts_with(") ");
    let (head, marker, tail, consumed) = match events {
        [(_, Event::Text(text)), ..] if text.starts_with("+ ") => ("", '+', &text[1..], 1),
        [(_, Event::Text(text)), rest @ ..] => {
            let digits = text.bytes().take_while(u8::is_ascii_digit).count();
            if digits == 0 || digits > 9 {
                return 0;
            }
            let (number, after) = text.split_at(digits);
            match rest {
                _ if is_marker_end(after) => (number, after.as_bytes()[0] as char, &after[1..], 1),
                [(_, Event::Text(next)), ..] if after.is_empty() && is_marker_end(&**next) => {
                    (number, next.as_bytes()[0] as char, &next[1..], 2)
                }
                _ => return 0,
            }
        }
        _ => return 0,
    };
    if !head.is_empty() {
        escaped.push(Event::Text(CowStr::from(String::from(head))));
    }
    escaped.push(Event::Html(CowStr::from(format!("\\{marker}"))));
    escaped.push(Event::Text(CowStr::from(String::from(tail))));
    consumed
}

/// Remove the padding the writer adds around block quotes.
///
/// Quoted lines are written as ` > text` and each quote opens with an
/// empty quoted line, which shifts the line numbers of the content.
fn tidy_block_quotes(markdown: &str) -> String {
    let mut lines = Vec::new();
    let mut previous_depth = 0;
    // Quote depth of the open code fence.
    let mut fence: Option<usize> = None;
    for line in markdown.split('\n') {
        let (prefix, depth, content) = split_quote_prefix(line, fence);
        if content.trim_start().starts_with("```") {
            fence = match fence {
                Some(_) => None,
                None => Some(depth),
            };
        } else if fence.is_none() && content.trim().is_empty() && depth > previous_depth {
            previous_depth = depth;
            continue;
        }
        previous_depth = depth;
        if content.trim().is_empty() && fence.is_none() {
            lines.push(prefix);
        } else {
            lines.push(prefix + content);
        }
    }
    lines.join("\n")
}

/// Split the block quote markers from the start of `line`. At most
/// `max_depth` markers are taken.
fn split_quote_prefix(line: &str, max_depth: Option<usize>) -> (String, usize, &str) {
    let mut prefix = String::new();
    let mut depth = 0;
    let mut rest = line;
    while max_depth.map_or(true, |max| depth < max) {
        let trimmed = rest.trim_start_matches(' ');
        let Some(after) = trimmed.strip_prefix('>') else {
            break;
        };
        let spaces = &rest[..rest.len() - trimmed.len()];
        // The writer puts one space before every `>`.
        prefix.push_str(spaces.strip_suffix(' ').unwrap_or(spaces));
        prefix.push('>');
        depth += 1;
        rest = after;
    }
    (prefix, depth, rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pulldown_cmark::Event::*;
    use pulldown_cmark::HeadingLevel::*;
    use pulldown_cmark::Tag::*;

    #[test]
    fn extract_events_empty() {
        assert_eq!(extract_events(""), vec![]);
    }

    #[test]
    fn extract_events_paragraph() {
        assert_eq!(
            extract_events("foo bar"),
            vec![
                (1, Start(Paragraph)),
                (1, Text("foo bar".into())),
                (1, End(Paragraph)),
            ]
        );
    }

    #[test]
    fn extract_events_softbreak() {
        assert_eq!(
            extract_events("foo\nbar"),
            vec![
                (1, Start(Paragraph)),
                (1, Text("foo".into())),
                (1, Text(" ".into())),
                (2, Text("bar".into())),
                (1, End(Paragraph)),
            ]
        );
    }

    #[test]
    fn extract_events_heading() {
        assert_eq!(
            extract_events("# Foo Bar"),
            vec![
                (1, Start(Heading(H1, None, vec![]))),
                (1, Text("Foo Bar".into())),
                (1, End(Heading(H1, None, vec![]))),
            ]
        );
    }

    #[test]
    fn extract_events_list_item() {
        assert_eq!(
            extract_events("* foo bar"),
            vec![
                (1, Start(List(None))),
                (1, Start(Item)),
                (1, Text("foo bar".into())),
                (1, End(Item)),
                (1, End(List(None))),
            ]
        );
    }

    #[test]
    fn extract_events_shortcut_link() {
        let events = extract_events("[foo]\n\n[foo]: https://example.com");
        assert_eq!(
            events[1],
            (
                1,
                Start(Link(
                    LinkType::Reference,
                    "https://example.com".into(),
                    "".into()
                ))
            )
        );
    }

    #[test]
    fn reconstruct_markdown_heading_and_paragraph() {
        let events = extract_events("# Title\n\nHello\nworld.\n");
        assert_eq!(reconstruct_markdown(&events), "# Title\n\nHello world.");
    }

    #[test]
    fn reconstruct_markdown_block_quote() {
        let events = extract_events("> quote\n>\n> - item\n\nAfter\n");
        let markdown = reconstruct_markdown(&events);
        assert_eq!(markdown, "> quote\n>\n> - item\n\nAfter");
        let lines = extract_events(&markdown)
            .into_iter()
            .filter_map(|(lineno, event)| matches!(event, Text(_)).then_some(lineno))
            .collect::<Vec<_>>();
        assert_eq!(lines, vec![1, 3, 5]);
    }

    #[test]
    fn reconstruct_markdown_nested_block_quote() {
        let events = extract_events("> a\n>\n> > b\n");
        assert_eq!(reconstruct_markdown(&events), "> a\n>\n> > b");
    }

    #[test]
    fn reconstruct_markdown_keeps_code_blocks() {
        let events = extract_events("```\n > not a quote\n```\n\n> ```\n> code\n> ```\n");
        assert_eq!(
            reconstruct_markdown(&events),
            "```\n > not a quote\n```\n\n> ```\n> code\n> ```"
        );
    }

    #[test]
    fn reconstruct_markdown_escapes_list_markers() {
        let events = extract_events("1\\. One\n\n- 2\\) Two\n- \\+ Three\n");
        let markdown = reconstruct_markdown(&events);
        assert_eq!(markdown, "1\\. One\n\n- 2\\) Two\n- \\+ Three");
        assert_eq!(reconstruct_markdown(&extract_events(&markdown)), markdown);
    }
}
