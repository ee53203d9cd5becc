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

//! Rendering translatable units into catalog messages.

use std::ops::Range;

use log::{debug, warn};
use pulldown_cmark::{Event, LinkType, Tag};

use crate::config::Configuration;

/// Spans nested deeper than this are rendered without delimiters.
pub const MAX_SPAN_DEPTH: usize = 16;

/// Characters escaped in the text of markup-preserving messages.
const MARKUP_CHARS: &str = "\\*_[]<>`~";

#[derive(Debug, Copy, Clone, PartialEq)]
enum SpanKind {
    Emphasis,
    Strong,
    Strikethrough,
    Link,
    Image,
}

impl SpanKind {
    fn of(tag: &Tag) -> Option<SpanKind> {
        match tag {
            Tag::Emphasis => Some(SpanKind::Emphasis),
            Tag::Strong => Some(SpanKind::Strong),
            Tag::Strikethrough => Some(SpanKind::Strikethrough),
            Tag::Link(..) => Some(SpanKind::Link),
            Tag::Image(..) => Some(SpanKind::Image),
            _ => None,
        }
    }
}

/// A span which has been opened but not yet closed.
#[derive(Debug)]
struct OpenSpan {
    /// `None` for spans beyond [`MAX_SPAN_DEPTH`].
    kind: Option<SpanKind>,
    /// Where the opening delimiter was written.
    opening: Range<usize>,
    closing: String,
    /// Autolinks show their text verbatim.
    verbatim: bool,
}

/// Append `text` to `key`, escaping characters which would be read
/// as markup.
fn push_escaped(key: &mut String, text: &str) {
    for c in text.chars() {
        if MARKUP_CHARS.contains(c) {
            key.push('\\');
        }
        key.push(c);
    }
}

/// Compute the delimiters for `tag`.
fn delimiters(tag: &Tag, config: &Configuration) -> (String, String) {
    let lexicon = config.lexicon();
    let link = |prefix: &str, link_type: &LinkType, url: &str, title: &str| match link_type {
        LinkType::Autolink | LinkType::Email => (String::from("<"), String::from(">")),
        _ => {
            let target = if title.is_empty() {
                format!("({url})")
            } else {
                format!("({url} \"{title}\")")
            };
            (
                format!("{prefix}{}", lexicon.link_start),
                format!("{}{target}", lexicon.link_end),
            )
        }
    };
    match tag {
        Tag::Emphasis => (lexicon.italic.clone(), lexicon.italic.clone()),
        Tag::Strong => (lexicon.bold.clone(), lexicon.bold.clone()),
        Tag::Strikethrough => (String::from("~~"), String::from("~~")),
        Tag::Link(link_type, url, title) => link("", link_type, &**url, &**title),
        Tag::Image(link_type, url, title) => link("!", link_type, &**url, &**title),
        _ => (String::new(), String::new()),
    }
}

/// Render `events` into a catalog message.
///
/// In markup-preserving mode, inline spans are written with the
/// delimiters of the configured [`crate::MarkupLexicon`] and markup
/// characters in the text are backslash-escaped, so the message reads
/// like the source. In plaintext mode only the text remains. Line breaks become spaces,
/// the replacement map is applied and the result is trimmed.
///
/// Returns `None` if the message is empty or forbidden.
///
/// # Examples
///
/// ```
/// use mdpo::{extract_events, render_key, ConfigOptions, Configuration};
///
/// let events = extract_events("the **bold** word");
/// // Skip the surrounding paragraph.
/// let events = &events[1..events.len() - 1];
/// let markup = Configuration::default();
/// assert_eq!(render_key(events, &markup).as_deref(), Some("the **bold** word"));
///
/// let options = ConfigOptions { plaintext: true, ..ConfigOptions::default() };
/// let plaintext = Configuration::try_from(&options).unwrap();
/// assert_eq!(render_key(events, &plaintext).as_deref(), Some("the bold word"));
/// ```
pub fn render_key(events: &[(usize, Event)], config: &Configuration) -> Option<String> {
    let markup = !config.plaintext();
    let code = &config.lexicon().code;
    let mut key = String::new();
    let mut stack: Vec<OpenSpan> = Vec::new();

    for (lineno, event) in events {
        match event {
            Event::Text(text) if markup && !stack.iter().any(|span| span.verbatim) => {
                push_escaped(&mut key, text)
            }
            Event::Text(text) => key.push_str(text),
            Event::Code(text) if markup => {
                key.push_str(code);
                key.push_str(text);
                key.push_str(code);
            }
            Event::Code(text) => key.push_str(text),
            Event::SoftBreak | Event::HardBreak => key.push(' '),
            Event::FootnoteReference(name) if markup => {
                key.push_str(&format!("[^{name}]"));
            }
            Event::Start(tag) => {
                let Some(kind) = SpanKind::of(tag) else {
                    warn!("Line {lineno}: unexpected {tag:?} inside inline text");
                    continue;
                };
                if stack.len() >= MAX_SPAN_DEPTH {
                    debug!("Line {lineno}: spans nested too deep, writing {tag:?} as plain text");
                    stack.push(OpenSpan {
                        kind: None,
                        opening: key.len()..key.len(),
                        closing: String::new(),
                        verbatim: false,
                    });
                    continue;
                }
                let (opening, closing) = if markup {
                    delimiters(tag, config)
                } else {
                    (String::new(), String::new())
                };
                let start = key.len();
                key.push_str(&opening);
                stack.push(OpenSpan {
                    kind: Some(kind),
                    opening: start..key.len(),
                    closing,
                    verbatim: matches!(
                        tag,
                        Tag::Link(LinkType::Autolink | LinkType::Email, ..)
                    ),
                });
            }
            Event::End(tag) => {
                let matches = match stack.last() {
                    Some(OpenSpan { kind: None, .. }) => true,
                    Some(OpenSpan {
                        kind: Some(kind), ..
                    }) => SpanKind::of(tag) == Some(*kind),
                    None => false,
                };
                match stack.pop() {
                    Some(span) if matches => key.push_str(&span.closing),
                    span => {
                        warn!("Line {lineno}: unbalanced end of {tag:?}, ignoring it");
                        stack.extend(span);
                    }
                }
            }
            _ => {}
        }
    }

    // Spans which were never closed are written as plain text. The
    // innermost span was opened last, so removing from the top of the
    // stack keeps the other ranges valid.
    while let Some(span) = stack.pop() {
        if span.kind.is_some() {
            warn!("Unterminated inline span, writing it as plain text");
        }
        key.replace_range(span.opening, "");
    }

    for (old, new) in config.replacements() {
        key = key.replace(old.as_str(), new.as_str());
    }

    let key = key.replace(['\n', '\r'], " ");
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    if config.is_forbidden(key) {
        debug!("Dropping forbidden message {key:?}");
        return None;
    }
    Some(String::from(key))
}
