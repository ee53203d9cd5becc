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

//! Substituting translations into Markdown documents.

use log::{debug, info, warn};
use pulldown_cmark::{CowStr, Event, Tag};

use crate::catalog::Catalog;
use crate::config::Configuration;
use crate::extract_events;
use crate::reconstruct_markdown;
use crate::render::render_key;
use crate::segment::{Segmenter, UnitKind};

/// Written in front of a translation before parsing it, so that a
/// leading `# `, `> ` or `1. ` is read as text. It is ASCII
/// punctuation without inline meaning.
const GUARD: char = '%';

fn owned<'b>(text: CowStr<'_>) -> CowStr<'b> {
    CowStr::from(text.into_string())
}

fn owned_inline_tag<'b>(tag: Tag<'_>) -> Option<Tag<'b>> {
    match tag {
        Tag::Emphasis => Some(Tag::Emphasis),
        Tag::Strong => Some(Tag::Strong),
        Tag::Strikethrough => Some(Tag::Strikethrough),
        Tag::Link(link_type, url, title) => Some(Tag::Link(link_type, owned(url), owned(title))),
        Tag::Image(link_type, url, title) => Some(Tag::Image(link_type, owned(url), owned(title))),
        _ => None,
    }
}

/// Convert an inline event to an owned one. Block events give `None`.
fn owned_inline<'b>(event: Event<'_>) -> Option<Event<'b>> {
    match event {
        Event::Text(text) => Some(Event::Text(owned(text))),
        Event::Code(code) => Some(Event::Code(owned(code))),
        Event::Html(html) => Some(Event::Html(owned(html))),
        Event::FootnoteReference(name) => Some(Event::FootnoteReference(owned(name))),
        Event::SoftBreak | Event::HardBreak => Some(Event::Text(" ".into())),
        Event::Start(tag) => owned_inline_tag(tag).map(Event::Start),
        Event::End(tag) => owned_inline_tag(tag).map(Event::End),
        _ => None,
    }
}

/// Give each `|` a text event of its own. The writer escapes special
/// characters at the start of a text event, which keeps the pipe from
/// ending a table cell.
fn split_pipes(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut split = Vec::with_capacity(events.len());
    for event in events {
        match event {
            Event::Text(text) if text.contains('|') => {
                for (idx, part) in text.split('|').enumerate() {
                    if idx > 0 {
                        split.push(Event::Text("|".into()));
                    }
                    if !part.is_empty() {
                        split.push(Event::Text(CowStr::from(String::from(part))));
                    }
                }
            }
            event => split.push(event),
        }
    }
    split
}

/// Parse `msgstr` as inline Markdown for a unit of `kind`.
///
/// A translation never changes the structure around it: line breaks
/// and paragraph breaks become spaces and a leading block marker is
/// kept as text.
///
/// ```
/// use mdpo::translate::parse_translation;
/// use mdpo::UnitKind;
/// use pulldown_cmark::Event;
///
/// assert_eq!(
///     parse_translation("1. Uno", UnitKind::ListItem),
///     vec![Event::Text("1. Uno".into())],
/// );
/// ```
pub fn parse_translation<'b>(msgstr: &str, kind: UnitKind) -> Vec<Event<'b>> {
    let line = msgstr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let guarded = format!("{GUARD}{line}");

    let mut events = Vec::new();
    let mut after_block = false;
    for (_, event) in extract_events(&guarded) {
        match owned_inline(event) {
            Some(event) => {
                if std::mem::take(&mut after_block) && !events.is_empty() {
                    events.push(Event::Text(" ".into()));
                }
                events.push(event);
            }
            None => after_block = true,
        }
    }

    let unguarded = match events.first() {
        Some(Event::Text(text)) => text.strip_prefix(GUARD).map(String::from),
        _ => None,
    };
    match unguarded {
        Some(text) if text.is_empty() => {
            events.remove(0);
        }
        Some(text) => events[0] = Event::Text(text.into()),
        None => warn!("Could not parse translation {msgstr:?} as inline text"),
    }

    match kind {
        UnitKind::TableCell { .. } => split_pipes(events),
        _ => events,
    }
}

/// Replace every translatable unit in `events` by its translation.
///
/// Each unit is rendered into a message with the same configuration
/// used for extraction and looked up in `catalog`. Units without a
/// usable translation, and all structural events, are copied
/// unchanged. Translations are parsed as inline Markdown, see
/// [`parse_translation`].
pub fn translate_events<'a>(
    events: &'a [(usize, Event<'a>)],
    catalog: &Catalog,
    config: &Configuration,
) -> Vec<(usize, Event<'a>)> {
    let mut translated_events = Vec::with_capacity(events.len());
    let mut copied = 0;
    let (mut found, mut missing) = (0, 0);

    for unit in Segmenter::new(events).units() {
        // Copy the structure between units unchanged.
        translated_events.extend_from_slice(&events[copied..unit.range.start]);
        copied = unit.range.end;

        let Some(msgid) = render_key(unit.events, config) else {
            translated_events.extend_from_slice(unit.events);
            continue;
        };
        match catalog.translation(&msgid) {
            Some(msgstr) => {
                found += 1;
                translated_events.extend(
                    parse_translation(msgstr, unit.kind)
                        .into_iter()
                        .map(|event| (unit.lineno, event)),
                );
            }
            None => {
                missing += 1;
                debug!("Line {}: no translation for {msgid:?}", unit.lineno);
                translated_events.extend_from_slice(unit.events);
            }
        }
    }
    translated_events.extend_from_slice(&events[copied..]);

    info!("Translated {found} messages, {missing} without translation");
    translated_events
}

/// Translate `document` using `catalog`.
///
/// The result is Markdown in normalized form, ending with a newline
/// unless it is empty. With an empty catalog this normalizes the
/// document without changing its content.
pub fn translate_markdown(document: &str, catalog: &Catalog, config: &Configuration) -> String {
    let events = extract_events(document);
    let translated_events = translate_events(&events, catalog, config);
    let mut translated = reconstruct_markdown(&translated_events);
    if !translated.is_empty() && !translated.ends_with('\n') {
        translated.push('\n');
    }
    translated
}
