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

//! Splitting a Markdown document into translatable units.
//!
//! A unit is a maximal run of inline events (text, emphasis, links,
//! inline code, ...) inside a single block. Everything else is
//! structure which is copied unchanged when translating: headings
//! markers, list bullets, table pipes, code blocks and HTML.

use std::iter::FusedIterator;
use std::ops::Range;
use std::sync::OnceLock;

use log::{debug, warn};
use pulldown_cmark::{Event, HeadingLevel, Tag};
use regex::Regex;

/// The block a unit was found in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnitKind {
    Paragraph,
    Heading(HeadingLevel),
    ListItem,
    /// Row zero is the table header.
    TableCell {
        row: usize,
        column: usize,
        header: bool,
    },
    BlockQuote,
    FootnoteDefinition,
}

/// A translatable run of inline events.
///
/// Units are identified by position. The message for a unit is
/// computed on demand with [`crate::render_key`].
#[derive(Debug, Clone, PartialEq)]
pub struct Unit<'a> {
    pub kind: UnitKind,
    /// Line number of the first event.
    pub lineno: usize,
    /// Position of `events` in the document events.
    pub range: Range<usize>,
    pub events: &'a [(usize, Event<'a>)],
    pub list_depth: usize,
    pub quote_depth: usize,
    /// Comment for translators, from a `mdpo-translator` directive.
    pub comment: Option<String>,
}

/// Segments a document given as line-numbered events.
///
/// The segmenter itself holds no iteration state: every call to
/// [`Segmenter::units`] starts a fresh pass over the document.
///
/// ```
/// use mdpo::{extract_events, Segmenter, UnitKind};
///
/// let events = extract_events("# Title\n\n- First\n- Second\n");
/// let segmenter = Segmenter::new(&events);
/// let kinds = segmenter.units().map(|unit| unit.kind).collect::<Vec<_>>();
/// assert_eq!(kinds.len(), 3);
/// assert_eq!(kinds[1], UnitKind::ListItem);
/// ```
#[derive(Debug, Copy, Clone)]
pub struct Segmenter<'a> {
    events: &'a [(usize, Event<'a>)],
}

impl<'a> Segmenter<'a> {
    pub fn new(events: &'a [(usize, Event<'a>)]) -> Self {
        Self { events }
    }

    pub fn units(&self) -> Units<'a> {
        Units {
            events: self.events,
            idx: 0,
            containers: Vec::new(),
            table_row: 0,
            table_column: 0,
            skip_next: SkipNext::Inactive,
            disabled: false,
            comment: None,
        }
    }
}

impl<'a> IntoIterator for &Segmenter<'a> {
    type Item = Unit<'a>;
    type IntoIter = Units<'a>;

    fn into_iter(self) -> Units<'a> {
        self.units()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Container {
    Paragraph,
    Heading(HeadingLevel),
    BlockQuote,
    CodeBlock,
    List,
    Item,
    FootnoteDefinition,
    Table,
    TableHead,
    TableRow,
    TableCell { row: usize, column: usize },
}

/// How far a `mdpo-disable-next-line` directive reaches.
#[derive(Debug, Copy, Clone, PartialEq)]
enum SkipNext {
    Inactive,
    /// Waiting for the first unit after the directive.
    Pending,
    /// Skipping units on `lineno` and, while `depth` is set, units
    /// inside the block which was open at that depth.
    Active { lineno: usize, depth: Option<usize> },
}

/// Extraction directives given as HTML comments.
#[derive(Debug, Clone, PartialEq)]
enum Directive {
    DisableNextLine,
    Disable,
    Enable,
    Translator(String),
}

fn parse_directive(html: &str) -> Option<Directive> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"(?s)^<!-{2,}\s*mdpo-(disable-next-line|disable|enable|translator)\b\s*(.*?)\s*-{2,}>$",
        )
        .expect("well-formed regex")
    });
    let captures = re.captures(html.trim())?;
    match &captures[1] {
        "disable-next-line" => Some(Directive::DisableNextLine),
        "disable" => Some(Directive::Disable),
        "enable" => Some(Directive::Enable),
        _ => Some(Directive::Translator(String::from(&captures[2]))),
    }
}

/// Inline events are the content of units.
fn is_inline(event: &Event) -> bool {
    matches!(
        event,
        Event::Start(
            Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link(..) | Tag::Image(..),
        ) | Event::End(
            Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link(..) | Tag::Image(..),
        ) | Event::Text(_)
            | Event::Code(_)
            | Event::FootnoteReference(_)
            | Event::SoftBreak
            | Event::HardBreak
    )
}

/// Iterator over the units of a document, see [`Segmenter::units`].
#[derive(Debug, Clone)]
pub struct Units<'a> {
    events: &'a [(usize, Event<'a>)],
    idx: usize,
    containers: Vec<Container>,
    table_row: usize,
    table_column: usize,
    skip_next: SkipNext,
    disabled: bool,
    comment: Option<String>,
}

impl<'a> Units<'a> {
    fn in_code_block(&self) -> bool {
        self.containers.last() == Some(&Container::CodeBlock)
    }

    fn kind(&self) -> UnitKind {
        for container in self.containers.iter().rev() {
            match *container {
                Container::Heading(level) => return UnitKind::Heading(level),
                Container::Item => return UnitKind::ListItem,
                Container::BlockQuote => return UnitKind::BlockQuote,
                Container::FootnoteDefinition => return UnitKind::FootnoteDefinition,
                Container::TableCell { row, column } => {
                    return UnitKind::TableCell {
                        row,
                        column,
                        header: row == 0,
                    }
                }
                _ => {}
            }
        }
        UnitKind::Paragraph
    }

    fn depth(&self, container: Container) -> usize {
        self.containers.iter().filter(|&&c| c == container).count()
    }

    /// True if the unit starting on `lineno` is covered by a
    /// `mdpo-disable-next-line` directive.
    fn skips(&mut self, lineno: usize) -> bool {
        match self.skip_next {
            SkipNext::Inactive => false,
            SkipNext::Pending => {
                self.skip_next = SkipNext::Active {
                    lineno,
                    depth: Some(self.containers.len()),
                };
                true
            }
            SkipNext::Active {
                lineno: line,
                depth,
            } if line == lineno || depth.is_some() => true,
            SkipNext::Active { .. } => {
                self.skip_next = SkipNext::Inactive;
                false
            }
        }
    }

    /// Track the structure around the units.
    fn observe(&mut self, lineno: usize, event: &Event) {
        match event {
            Event::Start(tag) => {
                let container = match tag {
                    Tag::Paragraph => Container::Paragraph,
                    Tag::Heading(level, ..) => Container::Heading(*level),
                    Tag::BlockQuote => Container::BlockQuote,
                    Tag::CodeBlock(_) => Container::CodeBlock,
                    Tag::List(_) => Container::List,
                    Tag::Item => Container::Item,
                    Tag::FootnoteDefinition(_) => Container::FootnoteDefinition,
                    Tag::Table(_) => {
                        self.table_row = 0;
                        Container::Table
                    }
                    Tag::TableHead => {
                        self.table_column = 0;
                        Container::TableHead
                    }
                    Tag::TableRow => {
                        self.table_row += 1;
                        self.table_column = 0;
                        Container::TableRow
                    }
                    Tag::TableCell => Container::TableCell {
                        row: self.table_row,
                        column: self.table_column,
                    },
                    // Inline tags never get here.
                    _ => return,
                };
                self.containers.push(container);
            }
            Event::End(tag) => {
                if self.containers.pop().is_none() {
                    warn!("Line {lineno}: unbalanced end of {tag:?}, ignoring it");
                }
                if let SkipNext::Active { depth, .. } = &mut self.skip_next {
                    if depth.is_some_and(|block| self.containers.len() < block) {
                        *depth = None;
                    }
                }
                if matches!(tag, Tag::TableCell) {
                    self.table_column += 1;
                }
            }
            Event::Html(html) => match parse_directive(html) {
                Some(Directive::DisableNextLine) => self.skip_next = SkipNext::Pending,
                Some(Directive::Disable) => self.disabled = true,
                Some(Directive::Enable) => self.disabled = false,
                Some(Directive::Translator(comment)) => self.comment = Some(comment),
                None => {}
            },
            _ => {}
        }
    }
}

impl<'a> Iterator for Units<'a> {
    type Item = Unit<'a>;

    fn next(&mut self) -> Option<Unit<'a>> {
        let events = self.events;
        while let Some((lineno, event)) = events.get(self.idx) {
            if !is_inline(event) || self.in_code_block() {
                self.observe(*lineno, event);
                self.idx += 1;
                continue;
            }

            let start = self.idx;
            let len = events[start..]
                .iter()
                .take_while(|(_, event)| is_inline(event))
                .count();
            self.idx = start + len;

            if self.disabled {
                debug!("Line {lineno}: skipping unit in disabled region");
                self.comment = None;
                continue;
            }
            if self.skips(*lineno) {
                debug!("Line {lineno}: skipping unit after mdpo-disable-next-line");
                self.comment = None;
                continue;
            }

            return Some(Unit {
                kind: self.kind(),
                lineno: *lineno,
                range: start..self.idx,
                events: &events[start..self.idx],
                list_depth: self.depth(Container::List),
                quote_depth: self.depth(Container::BlockQuote),
                comment: self.comment.take(),
            });
        }
        None
    }
}

impl FusedIterator for Units<'_> {}
