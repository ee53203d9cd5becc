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

//! Extracting messages from Markdown documents.

use log::{debug, info};

use crate::catalog::{Catalog, Entry};
use crate::config::Configuration;
use crate::extract_events;
use crate::input::Source;
use crate::render::render_key;
use crate::segment::Segmenter;
use crate::sync::synchronize;

/// Extract the messages of `document` together with their line
/// numbers.
///
/// Messages are returned in document order. A message which appears
/// several times is returned every time.
///
/// # Examples
///
/// ```
/// use mdpo::{extract_messages, Configuration};
///
/// assert_eq!(
///     extract_messages("# Intro\n\n- One\n- *Two*\n", &Configuration::default()),
///     vec![
///         (1, String::from("Intro")),
///         (3, String::from("One")),
///         (4, String::from("*Two*")),
///     ]
/// );
/// ```
pub fn extract_messages(document: &str, config: &Configuration) -> Vec<(usize, String)> {
    let events = extract_events(document);
    Segmenter::new(&events)
        .units()
        .filter_map(|unit| Some((unit.lineno, render_key(unit.events, config)?)))
        .collect()
}

/// Collects the messages of several documents into one catalog.
#[derive(Debug)]
pub struct Extractor<'c> {
    config: &'c Configuration,
    messages: Catalog,
}

impl<'c> Extractor<'c> {
    pub fn new(config: &'c Configuration) -> Extractor<'c> {
        Extractor {
            config,
            messages: Catalog::default(),
        }
    }

    /// Extract the messages of `document`.
    ///
    /// Occurrences are written as `label:line`. Documents without a
    /// label produce messages without occurrences.
    pub fn add_document(&mut self, label: Option<&str>, document: &str) {
        let events = extract_events(document);
        let mut count = 0;
        for unit in Segmenter::new(&events).units() {
            let Some(msgid) = render_key(unit.events, self.config) else {
                continue;
            };
            count += 1;
            let entry = Entry {
                occurrences: label
                    .map(|label| format!("{label}:{}", unit.lineno))
                    .into_iter()
                    .collect(),
                extracted_comments: unit.comment.into_iter().collect(),
                ..Entry::new(msgid)
            };
            if let Some(existing) = self.messages.get_mut(&entry.msgid) {
                // The same message found again: remember where.
                for comment in entry.extracted_comments {
                    if !existing.extracted_comments.contains(&comment) {
                        existing.extracted_comments.push(comment);
                    }
                }
                existing.occurrences.extend(entry.occurrences);
                continue;
            }
            self.messages.insert(entry);
        }
        debug!(
            "Extracted {count} messages from {}",
            label.unwrap_or("<content>")
        );
    }

    /// Add a [`Source`] document.
    pub fn add_source(&mut self, source: &Source) {
        self.add_document(source.label.as_deref(), &source.text);
    }

    /// Merge the extracted messages into `existing`.
    ///
    /// See [`synchronize`] for how existing entries are treated.
    pub fn finish(self, existing: Option<Catalog>) -> Catalog {
        info!("Extracted {} distinct messages", self.messages.len());
        synchronize(self.messages, existing, self.config)
    }
}

/// Extract the messages of `sources` and merge them into `existing`.
///
/// Running this again on the same documents with the result as
/// `existing` gives the same catalog.
pub fn markdown_to_catalog(
    sources: &[Source],
    existing: Option<Catalog>,
    config: &Configuration,
) -> Catalog {
    let mut extractor = Extractor::new(config);
    for source in sources {
        extractor.add_source(source);
    }
    extractor.finish(existing)
}
