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

//! Merging freshly extracted messages into an existing catalog.

use std::collections::HashMap;

use log::{debug, info};

use crate::catalog::{Catalog, Entry, Header};
use crate::config::Configuration;

/// Merge `extracted` into `existing`.
///
/// The result has the active entries in the order of `extracted`,
/// followed by the obsolete entries in the order of `existing`:
///
/// - Messages found in both keep the translation, translator comments,
///   flags and context from `existing`. Their occurrences and extracted
///   comments come from `extracted`. Obsolete messages which are found
///   again become active.
/// - Messages only found in `extracted` are added untranslated.
/// - Active messages only found in `existing` become obsolete when
///   [`Configuration::mark_not_found_as_obsolete`] is set and are
///   dropped otherwise. Messages which were already obsolete are kept.
///
/// Without an existing catalog, a default header is used.
pub fn synchronize(extracted: Catalog, existing: Option<Catalog>, config: &Configuration) -> Catalog {
    let (header, old_entries) = match existing {
        Some(catalog) => catalog.into_parts(),
        None => (Header::default(), Vec::new()),
    };
    let mut old_entries = old_entries.into_iter().map(Some).collect::<Vec<_>>();
    let old_index = old_entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| Some((entry.as_ref()?.msgid.clone(), idx)))
        .collect::<HashMap<_, _>>();

    let mut catalog = Catalog::new(header);
    catalog.wrapwidth = config.wrapwidth();

    let (mut added, mut kept) = (0, 0);
    for message in extracted.into_parts().1 {
        let old = old_index
            .get(&message.msgid)
            .and_then(|&idx| old_entries[idx].take());
        let entry = match old {
            Some(old) => {
                kept += 1;
                if old.obsolete {
                    debug!("Reviving obsolete message {:?}", old.msgid);
                }
                Entry {
                    obsolete: false,
                    occurrences: message.occurrences,
                    extracted_comments: message.extracted_comments,
                    ..old
                }
            }
            None => {
                added += 1;
                Entry {
                    msgstr: String::new(),
                    obsolete: false,
                    ..message
                }
            }
        };
        catalog.insert(entry);
    }

    let (mut obsoleted, mut dropped) = (0, 0);
    for mut entry in old_entries.into_iter().flatten() {
        if !entry.obsolete {
            if !config.mark_not_found_as_obsolete() {
                debug!("Dropping message {:?}", entry.msgid);
                dropped += 1;
                continue;
            }
            obsoleted += 1;
            entry.obsolete = true;
        }
        entry.occurrences.clear();
        entry.extracted_comments.clear();
        catalog.insert(entry);
    }

    info!(
        "Synchronized catalog: {kept} kept, {added} added, {obsoleted} marked obsolete, \
         {dropped} dropped"
    );
    catalog
}
