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

//! Translation catalogs.
//!
//! A [`Catalog`] is an ordered collection of [`Entry`] values keyed by
//! their `msgid`, plus the header found at the top of a PO file. See
//! [`crate::po`] for the file format.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info, warn};

use crate::config::DEFAULT_WRAPWIDTH;
use crate::error::{Error, Result};
use crate::po;

/// A single message in a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub msgctxt: Option<String>,
    pub msgid: String,
    /// The translation. Empty when untranslated.
    pub msgstr: String,
    /// Set for entries which are no longer found in the document.
    pub obsolete: bool,
    /// Source locations, typically `path:line`.
    pub occurrences: Vec<String>,
    /// Comments written by translators (`# ...`).
    pub comments: Vec<String>,
    /// Comments extracted from the document (`#. ...`).
    pub extracted_comments: Vec<String>,
    pub flags: Vec<String>,
}

impl Entry {
    pub fn new(msgid: impl Into<String>) -> Entry {
        Entry {
            msgid: msgid.into(),
            ..Entry::default()
        }
    }

    pub fn is_translated(&self) -> bool {
        !self.msgstr.is_empty()
    }

    pub fn is_fuzzy(&self) -> bool {
        self.flags.iter().any(|flag| flag == "fuzzy")
    }

    /// True if the translation can be used: the entry is translated,
    /// not fuzzy and not obsolete.
    pub fn is_usable(&self) -> bool {
        self.is_translated() && !self.is_fuzzy() && !self.obsolete
    }
}

/// The header entry of a catalog: `Name: value` fields in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub comments: Vec<String>,
    /// Flags of the header entry, e.g. `fuzzy` in a new translation.
    pub flags: Vec<String>,
    pub(crate) fields: Vec<(String, String)>,
}

impl Default for Header {
    fn default() -> Self {
        let mut header = Header::empty();
        header.set("MIME-Version", "1.0");
        header.set("Content-Type", "text/plain; charset=UTF-8");
        header.set("Content-Transfer-Encoding", "8bit");
        header
    }
}

impl Header {
    /// A header without any fields.
    pub fn empty() -> Header {
        Header {
            comments: Vec::new(),
            flags: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a field, replacing an existing field with the same name.
    pub fn set(&mut self, name: &str, value: &str) {
        match self
            .fields
            .iter_mut()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
        {
            Some((_, old)) => *old = String::from(value),
            None => self.fields.push((String::from(name), String::from(value))),
        }
    }

    /// The charset from the `Content-Type` field.
    pub fn charset(&self) -> Option<&str> {
        self.get("Content-Type")?
            .split(';')
            .find_map(|part| part.trim().strip_prefix("charset="))
    }

    /// Render the fields as the `msgstr` of the header entry.
    pub(crate) fn to_msgstr(&self) -> String {
        self.fields
            .iter()
            .map(|(name, value)| format!("{name}: {value}\n"))
            .collect()
    }

    /// Parse the `msgstr` of a header entry.
    pub(crate) fn from_msgstr(msgstr: &str) -> Header {
        let fields = msgstr
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (String::from(name.trim()), String::from(value.trim())))
            .collect();
        Header {
            fields,
            ..Header::empty()
        }
    }
}

/// An ordered collection of entries with unique `msgid` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub header: Header,
    /// Width used when writing the catalog. Zero disables wrapping.
    pub wrapwidth: usize,
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::new(Header::default())
    }
}

impl Catalog {
    pub fn new(header: Header) -> Catalog {
        Catalog {
            header,
            wrapwidth: DEFAULT_WRAPWIDTH,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn get(&self, msgid: &str) -> Option<&Entry> {
        self.index.get(msgid).map(|&idx| &self.entries[idx])
    }

    pub fn get_mut(&mut self, msgid: &str) -> Option<&mut Entry> {
        self.index.get(msgid).map(|&idx| &mut self.entries[idx])
    }

    /// Add `entry` to the catalog.
    ///
    /// If an entry with the same `msgid` exists, the first entry wins:
    /// only the new occurrences are appended to it. An active entry
    /// replaces an obsolete one though. Returns `false` in both cases.
    pub fn insert(&mut self, entry: Entry) -> bool {
        match self.index.get(&entry.msgid) {
            Some(&idx) => {
                let existing = &mut self.entries[idx];
                if existing.obsolete && !entry.obsolete {
                    debug!(
                        "Active message {:?} replaces an obsolete duplicate",
                        entry.msgid
                    );
                    *existing = entry;
                    return false;
                }
                if existing.msgstr != entry.msgstr || existing.obsolete != entry.obsolete {
                    warn!(
                        "Duplicate message {:?}, keeping the first translation",
                        entry.msgid
                    );
                }
                for occurrence in entry.occurrences {
                    if !existing.occurrences.contains(&occurrence) {
                        existing.occurrences.push(occurrence);
                    }
                }
                false
            }
            None => {
                self.index.insert(entry.msgid.clone(), self.entries.len());
                self.entries.push(entry);
                true
            }
        }
    }

    /// Find the translation of `msgid`.
    ///
    /// Obsolete, fuzzy and untranslated entries have no translation.
    pub fn translation(&self, msgid: &str) -> Option<&str> {
        self.get(msgid)
            .filter(|entry| entry.is_usable())
            .map(|entry| entry.msgstr.as_str())
    }

    /// Set the translation of an existing entry. Returns `false` if
    /// there is no entry for `msgid`.
    pub fn set_translation(&mut self, msgid: &str, msgstr: &str) -> bool {
        match self.get_mut(msgid) {
            Some(entry) => {
                entry.msgstr = String::from(msgstr);
                true
            }
            None => false,
        }
    }

    /// Split the catalog into its header and entries.
    pub fn into_parts(self) -> (Header, Vec<Entry>) {
        (self.header, self.entries)
    }

    /// Read a catalog from a PO file.
    pub fn load(path: &Path) -> Result<Catalog> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog: Catalog = text.parse()?;
        match catalog.header.charset() {
            Some(charset)
                if !charset.eq_ignore_ascii_case("UTF-8") && !charset.eq_ignore_ascii_case("UTF8") =>
            {
                warn!(
                    "{} declares charset {charset}, reading it as UTF-8",
                    path.display()
                );
            }
            _ => {}
        }
        Ok(catalog)
    }

    /// Read the translations of several PO files into one catalog.
    ///
    /// Only usable translations are kept. When a message is translated
    /// in several files, the earliest file wins. The header comes from
    /// the first file.
    pub fn load_all(paths: &[PathBuf]) -> Result<Catalog> {
        let mut merged: Option<Catalog> = None;
        for path in paths {
            let (header, entries) = Catalog::load(path)?.into_parts();
            let merged = merged.get_or_insert_with(|| Catalog::new(header));
            let before = merged.len();
            for entry in entries.into_iter().filter(Entry::is_usable) {
                merged.insert(entry);
            }
            info!(
                "Loaded {} translations from {}",
                merged.len() - before,
                path.display()
            );
        }
        Ok(merged.unwrap_or_default())
    }

    /// Write the catalog to a PO file.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_string()).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved {} messages to {}", self.len(), path.display());
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Entry> for Catalog {
    fn from_iter<I: IntoIterator<Item = Entry>>(entries: I) -> Catalog {
        let mut catalog = Catalog::default();
        for entry in entries {
            catalog.insert(entry);
        }
        catalog
    }
}

impl FromStr for Catalog {
    type Err = Error;

    fn from_str(text: &str) -> Result<Catalog> {
        po::parse(text)
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&po::write(self))
    }
}
