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

//! Reading and writing Gettext PO files.
//!
//! The supported subset is what the tools here produce plus what
//! translators and `msgmerge` typically add: translator comments,
//! extracted comments, references, flags, `msgctxt` and obsolete
//! `#~` entries. Plural forms are rejected.
//!
//! Strings are wrapped the way `msgcat` wraps them: a string which
//! does not fit on the keyword line, or which contains a newline
//! before its end, is written as `""` followed by one line per
//! chunk. Chunks are split after each `\n` and then at spaces.

use textwrap::core::Word;
use textwrap::wrap_algorithms::wrap_first_fit;
use textwrap::WordSeparator;

use crate::catalog::{Catalog, Entry, Header};
use crate::error::{Error, Result};

fn parse_error(line: usize, reason: impl Into<String>) -> Error {
    Error::CatalogParse {
        line,
        reason: reason.into(),
    }
}

/// Escape `text` for use inside a PO string literal.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str(r"\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str(r"\n"),
            '\r' => escaped.push_str(r"\r"),
            '\t' => escaped.push_str(r"\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Undo [`escape`].
pub fn unescape(text: &str) -> std::result::Result<String, String> {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('t') => unescaped.push('\t'),
            Some('a') => unescaped.push('\x07'),
            Some('b') => unescaped.push('\x08'),
            Some('f') => unescaped.push('\x0c'),
            Some('v') => unescaped.push('\x0b'),
            Some(c @ ('\\' | '"' | '\'' | '?')) => unescaped.push(c),
            Some(c) => return Err(format!("unknown escape sequence \\{c}")),
            None => return Err(String::from("string ends with a backslash")),
        }
    }
    Ok(unescaped)
}

/// Parse a quoted string literal such as `"foo \"bar\""`.
fn parse_quoted(lineno: usize, text: &str) -> Result<String> {
    let text = text.trim();
    let inner = text
        .strip_prefix('"')
        .and_then(|text| text.strip_suffix('"'))
        .filter(|_| text.len() >= 2)
        .ok_or_else(|| parse_error(lineno, format!("expected a quoted string, got {text:?}")))?;
    unescape(inner).map_err(|reason| parse_error(lineno, reason))
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Field {
    Msgctxt,
    Msgid,
    Msgstr,
}

/// An entry being parsed.
#[derive(Debug, Default)]
struct Pending {
    entry: Entry,
    msgctxt: Option<String>,
    field: Option<Field>,
    has_msgid: bool,
    has_msgstr: bool,
    /// Line of the `msgid` keyword.
    lineno: usize,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.field.is_none()
            && self.entry.comments.is_empty()
            && self.entry.extracted_comments.is_empty()
            && self.entry.occurrences.is_empty()
            && self.entry.flags.is_empty()
    }

    fn push_str(&mut self, text: &str) {
        match self.field {
            Some(Field::Msgctxt) => self.msgctxt.get_or_insert_with(String::new).push_str(text),
            Some(Field::Msgid) => self.entry.msgid.push_str(text),
            Some(Field::Msgstr) => self.entry.msgstr.push_str(text),
            None => {}
        }
    }
}

/// Parser state across entries.
#[derive(Debug, Default)]
struct Parser {
    header: Option<Header>,
    entries: Vec<Entry>,
    pending: Pending,
}

impl Parser {
    /// Move the pending entry into the catalog.
    fn finish_entry(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        if !pending.has_msgid {
            // Comments without an entry, e.g. at the end of a file.
            return Ok(());
        }
        if !pending.has_msgstr {
            return Err(parse_error(
                pending.lineno,
                format!("missing msgstr for {:?}", pending.entry.msgid),
            ));
        }
        let mut entry = pending.entry;
        entry.msgctxt = pending.msgctxt;
        if entry.msgid.is_empty() && entry.msgctxt.is_none() {
            if self.header.is_some() || !self.entries.is_empty() {
                return Err(parse_error(pending.lineno, "unexpected entry with empty msgid"));
            }
            self.header = Some(Header {
                comments: entry.comments,
                flags: entry.flags,
                ..Header::from_msgstr(&entry.msgstr)
            });
        } else {
            self.entries.push(entry);
        }
        Ok(())
    }

    /// Handle a comment line such as `#. text`.
    fn comment(&mut self, line: &str) -> Result<()> {
        if self.pending.has_msgstr {
            self.finish_entry()?;
        }
        let entry = &mut self.pending.entry;
        let mut chars = line.chars();
        chars.next();
        let rest = chars.as_str();
        match rest.chars().next() {
            Some('.') => entry
                .extracted_comments
                .push(String::from(rest[1..].trim())),
            Some(':') => entry
                .occurrences
                .extend(rest[1..].split_whitespace().map(String::from)),
            Some(',') => entry.flags.extend(
                rest[1..]
                    .split(',')
                    .map(str::trim)
                    .filter(|flag| !flag.is_empty())
                    .map(String::from),
            ),
            // Previous msgid, as written by msgmerge for fuzzy matches.
            Some('|') => {}
            _ => entry
                .comments
                .push(String::from(rest.strip_prefix(' ').unwrap_or(rest))),
        }
        Ok(())
    }

    /// Handle a keyword line such as `msgid "text"`.
    fn keyword(&mut self, lineno: usize, line: &str, obsolete: bool) -> Result<()> {
        let (keyword, rest) = line
            .split_once(|c: char| c.is_whitespace())
            .unwrap_or((line, ""));
        match keyword {
            "msgctxt" => {
                if self.pending.has_msgstr || self.pending.has_msgid {
                    self.finish_entry()?;
                }
                self.pending.field = Some(Field::Msgctxt);
                self.pending.msgctxt = Some(parse_quoted(lineno, rest)?);
            }
            "msgid" => {
                if self.pending.has_msgstr || self.pending.has_msgid {
                    self.finish_entry()?;
                }
                self.pending.field = Some(Field::Msgid);
                self.pending.has_msgid = true;
                self.pending.lineno = lineno;
                self.pending.entry.obsolete = obsolete;
                self.pending.entry.msgid = parse_quoted(lineno, rest)?;
            }
            "msgstr" => {
                if !self.pending.has_msgid || self.pending.has_msgstr {
                    return Err(parse_error(lineno, "msgstr without msgid"));
                }
                self.pending.field = Some(Field::Msgstr);
                self.pending.has_msgstr = true;
                self.pending.entry.msgstr = parse_quoted(lineno, rest)?;
            }
            "msgid_plural" => {
                return Err(parse_error(lineno, "plural forms are not supported"));
            }
            _ if keyword.starts_with("msgstr[") => {
                return Err(parse_error(lineno, "plural forms are not supported"));
            }
            _ => return Err(parse_error(lineno, format!("unexpected keyword {keyword:?}"))),
        }
        Ok(())
    }

    fn line(&mut self, lineno: usize, line: &str) -> Result<()> {
        let (line, obsolete) = match line.strip_prefix("#~") {
            Some(rest) => (rest.trim(), true),
            None => (line.trim(), false),
        };
        if line.is_empty() {
            if !obsolete && !self.pending.is_empty() {
                self.finish_entry()?;
            }
            return Ok(());
        }
        if line.starts_with('"') {
            if self.pending.field.is_none() {
                return Err(parse_error(lineno, "string without a keyword"));
            }
            let text = parse_quoted(lineno, line)?;
            self.pending.push_str(&text);
            return Ok(());
        }
        if line.starts_with('#') && !obsolete {
            return self.comment(line);
        }
        if line.starts_with('|') && obsolete {
            // Previous msgid of an obsolete entry.
            return Ok(());
        }
        self.keyword(lineno, line, obsolete)
    }

    fn finish(mut self) -> Result<Catalog> {
        self.finish_entry()?;
        let mut catalog = Catalog::new(self.header.unwrap_or_else(Header::empty));
        for entry in self.entries {
            catalog.insert(entry);
        }
        Ok(catalog)
    }
}

/// Parse the content of a PO file.
///
/// ```
/// let catalog = mdpo::po::parse(
///     "msgid \"\"\n\
///      msgstr \"Language: es\\n\"\n\
///      \n\
///      #: a.md:1\n\
///      msgid \"Hello\"\n\
///      msgstr \"Hola\"\n",
/// )
/// .unwrap();
/// assert_eq!(catalog.header.get("Language"), Some("es"));
/// assert_eq!(catalog.translation("Hello"), Some("Hola"));
/// ```
pub fn parse(text: &str) -> Result<Catalog> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut parser = Parser::default();
    for (idx, line) in text.lines().enumerate() {
        parser.line(idx + 1, line)?;
    }
    parser.finish()
}

/// Split an escaped string into chunks of at most `width` columns.
///
/// Chunks end after each `\n` escape and are otherwise split after
/// spaces. Words longer than `width` are kept whole.
fn wrap_chunks(escaped: &str, width: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    for line in escaped.split_inclusive(r"\n") {
        if width == 0 || line.chars().count() <= width {
            chunks.push(String::from(line));
            continue;
        }
        let words = WordSeparator::AsciiSpace
            .find_words(line)
            .collect::<Vec<Word>>();
        for words in wrap_first_fit(&words, &[width as f64]) {
            chunks.push(
                words
                    .iter()
                    .flat_map(|word| [word.word, word.whitespace])
                    .collect(),
            );
        }
    }
    chunks
}

/// Write `keyword "value"` with the given line prefix.
fn write_string(out: &mut String, prefix: &str, keyword: &str, value: &str, width: usize) {
    let escaped = escape(value);
    let single = format!("{prefix}{keyword} \"{escaped}\"");
    let inner_newline = value.trim_end_matches('\n').contains('\n');
    if !inner_newline && (width == 0 || single.chars().count() <= width) {
        out.push_str(&single);
        out.push('\n');
        return;
    }
    out.push_str(&format!("{prefix}{keyword} \"\"\n"));
    // Two columns for the quotes.
    let chunk_width = width.saturating_sub(prefix.chars().count() + 2).max(1);
    let chunk_width = if width == 0 { 0 } else { chunk_width };
    for chunk in wrap_chunks(&escaped, chunk_width) {
        out.push_str(&format!("{prefix}\"{chunk}\"\n"));
    }
}

/// Write a comment such as `#: a.md:1 b.md:2`, wrapped at `width`.
fn write_comment(out: &mut String, marker: &str, text: &str, width: usize) {
    if text.is_empty() {
        out.push_str(marker.trim_end());
        out.push('\n');
        return;
    }
    if width == 0 {
        out.push_str(&format!("{marker}{text}\n"));
        return;
    }
    let options = textwrap::Options::new(width.saturating_sub(marker.len()).max(1))
        .break_words(false)
        .word_separator(WordSeparator::AsciiSpace);
    for line in textwrap::wrap(text, options) {
        out.push_str(&format!("{marker}{line}\n"));
    }
}

fn write_entry(out: &mut String, entry: &Entry, width: usize) {
    for comment in &entry.comments {
        write_comment(out, "# ", comment, 0);
    }
    if !entry.obsolete {
        for comment in &entry.extracted_comments {
            write_comment(out, "#. ", comment, 0);
        }
        if !entry.occurrences.is_empty() {
            write_comment(out, "#: ", &entry.occurrences.join(" "), width);
        }
    }
    if !entry.flags.is_empty() {
        out.push_str(&format!("#, {}\n", entry.flags.join(", ")));
    }
    let prefix = if entry.obsolete { "#~ " } else { "" };
    if let Some(msgctxt) = &entry.msgctxt {
        write_string(out, prefix, "msgctxt", msgctxt, width);
    }
    write_string(out, prefix, "msgid", &entry.msgid, width);
    write_string(out, prefix, "msgstr", &entry.msgstr, width);
}

/// Render a catalog as the content of a PO file.
///
/// The header comes first, then every entry separated by a blank
/// line. Obsolete entries are written with the `#~` prefix.
pub fn write(catalog: &Catalog) -> String {
    let width = catalog.wrapwidth;
    let mut out = String::new();
    for comment in &catalog.header.comments {
        write_comment(&mut out, "# ", comment, 0);
    }
    if !catalog.header.flags.is_empty() {
        out.push_str(&format!("#, {}\n", catalog.header.flags.join(", ")));
    }
    write_string(&mut out, "", "msgid", "", width);
    write_string(&mut out, "", "msgstr", &catalog.header.to_msgstr(), width);
    for entry in catalog {
        out.push('\n');
        write_entry(&mut out, entry, width);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a \"b\"\n\\c\t"), r#"a \"b\"\n\\c\t"#);
        assert_eq!(unescape(r#"a \"b\"\n\\c\t"#).unwrap(), "a \"b\"\n\\c\t");
        assert!(unescape(r"\q").is_err());
        assert!(unescape("a\\").is_err());
    }

    #[test]
    fn test_parse_entries() {
        let catalog = parse(
            "# Translator comment\n\
             #. Extracted comment\n\
             #: a.md:1 a.md:5\n\
             #: b.md:2\n\
             #, fuzzy, markdown-text\n\
             msgid \"Hello\"\n\
             msgstr \"\"\n\
             \"Hola \"\n\
             \"mundo\"\n\
             \n\
             msgctxt \"menu\"\n\
             msgid \"Open\"\n\
             msgstr \"Abrir\"\n",
        )
        .unwrap();
        let entries = catalog.iter().collect::<Vec<_>>();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            &Entry {
                msgctxt: None,
                msgid: String::from("Hello"),
                msgstr: String::from("Hola mundo"),
                obsolete: false,
                occurrences: vec![
                    String::from("a.md:1"),
                    String::from("a.md:5"),
                    String::from("b.md:2"),
                ],
                comments: vec![String::from("Translator comment")],
                extracted_comments: vec![String::from("Extracted comment")],
                flags: vec![String::from("fuzzy"), String::from("markdown-text")],
            }
        );
        assert_eq!(entries[1].msgctxt.as_deref(), Some("menu"));
        assert_eq!(catalog.translation("Open"), Some("Abrir"));
    }

    #[test]
    fn test_parse_without_blank_lines() {
        let catalog = parse("msgid \"a\"\nmsgstr \"A\"\nmsgid \"b\"\nmsgstr \"B\"\n").unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.translation("b"), Some("B"));
    }

    #[test]
    fn test_parse_obsolete() {
        let catalog = parse(
            "msgid \"a\"\n\
             msgstr \"A\"\n\
             \n\
             # Kept comment\n\
             #~ msgid \"old\"\n\
             #~ msgstr \"\"\n\
             #~ \"Viejo\"\n",
        )
        .unwrap();
        let old = catalog.get("old").unwrap();
        assert!(old.obsolete);
        assert_eq!(old.msgstr, "Viejo");
        assert_eq!(old.comments, vec![String::from("Kept comment")]);
        assert_eq!(catalog.translation("old"), None);
    }

    #[test]
    fn test_parse_header() {
        let catalog = parse(
            "# SOME TITLE\n\
             msgid \"\"\n\
             msgstr \"\"\n\
             \"Project-Id-Version: demo\\n\"\n\
             \"Language: de\\n\"\n",
        )
        .unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.header.comments, vec![String::from("SOME TITLE")]);
        assert_eq!(catalog.header.get("Project-Id-Version"), Some("demo"));
        assert_eq!(catalog.header.get("Language"), Some("de"));
    }

    #[test]
    fn test_parse_active_entry_after_obsolete_duplicate() {
        let catalog = parse(
            "#~ msgid \"a\"\n\
             #~ msgstr \"b\"\n\
             \n\
             msgid \"a\"\n\
             msgstr \"c\"\n",
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.translation("a"), Some("c"));
        assert_eq!(
            write(&catalog),
            "msgid \"\"\n\
             msgstr \"\"\n\
             \n\
             msgid \"a\"\n\
             msgstr \"c\"\n"
        );
    }

    #[test]
    fn test_header_flags_are_kept() {
        let text = "# Spanish translations\n\
                    #, fuzzy\n\
                    msgid \"\"\n\
                    msgstr \"Language: es\\n\"\n";
        let catalog = parse(text).unwrap();
        assert_eq!(catalog.header.flags, vec![String::from("fuzzy")]);
        assert_eq!(write(&catalog), text);
    }

    #[test]
    fn test_parse_duplicates_keep_first() {
        let catalog = parse(
            "#: a.md:1\nmsgid \"a\"\nmsgstr \"first\"\n\n\
             #: b.md:1\nmsgid \"a\"\nmsgstr \"second\"\n",
        )
        .unwrap();
        let entry = catalog.get("a").unwrap();
        assert_eq!(entry.msgstr, "first");
        assert_eq!(entry.occurrences, vec!["a.md:1", "b.md:1"]);
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("msgid \"a\"\nmsgid_plural \"as\"\nmsgstr[0] \"\"\n", 2),
            ("msgid \"a\"\n\n", 1),
            ("msgstr \"a\"\n", 1),
            ("msgid \"a\nmsgstr \"\"\n", 1),
            ("\"orphan\"\n", 1),
            ("msgid \"a\"\nmsgstr \"b\"\nfoo \"c\"\n", 3),
        ];
        for (text, expected_line) in cases {
            match parse(text) {
                Err(Error::CatalogParse { line, .. }) => {
                    assert_eq!(line, expected_line, "wrong line for {text:?}")
                }
                other => panic!("expected a parse error for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_write() {
        let mut catalog = Catalog::new(Header::empty());
        catalog.header.set("Language", "es");
        catalog.insert(Entry {
            msgstr: String::from("Hola"),
            occurrences: vec![String::from("a.md:1")],
            extracted_comments: vec![String::from("Greeting")],
            ..Entry::new("Hello")
        });
        catalog.insert(Entry {
            msgstr: String::from("Viejo"),
            obsolete: true,
            occurrences: vec![String::from("a.md:9")],
            ..Entry::new("Old")
        });
        assert_eq!(
            write(&catalog),
            "msgid \"\"\n\
             msgstr \"Language: es\\n\"\n\
             \n\
             #. Greeting\n\
             #: a.md:1\n\
             msgid \"Hello\"\n\
             msgstr \"Hola\"\n\
             \n\
             #~ msgid \"Old\"\n\
             #~ msgstr \"Viejo\"\n"
        );
    }

    #[test]
    fn test_write_wraps_long_strings() {
        let mut catalog = Catalog::new(Header::empty());
        catalog.wrapwidth = 30;
        catalog.insert(Entry::new("The quick brown fox jumps over the lazy dog."));
        assert_eq!(
            write(&catalog),
            "msgid \"\"\n\
             msgstr \"\"\n\
             \n\
             msgid \"\"\n\
             \"The quick brown fox jumps \"\n\
             \"over the lazy dog.\"\n\
             msgstr \"\"\n"
        );
    }

    #[test]
    fn test_write_without_wrapping() {
        let msgid = "word ".repeat(40);
        let mut catalog = Catalog::new(Header::empty());
        catalog.wrapwidth = 0;
        catalog.insert(Entry::new(msgid.trim()));
        let text = write(&catalog);
        assert!(text.contains(&format!("msgid \"{}\"\n", msgid.trim())));
    }

    #[test]
    fn test_write_splits_at_newlines() {
        let mut catalog = Catalog::new(Header::empty());
        catalog.insert(Entry::new("Line one\nLine two"));
        assert!(write(&catalog).contains("msgid \"\"\n\"Line one\\n\"\n\"Line two\"\n"));
    }

    #[test]
    fn test_write_then_parse() {
        let mut catalog = Catalog::default();
        catalog.wrapwidth = 20;
        catalog.insert(Entry {
            msgstr: String::from("Una frase bastante larga con \"comillas\"."),
            comments: vec![String::from("Checked")],
            flags: vec![String::from("fuzzy")],
            occurrences: vec![String::from("docs/a.md:12"), String::from("docs/b.md:3")],
            ..Entry::new("A rather long sentence with \"quotes\".")
        });
        catalog.insert(Entry {
            obsolete: true,
            comments: vec![String::from("Gone")],
            ..Entry::new("Removed\nmessage")
        });

        let mut parsed = parse(&write(&catalog)).unwrap();
        parsed.wrapwidth = 20;
        assert_eq!(parsed, catalog);
    }
}
