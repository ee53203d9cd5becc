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

//! Options and the validated configuration derived from them.
//!
//! [`Options`] is the loose option bag accepted from the command line
//! or from a JSON file. It is turned into a [`Configuration`] with
//! [`Configuration::try_from`], which rejects invalid values before
//! any document is processed.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::lexicon::MarkupLexicon;

/// Wrap width used by `xgettext` and `msgmerge` when none is given.
pub const DEFAULT_WRAPWIDTH: usize = 78;

/// Options as given by the user.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Files to skip when the input is a glob.
    pub ignore: Vec<PathBuf>,
    /// Write the merged catalog back to the catalog path.
    pub save: bool,
    /// Strip Markdown markup from extracted messages.
    pub plaintext: bool,
    #[serde(alias = "mark-not-found-as-obsolete")]
    pub mark_not_found_as_obsolete: bool,
    /// Substitutions applied to every message, in order.
    #[serde(alias = "replacement-chars")]
    pub replacement_chars: Map<String, Value>,
    #[serde(alias = "forbidden-msgids")]
    pub forbidden_msgids: Vec<String>,
    /// Zero disables wrapping.
    pub wrapwidth: Option<usize>,
    #[serde(alias = "bold-string")]
    pub bold_string: Option<String>,
    #[serde(alias = "italic-string")]
    pub italic_string: Option<String>,
    #[serde(alias = "code-string")]
    pub code_string: Option<String>,
    #[serde(alias = "link-start-string")]
    pub link_start_string: Option<String>,
    #[serde(alias = "link-end-string")]
    pub link_end_string: Option<String>,
}

impl Options {
    /// Read options from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Options> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|err| {
            Error::InvalidConfiguration(format!("{}: {err}", path.display()))
        })
    }

    /// Parse a JSON object such as `{"é": "e", "ß": "ss"}` into a
    /// replacement map. Key order is kept.
    pub fn parse_replacement_chars(json: &str) -> Result<Map<String, Value>> {
        serde_json::from_str(json).map_err(|err| {
            Error::InvalidConfiguration(format!("replacement_chars must be a JSON object: {err}"))
        })
    }
}

/// Immutable, validated configuration shared by the segmenter, the
/// key renderer and the catalog synchronizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    lexicon: MarkupLexicon,
    plaintext: bool,
    forbidden_msgids: BTreeSet<String>,
    replacements: Vec<(String, String)>,
    wrapwidth: usize,
    mark_not_found_as_obsolete: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            lexicon: MarkupLexicon::default(),
            plaintext: false,
            forbidden_msgids: BTreeSet::new(),
            replacements: Vec::new(),
            wrapwidth: DEFAULT_WRAPWIDTH,
            mark_not_found_as_obsolete: false,
        }
    }
}

impl TryFrom<&Options> for Configuration {
    type Error = Error;

    fn try_from(options: &Options) -> Result<Configuration> {
        let defaults = MarkupLexicon::default();
        let pick = |value: &Option<String>, default: String| value.clone().unwrap_or(default);
        let lexicon = MarkupLexicon {
            bold: pick(&options.bold_string, defaults.bold),
            italic: pick(&options.italic_string, defaults.italic),
            code: pick(&options.code_string, defaults.code),
            link_start: pick(&options.link_start_string, defaults.link_start),
            link_end: pick(&options.link_end_string, defaults.link_end),
        };
        for (name, delimiter) in lexicon.delimiters() {
            if delimiter.contains(['\n', '\r']) {
                return Err(Error::InvalidConfiguration(format!(
                    "{name} cannot contain line breaks: {delimiter:?}"
                )));
            }
        }

        let mut replacements = Vec::with_capacity(options.replacement_chars.len());
        for (old, new) in &options.replacement_chars {
            if old.is_empty() {
                return Err(Error::InvalidConfiguration(String::from(
                    "replacement_chars cannot replace the empty string",
                )));
            }
            let Value::String(new) = new else {
                return Err(Error::InvalidConfiguration(format!(
                    "replacement for {old:?} must be a string, got {new}"
                )));
            };
            replacements.push((old.clone(), new.clone()));
        }

        Ok(Configuration {
            lexicon,
            plaintext: options.plaintext,
            forbidden_msgids: options.forbidden_msgids.iter().cloned().collect(),
            replacements,
            wrapwidth: options.wrapwidth.unwrap_or(DEFAULT_WRAPWIDTH),
            mark_not_found_as_obsolete: options.mark_not_found_as_obsolete,
        })
    }
}

impl Configuration {
    pub fn lexicon(&self) -> &MarkupLexicon {
        &self.lexicon
    }

    /// True if messages are extracted without Markdown markup.
    pub fn plaintext(&self) -> bool {
        self.plaintext
    }

    pub fn is_forbidden(&self, msgid: &str) -> bool {
        self.forbidden_msgids.contains(msgid)
    }

    pub fn replacements(&self) -> &[(String, String)] {
        &self.replacements
    }

    /// Wrap width for serialized catalogs. Zero means no wrapping.
    pub fn wrapwidth(&self) -> usize {
        self.wrapwidth
    }

    pub fn mark_not_found_as_obsolete(&self) -> bool {
        self.mark_not_found_as_obsolete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_configuration() {
        let config = Configuration::try_from(&Options::default()).unwrap();
        assert_eq!(config, Configuration::default());
        assert_eq!(config.lexicon().bold, "**");
        assert_eq!(config.wrapwidth(), 78);
        assert!(!config.plaintext());
    }

    #[test]
    fn test_delimiter_overrides() {
        let options = Options {
            bold_string: Some(String::from("__")),
            link_end_string: Some(String::from(">")),
            ..Options::default()
        };
        let config = Configuration::try_from(&options).unwrap();
        assert_eq!(config.lexicon().bold, "__");
        assert_eq!(config.lexicon().italic, "*");
        assert_eq!(config.lexicon().link_end, ">");
    }

    #[test]
    fn test_delimiter_with_newline() {
        let options = Options {
            italic_string: Some(String::from("_\n")),
            ..Options::default()
        };
        assert!(matches!(
            Configuration::try_from(&options),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_replacement_chars_keep_order() {
        let options = Options {
            replacement_chars: Options::parse_replacement_chars(r#"{"b": "c", "a": "b"}"#)
                .unwrap(),
            ..Options::default()
        };
        let config = Configuration::try_from(&options).unwrap();
        assert_eq!(
            config.replacements(),
            &[
                (String::from("b"), String::from("c")),
                (String::from("a"), String::from("b")),
            ]
        );
    }

    #[test]
    fn test_replacement_chars_invalid() {
        assert!(Options::parse_replacement_chars("[1, 2]").is_err());
        assert!(Options::parse_replacement_chars("{not json").is_err());

        let options = Options {
            replacement_chars: Options::parse_replacement_chars(r#"{"a": 1}"#).unwrap(),
            ..Options::default()
        };
        assert!(Configuration::try_from(&options).is_err());

        let options = Options {
            replacement_chars: Options::parse_replacement_chars(r#"{"": "x"}"#).unwrap(),
            ..Options::default()
        };
        assert!(Configuration::try_from(&options).is_err());
    }

    #[test]
    fn test_forbidden_msgids() {
        let options = Options {
            forbidden_msgids: vec![String::from("TODO")],
            ..Options::default()
        };
        let config = Configuration::try_from(&options).unwrap();
        assert!(config.is_forbidden("TODO"));
        assert!(!config.is_forbidden("todo"));
    }

    #[test]
    fn test_options_from_json_file() -> anyhow::Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("mdpo.json");
        std::fs::write(
            &path,
            r#"{
                "plaintext": true,
                "mark-not-found-as-obsolete": true,
                "wrapwidth": 0,
                "forbidden_msgids": ["TODO"],
                "replacement_chars": {"’": "'"}
            }"#,
        )?;

        let options = Options::from_json_file(&path)?;
        assert!(options.plaintext);
        assert!(options.mark_not_found_as_obsolete);
        assert_eq!(options.wrapwidth, Some(0));
        assert_eq!(options.forbidden_msgids, vec![String::from("TODO")]);

        let config = Configuration::try_from(&options)?;
        assert_eq!(config.wrapwidth(), 0);
        assert_eq!(
            config.replacements(),
            &[(String::from("’"), String::from("'"))]
        );
        Ok(())
    }

    #[test]
    fn test_options_unknown_field() -> anyhow::Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("mdpo.json");
        std::fs::write(&path, r#"{"plain_text": true}"#)?;
        assert!(matches!(
            Options::from_json_file(&path),
            Err(Error::InvalidConfiguration(_))
        ));
        Ok(())
    }
}
