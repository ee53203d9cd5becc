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

//! Delimiters used for inline spans in extracted messages.

/// Delimiter strings written around inline spans when messages keep
/// their Markdown markup.
///
/// The lexicon only affects how messages are written. Input documents
/// are always parsed as standard Markdown, so setting `bold` to `__`
/// changes the message `**foo**` into `__foo__` but does not change
/// which text is recognized as strong emphasis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupLexicon {
    pub bold: String,
    pub italic: String,
    pub code: String,
    pub link_start: String,
    pub link_end: String,
}

impl Default for MarkupLexicon {
    fn default() -> Self {
        Self {
            bold: String::from("**"),
            italic: String::from("*"),
            code: String::from("`"),
            link_start: String::from("["),
            link_end: String::from("]"),
        }
    }
}

impl MarkupLexicon {
    /// Iterate over `(option name, delimiter)` pairs.
    pub(crate) fn delimiters(&self) -> [(&'static str, &str); 5] {
        [
            ("bold_string", self.bold.as_str()),
            ("italic_string", self.italic.as_str()),
            ("code_string", self.code.as_str()),
            ("link_start_string", self.link_start.as_str()),
            ("link_end_string", self.link_end.as_str()),
        ]
    }
}
