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

//! Rendering translated documents as HTML.

use pulldown_cmark::html;

use crate::catalog::Catalog;
use crate::config::Configuration;
use crate::extract_events;
use crate::translate::translate_events;

/// Translate `document` using `catalog` and render it as HTML.
///
/// ```
/// use mdpo::{translate_markdown_to_html, Catalog, Configuration, Entry};
///
/// let catalog: Catalog = [Entry { msgstr: String::from("Hallo"), ..Entry::new("Hello") }]
///     .into_iter()
///     .collect();
/// assert_eq!(
///     translate_markdown_to_html("# Hello\n", &catalog, &Configuration::default()),
///     "<h1>Hallo</h1>\n",
/// );
/// ```
pub fn translate_markdown_to_html(
    document: &str,
    catalog: &Catalog,
    config: &Configuration,
) -> String {
    let events = extract_events(document);
    let translated_events = translate_events(&events, catalog, config);
    let mut output = String::new();
    html::push_html(
        &mut output,
        translated_events.into_iter().map(|(_, event)| event),
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Entry;
    use pretty_assertions::assert_eq;

    fn create_catalog(translations: &[(&str, &str)]) -> Catalog {
        translations
            .iter()
            .map(|(msgid, msgstr)| Entry {
                msgstr: String::from(*msgstr),
                ..Entry::new(*msgid)
            })
            .collect()
    }

    #[test]
    fn test_html_empty() {
        assert_eq!(
            translate_markdown_to_html("", &Catalog::default(), &Configuration::default()),
            ""
        );
    }

    #[test]
    fn test_html_paragraphs() {
        let catalog = create_catalog(&[("Hello *world*", "Hola *mundo*")]);
        assert_eq!(
            translate_markdown_to_html(
                "Hello *world*\n\nUntranslated\n",
                &catalog,
                &Configuration::default()
            ),
            "<p>Hola <em>mundo</em></p>\n<p>Untranslated</p>\n"
        );
    }

    #[test]
    fn test_html_list_and_code() {
        let catalog = create_catalog(&[("Item", "Elemento")]);
        assert_eq!(
            translate_markdown_to_html(
                "- Item\n\n```\nx < y\n```\n",
                &catalog,
                &Configuration::default()
            ),
            "<ul>\n<li>Elemento</li>\n</ul>\n<pre><code>x &lt; y\n</code></pre>\n"
        );
    }

    #[test]
    fn test_html_escapes_translations() {
        let catalog = create_catalog(&[("Less", "Menos <que> & más")]);
        let html = translate_markdown_to_html("Less\n", &catalog, &Configuration::default());
        assert!(html.contains("&amp;"), "{html}");
    }
}
