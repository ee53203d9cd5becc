use mdpo::{Catalog, Entry};

/// Generate a random Catalog for fuzzing.
pub fn create_catalog(translations: Vec<(&str, &str)>) -> Catalog {
    translations
        .into_iter()
        .enumerate()
        .map(|(idx, (msgid, msgstr))| Entry {
            msgstr: String::from(msgstr),
            occurrences: vec![format!("foo.md:{idx}")],
            ..Entry::new(msgid)
        })
        .collect()
}
