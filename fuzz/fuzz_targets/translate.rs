#![no_main]

use libfuzzer_sys::fuzz_target;
use mdpo::{extract_messages, translate_markdown, translate_markdown_to_html, Configuration};
use mdpo_fuzz::create_catalog;

fuzz_target!(|inputs: (&str, Vec<(&str, &str)>)| {
    let (document, translations) = inputs;
    let catalog = create_catalog(translations);
    let config = Configuration::default();

    let _ = extract_messages(document, &config);
    let _ = translate_markdown(document, &catalog, &config);
    let _ = translate_markdown_to_html(document, &catalog, &config);
});
