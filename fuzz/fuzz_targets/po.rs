#![no_main]

use libfuzzer_sys::fuzz_target;
use mdpo::Catalog;
use pretty_assertions::assert_eq;

fuzz_target!(|text: &str| {
    // Err(_) can happen and it's fine.
    let Ok(catalog) = text.parse::<Catalog>() else {
        return;
    };
    let written = catalog.to_string();
    let reparsed = written
        .parse::<Catalog>()
        .expect("a written catalog can be parsed again");
    assert_eq!(reparsed.len(), catalog.len());
    assert_eq!(reparsed.to_string(), written);
});
