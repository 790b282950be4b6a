#![no_main]

use html_i18n_helpers::html::{translate_page, Markers, RewriteOptions};
use html_i18n_helpers::resolve::TranslationPass;
use html_i18n_helpers_fuzz::{create_catalog, Language};
use libfuzzer_sys::fuzz_target;

fuzz_target!(
    |inputs: (Language, Vec<(&str, &str, &str)>, &[u8], bool)| {
        let (language, translations, html, expose_to_js) = inputs;
        let catalog = create_catalog(language, translations);
        let mut pass = TranslationPass::new(&catalog);
        let options = RewriteOptions {
            markers: Markers::default(),
            expose_to_js,
        };
        let _ = translate_page(html, &mut pass, &options); // Err(_) can happen and it's fine.
    }
);
