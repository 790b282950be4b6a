#![no_main]

use html_i18n_helpers::language::{negotiate, parse_accept_language, parse_language};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|header: &str| {
    for preference in parse_accept_language(header) {
        assert!(preference.quality > 0.0 && preference.quality <= 1.0);
    }
    let available = vec![parse_language("fr").unwrap(), parse_language("pt-BR").unwrap()];
    assert!(negotiate(header, &available).is_some());
});
