#![no_main]

use fortune_roulette::catalog::{Catalog, SortKey};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(catalog) = Catalog::from_json_str(json) {
        for key in [SortKey::Korean, SortKey::English, SortKey::Popularity] {
            assert_eq!(catalog.sorted(key).len(), catalog.len());
        }
    }
});
