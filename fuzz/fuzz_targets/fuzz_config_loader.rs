#![no_main]

use fortune_roulette::config::ConfigLoader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        // Only panics matter here
        let _ = ConfigLoader::with_defaults().load_from_str(yaml_str);
    }
});
