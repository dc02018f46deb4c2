#![no_main]

use installed_apps::config::ListerConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the config parser
    if let Ok(s) = std::str::from_utf8(data) {
        let _result: Result<ListerConfig, _> = serde_json::from_str(s);
    }
});
