#![no_main]

use libfuzzer_sys::fuzz_target;
use odata_paging::skiptoken::parse_literals;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 {
        return;
    }
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_literals(s);
    }
});
