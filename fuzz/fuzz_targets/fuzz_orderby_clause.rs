#![no_main]

use libfuzzer_sys::fuzz_target;
use odata_paging::orderby::split_clauses;
use odata_paging::path::split_path;

fuzz_target!(|data: &[u8]| {
    // Limit input size to avoid OOM on pathological inputs
    if data.len() > 1024 {
        return;
    }
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(clauses) = split_clauses(s) {
            for (raw_path, _) in clauses {
                let _ = split_path(raw_path);
            }
        }
    }
});
