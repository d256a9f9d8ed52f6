#![no_main]
use libfuzzer_sys::fuzz_target;

use rest_h1::{HttpHeaders, MediaType};

fuzz_target!(|data: &[u8]| {
    let text = match std::str::from_utf8(data) {
        Ok(v) => v,
        Err(_) => return,
    };

    if let Ok(m) = MediaType::parse(text) {
        let again = MediaType::parse(&m.to_string()).expect("reparse of display");
        assert_eq!(m, again);

        let _ = m.charset();
        let _ = m.quality_value();
        assert!(m.includes(&m));
        assert!(m.is_compatible_with(&m));
    }

    if let Ok(mut list) = MediaType::parse_list(text) {
        let len = list.len();
        MediaType::sort_by_specificity(&mut list);
        MediaType::sort_by_quality_value(&mut list);
        assert_eq!(list.len(), len);
    }

    let mut headers = HttpHeaders::new();
    headers.add("Accept", text);
    headers.add("Content-Type", text);
    let _ = headers.accept();
    let _ = headers.content_type();
    let _ = headers.multi_values("Accept");
});
