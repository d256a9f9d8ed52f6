#![no_main]
use libfuzzer_sys::fuzz_target;

use rest_h1::http11::try_parse_res;
use rest_h1::HttpHeaders;

fuzz_target!(|data: &[u8]| {
    if let Ok(Some((head, len))) = try_parse_res(data) {
        assert!(len <= data.len());

        let headers = HttpHeaders::from(head.response.headers());
        let _ = headers.content_length();
        let _ = headers.content_type();
        let _ = headers.location();
        let _ = headers.allow();
        let _ = headers.date();
    }
});
