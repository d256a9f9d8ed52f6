use rest_h1::{Error, MediaType};

fn mt(s: &str) -> MediaType {
    s.parse().unwrap()
}

#[test]
fn parse_and_display() -> Result<(), Error> {
    let m = MediaType::parse("Text/HTML; Charset=UTF-8 ; level=1")?;

    assert_eq!(m.type_(), "text");
    assert_eq!(m.subtype(), "html");
    assert_eq!(m.parameter("charset"), Some("UTF-8"));
    assert_eq!(m.charset(), Some(encoding_rs::UTF_8));
    assert_eq!(m.to_string(), "text/html;charset=UTF-8;level=1");

    // parse of display gives an equal value
    assert_eq!(MediaType::parse(&m.to_string())?, m);

    Ok(())
}

#[test]
fn parse_bare_wildcard() -> Result<(), Error> {
    assert_eq!(MediaType::parse("*")?, MediaType::ALL);
    assert!(MediaType::parse("*; q=0.1")?.is_wildcard_type());
    Ok(())
}

#[test]
fn parse_keeps_quoted_values() -> Result<(), Error> {
    let m = MediaType::parse("multipart/form-data; boundary=\"abc\"")?;
    assert_eq!(m.parameter("boundary"), Some("\"abc\""));

    let m = MediaType::parse("text/plain; charset=\"utf-8\"")?;
    assert_eq!(m.charset(), Some(encoding_rs::UTF_8));
    Ok(())
}

#[test]
fn parse_errors() {
    for bad in &["text", "/plain", "text/", "*/plain", "text/plain;charset", "text/plain;q=2", "text/plain;q=x"] {
        match MediaType::parse(bad) {
            Err(Error::InvalidMediaType(_)) => {}
            other => panic!("{:?} parsed as {:?}", bad, other),
        }
    }
}

#[test]
fn parse_list() -> Result<(), Error> {
    let list = MediaType::parse_list("text/plain, application/json;q=0.5 ,*/*")?;
    assert_eq!(list, vec![MediaType::TEXT_PLAIN, mt("application/json;q=0.5"), MediaType::ALL]);
    Ok(())
}

#[test]
fn equality_ignores_case_of_parameters() {
    assert_eq!(mt("text/plain;charset=utf-8"), mt("TEXT/Plain;CHARSET=UTF-8"));
    assert_ne!(mt("text/plain;charset=utf-8"), mt("text/plain"));
    assert_ne!(mt("text/plain"), mt("text/html"));
}

#[test]
fn includes_is_asymmetric() {
    let text_all = mt("text/*");
    let text_plain = MediaType::TEXT_PLAIN;

    assert!(MediaType::ALL.includes(&text_plain));
    assert!(text_all.includes(&text_plain));
    assert!(!text_plain.includes(&text_all));
    assert!(!text_all.includes(&MediaType::APPLICATION_JSON));
}

#[test]
fn includes_suffix_wildcard() {
    let soap = mt("application/soap+xml");

    assert!(MediaType::APPLICATION_WILDCARD_XML.includes(&soap));
    assert!(!soap.includes(&MediaType::APPLICATION_WILDCARD_XML));
    assert!(!MediaType::APPLICATION_WILDCARD_XML.includes(&MediaType::APPLICATION_JSON));
}

#[test]
fn compatible_is_symmetric() {
    let soap = mt("application/soap+xml");

    assert!(soap.is_compatible_with(&MediaType::APPLICATION_WILDCARD_XML));
    assert!(MediaType::APPLICATION_WILDCARD_XML.is_compatible_with(&soap));
    assert!(mt("text/*").is_compatible_with(&MediaType::TEXT_PLAIN));
    assert!(MediaType::TEXT_PLAIN.is_compatible_with(&mt("text/*")));
    assert!(!MediaType::TEXT_PLAIN.is_compatible_with(&MediaType::TEXT_HTML));
}

#[test]
fn quality_value() {
    assert_eq!(MediaType::TEXT_PLAIN.quality_value(), 1.0);
    assert_eq!(mt("text/plain;q=0.3").quality_value(), 0.3);
    assert_eq!(mt("text/plain;q=0.3").remove_quality_value(), MediaType::TEXT_PLAIN);
    assert_eq!(
        MediaType::TEXT_HTML.copy_quality_value(&mt("text/plain;q=0.3")),
        mt("text/html;q=0.3")
    );
}

#[test]
fn concrete() {
    assert!(MediaType::TEXT_PLAIN.is_concrete());
    assert!(!mt("text/*").is_concrete());
    assert!(!MediaType::APPLICATION_WILDCARD_JSON.is_concrete());
    assert!(!MediaType::ALL.is_concrete());
}

#[test]
fn sort_by_specificity() {
    let mut list = vec![
        mt("*/*"),
        mt("audio/*"),
        mt("audio/basic"),
        mt("audio/basic;level=1"),
        mt("audio/*;q=0.7"),
    ];

    MediaType::sort_by_specificity(&mut list);

    assert_eq!(
        list,
        vec![
            mt("audio/basic;level=1"),
            mt("audio/basic"),
            mt("audio/*"),
            mt("audio/*;q=0.7"),
            mt("*/*"),
        ]
    );
}

#[test]
fn sort_by_specificity_is_stable() {
    // unrelated concrete types rank equal and keep their order
    let mut list = vec![
        MediaType::TEXT_HTML,
        MediaType::APPLICATION_JSON,
        MediaType::ALL,
        MediaType::TEXT_PLAIN,
        MediaType::IMAGE_PNG,
    ];

    MediaType::sort_by_specificity(&mut list);

    assert_eq!(
        list,
        vec![
            MediaType::TEXT_HTML,
            MediaType::APPLICATION_JSON,
            MediaType::TEXT_PLAIN,
            MediaType::IMAGE_PNG,
            MediaType::ALL,
        ]
    );
}

#[test]
fn sort_by_quality_value() {
    let mut list = vec![
        mt("text/*;q=0.5"),
        mt("*/*;q=0.1"),
        mt("text/html"),
        mt("application/json;q=0.5"),
        mt("text/plain"),
    ];

    MediaType::sort_by_quality_value(&mut list);

    assert_eq!(
        list,
        vec![
            mt("text/html"),
            mt("text/plain"),
            mt("text/*;q=0.5"),
            mt("application/json;q=0.5"),
            mt("*/*;q=0.1"),
        ]
    );
}

#[test]
fn ordering_and_hashing() {
    use std::collections::HashSet;

    let mut set = HashSet::new();
    set.insert(mt("text/plain;charset=UTF-8"));
    assert!(set.contains(&mt("text/plain;charset=utf-8")));

    let mut list = vec![MediaType::TEXT_PLAIN, MediaType::APPLICATION_JSON, mt("text/plain;a=1")];
    list.sort();
    assert_eq!(list, vec![MediaType::APPLICATION_JSON, MediaType::TEXT_PLAIN, mt("text/plain;a=1")]);
}
