use rest_h1::uri::{build_uri, expand, variable_names};
use rest_h1::{Error, Uri, UriVariables};
use std::collections::HashMap;

fn base() -> Uri {
    "http://example.com/api/".parse().unwrap()
}

#[test]
fn positional_in_order_of_appearance() -> Result<(), Error> {
    let uri = build_uri(None, "http://example.com/{a}/{b}/{a}", &["x", "y"].into())?;
    assert_eq!(uri.to_string(), "http://example.com/x/y/x");
    Ok(())
}

#[test]
fn named() -> Result<(), Error> {
    let mut vars = HashMap::new();
    vars.insert("id", "5");
    vars.insert("unused", "7");

    let uri = build_uri(None, "http://example.com/user/{id}?q={ id }", &vars.into())?;
    assert_eq!(uri.to_string(), "http://example.com/user/5?q=5");
    Ok(())
}

#[test]
fn missing_named_variable() {
    let vars: HashMap<String, String> = HashMap::new();
    match build_uri(None, "http://example.com/user/{id}", &vars.into()) {
        Err(Error::Argument(msg)) => assert!(msg.contains("'id'"), "{}", msg),
        other => panic!("expected argument error, got {:?}", other),
    }
}

#[test]
fn wrong_amount_of_positional_values() {
    match expand("/{a}/{b}", &vec!["x".to_string()].into()) {
        Err(Error::Argument(msg)) => {
            assert_eq!(msg, "Invalid amount of variables values in '/{a}/{b}': expected 2; got 1")
        }
        other => panic!("expected argument error, got {:?}", other),
    }
}

#[test]
fn values_are_percent_encoded() -> Result<(), Error> {
    let uri = build_uri(None, "http://example.com/search/{q}", &["a b/c?d&é"].into())?;
    assert_eq!(uri.to_string(), "http://example.com/search/a%20b%2Fc%3Fd%26%C3%A9");
    Ok(())
}

#[test]
fn resolve_against_base() -> Result<(), Error> {
    let b = base();

    let uri = build_uri(Some(&b), "user/{id}", &["5"].into())?;
    assert_eq!(uri.to_string(), "http://example.com/api/user/5");

    let uri = build_uri(Some(&b), "/root", &UriVariables::None)?;
    assert_eq!(uri.to_string(), "http://example.com/root");

    // absolute ignores the base
    let uri = build_uri(Some(&b), "http://other.com/x", &().into())?;
    assert_eq!(uri.to_string(), "http://other.com/x");
    Ok(())
}

#[test]
fn relative_without_base() {
    match build_uri(None, "user/5", &().into()) {
        Err(Error::Argument(_)) => {}
        other => panic!("expected argument error, got {:?}", other),
    }
}

#[test]
fn pre_expanded_is_used_verbatim() -> Result<(), Error> {
    assert_eq!(expand("/a%20b/{not-a-var}", &UriVariables::None)?, "/a%20b/{not-a-var}");
    Ok(())
}

#[test]
fn names() -> Result<(), Error> {
    assert_eq!(variable_names("/{a}/{b}/{a}")?, vec!["a", "b"]);
    assert!(variable_names("/{a").is_err());
    assert!(variable_names("/{}").is_err());
    Ok(())
}
