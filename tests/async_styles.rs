use futures_channel::oneshot;
use rest_h1::extractor::ResponseExtractor;
use rest_h1::{CancellationToken, ClientHttpResponse, Completion, Error, HttpEntity, HttpMethod};
use rest_h1::{RestTemplate, StatusCode};
use std::time::{Duration, Instant};

mod common;

fn text_plain() -> (&'static str, &'static str) {
    ("content-type", "text/plain")
}

#[async_std::test]
async fn execute_task() -> Result<(), Error> {
    let (base, server) = common::serve_once(common::response("200 OK", &[text_plain()], "2")).await?;

    let body = RestTemplate::new()
        .get_for_object::<String>(&format!("{}/number", base), ())
        .execute_task(None)?
        .await?;

    assert_eq!(body.as_deref(), Some("2"));
    assert!(server.await?.starts_with("GET /number HTTP/1.1\r\n"));
    Ok(())
}

#[async_std::test]
async fn execute_async_callback() -> Result<(), Error> {
    let (base, _) = common::serve_once(common::response("201 Created", &[("location", "/user/3")], "")).await?;

    let (tx, rx) = oneshot::channel();

    let canceler = RestTemplate::new()
        .post_for_location(&format!("{}/user", base), HttpEntity::new("Lisa Baia"), ())
        .execute_async(move |completion| {
            tx.send(completion).ok();
        })?;

    assert_eq!(canceler.uri().path(), "/user");
    assert_eq!(canceler.method().as_str(), "POST");

    match rx.await.expect("completion") {
        Completion::Completed(location) => assert_eq!(location.unwrap().path(), "/user/3"),
        other => panic!("expected completed, got {:?}", other),
    }
    Ok(())
}

#[async_std::test]
async fn errors_are_delivered_to_the_task() -> Result<(), Error> {
    let (base, _) = common::serve_once(common::response("404 Not Found", &[], "")).await?;

    let err = RestTemplate::new()
        .delete(&format!("{}/user/5", base), ())
        .execute_task(None)?
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Client(_)), "{:?}", err);
    Ok(())
}

#[async_std::test]
async fn cancel_in_flight() -> Result<(), Error> {
    let (base, _) = common::serve_once_delayed(
        common::response("200 OK", &[text_plain()], "slow"),
        Duration::from_secs(2),
    )
    .await?;

    let (tx, rx) = oneshot::channel();
    let start = Instant::now();

    let canceler = RestTemplate::new()
        .get_for_object::<String>(&format!("{}/sleep", base), ())
        .execute_async(move |completion| {
            tx.send(completion).ok();
        })?;

    async_std::task::sleep(Duration::from_millis(100)).await;
    canceler.cancel();
    assert!(canceler.is_cancelled());

    let completion = rx.await.expect("completion");

    assert!(completion.is_cancelled(), "{:?}", completion);
    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(completion.into_result().unwrap_err().is_cancelled());
    Ok(())
}

#[async_std::test]
async fn cancelled_token_cancels_new_tasks() -> Result<(), Error> {
    common::setup_logger();

    let token = CancellationToken::new();
    token.cancel();

    // the port does not matter, nothing is sent
    let err = RestTemplate::new()
        .get_for_object::<String>("http://127.0.0.1:1/x", ())
        .execute_task(Some(&token))?
        .await
        .unwrap_err();

    assert!(err.is_cancelled(), "{:?}", err);
    Ok(())
}

#[async_std::test]
async fn token_cancels_running_task() -> Result<(), Error> {
    let (base, _) = common::serve_once_delayed(
        common::response("200 OK", &[text_plain()], "slow"),
        Duration::from_secs(2),
    )
    .await?;

    let token = CancellationToken::new();

    let task = RestTemplate::new()
        .get_for_object::<String>(&format!("{}/sleep", base), ())
        .execute_task(Some(&token))?;

    let canceller = token.clone();
    async_std::task::spawn(async move {
        async_std::task::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let err = task.await.unwrap_err();
    assert!(err.is_cancelled(), "{:?}", err);
    assert!(token.is_cancelled());
    Ok(())
}

#[async_std::test]
async fn preparation_failure_goes_to_callback() -> Result<(), Error> {
    common::setup_logger();

    let (tx, rx) = oneshot::channel();

    // nothing can write an i8
    let canceler = RestTemplate::new()
        .put("http://127.0.0.1:1/x", HttpEntity::new(7_i8), ())
        .execute_async(move |completion| {
            tx.send(completion).ok();
        })?;

    assert_eq!(canceler.uri().to_string(), "http://127.0.0.1:1/x");
    canceler.cancel();
    assert!(!canceler.is_cancelled());

    match rx.await.expect("completion") {
        Completion::Failed(Error::NoSuitableConverter(_)) => {}
        other => panic!("expected failed, got {:?}", other),
    }
    Ok(())
}

#[async_std::test]
async fn invalid_uri_is_returned_directly() {
    let rest = RestTemplate::new();

    let res = rest
        .get_for_object::<String>("relative/{id}", ["5"])
        .execute_async(|_| panic!("callback must not run"));
    assert!(matches!(res, Err(Error::Argument(_))));

    let res = rest
        .get_for_object::<String>("http://example.com/{a}/{b}", ["5"])
        .execute_task(None);
    assert!(matches!(res, Err(Error::Argument(_))));
}

struct Exploding;

impl ResponseExtractor<String> for Exploding {
    fn extract_data(&self, _: &dyn ClientHttpResponse) -> Result<String, Error> {
        panic!("extractor blew up");
    }
}

fn canned_template() -> RestTemplate {
    let mut rest = RestTemplate::new();
    rest.set_request_factory(common::CannedFactory::new(
        StatusCode::OK,
        &[("content-type", "text/plain")],
        "ok",
    ));
    rest
}

#[async_std::test]
async fn panic_is_delivered_to_callback() -> Result<(), Error> {
    let rest = canned_template();
    let (tx, rx) = oneshot::channel();

    rest.execute("http://example.com/x", HttpMethod::GET, (), None, Exploding)
        .execute_async(move |completion| {
            tx.send(completion).ok();
        })?;

    match rx.await.expect("callback must run") {
        Completion::Failed(Error::Panicked(msg)) => assert_eq!(msg, "extractor blew up"),
        other => panic!("expected panicked, got {:?}", other),
    }
    Ok(())
}

#[async_std::test]
async fn panic_fails_the_task_without_cancelling() -> Result<(), Error> {
    let rest = canned_template();
    let token = CancellationToken::new();

    let err = rest
        .execute("http://example.com/x", HttpMethod::GET, (), None, Exploding)
        .execute_task(Some(&token))?
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Panicked(_)), "{:?}", err);
    assert!(!err.is_cancelled());
    assert!(!token.is_cancelled());
    Ok(())
}

#[async_std::test]
async fn token_forgets_finished_tasks() -> Result<(), Error> {
    let rest = canned_template();
    let token = CancellationToken::new();

    for _ in 0..50 {
        let task = rest
            .get_for_object::<String>("http://example.com/x", ())
            .execute_task(Some(&token))?;
        let canceler = task.canceler().clone();

        assert_eq!(task.await?.as_deref(), Some("ok"));
        assert!(canceler.is_finished());
    }

    assert_eq!(token.pending(), 0);
    Ok(())
}

#[async_std::test]
async fn token_keeps_running_tasks() -> Result<(), Error> {
    let (base, _) = common::serve_once_delayed(
        common::response("200 OK", &[text_plain()], "slow"),
        Duration::from_secs(2),
    )
    .await?;

    let token = CancellationToken::new();
    let task = RestTemplate::new()
        .get_for_object::<String>(&format!("{}/sleep", base), ())
        .execute_task(Some(&token))?;

    assert_eq!(token.pending(), 1);
    assert!(!task.canceler().is_finished());

    token.cancel();
    assert!(task.await.unwrap_err().is_cancelled());
    assert_eq!(token.pending(), 0);
    Ok(())
}
