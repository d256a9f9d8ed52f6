use common::{CannedFactory, CannedResponse};
use futures_util::future::BoxFuture;
use rest_h1::client::{ClientHttpRequest, ResponseResult};
use rest_h1::interceptor::{AsyncExecution, AsyncInterceptor, BeforeInterceptor};
use rest_h1::interceptor::{SyncExecution, SyncInterceptor};
use rest_h1::{BasicAuthInterceptor, Error, HttpEntity, HttpHeaders, RequestInterceptor};
use rest_h1::{RestTemplate, StatusCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod common;

/// Records the shared counter value at the request and response phase.
#[derive(Default)]
struct Counting {
    counter: Arc<AtomicUsize>,
    request_phase: AtomicUsize,
    response_phase: Arc<AtomicUsize>,
}

impl Counting {
    fn new(counter: &Arc<AtomicUsize>) -> Arc<Self> {
        Arc::new(Counting {
            counter: counter.clone(),
            ..Default::default()
        })
    }

    fn tick(&self) -> usize {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn phases(&self) -> (usize, usize) {
        (
            self.request_phase.load(Ordering::SeqCst),
            self.response_phase.load(Ordering::SeqCst),
        )
    }
}

impl SyncInterceptor for Counting {
    fn execute(&self, execution: SyncExecution) -> ResponseResult {
        self.request_phase.store(self.tick(), Ordering::SeqCst);
        let response = execution.execute();
        self.response_phase.store(self.tick(), Ordering::SeqCst);
        response
    }
}

impl AsyncInterceptor for Counting {
    fn execute_async(&self, execution: AsyncExecution) -> BoxFuture<'static, ResponseResult> {
        self.request_phase.store(self.tick(), Ordering::SeqCst);

        let counter = self.counter.clone();
        let response_phase = self.response_phase.clone();

        Box::pin(async move {
            let response = execution.execute().await;
            response_phase.store(counter.fetch_add(1, Ordering::SeqCst) + 1, Ordering::SeqCst);
            response
        })
    }
}

/// Counts its own calls, and remembers where the shared counter was.
#[derive(Default)]
struct Before {
    shared: Arc<AtomicUsize>,
    calls: AtomicUsize,
    shared_at_call: AtomicUsize,
}

impl BeforeInterceptor for Before {
    fn before_execute(&self, request: &mut dyn ClientHttpRequest) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.shared_at_call
            .store(self.shared.load(Ordering::SeqCst), Ordering::SeqCst);
        request.headers_mut().set("X-Before", "yes");
        Ok(())
    }
}

fn canned() -> CannedFactory {
    CannedFactory::new(StatusCode::OK, &[("content-type", "text/plain")], "ok")
}

#[test]
fn sync_chain_is_an_onion() -> Result<(), Error> {
    common::setup_logger();

    let counter = Arc::new(AtomicUsize::new(0));
    let i1 = Counting::new(&counter);
    let i2 = Arc::new(Before {
        shared: counter.clone(),
        ..Default::default()
    });
    let i3 = Counting::new(&counter);

    let factory = canned();
    let mut rest = RestTemplate::new();
    rest.set_request_factory(factory.clone());
    rest.add_interceptor(RequestInterceptor::Sync(i1.clone()));
    rest.add_interceptor(RequestInterceptor::Before(i2.clone()));
    rest.add_interceptor(RequestInterceptor::Sync(i3.clone()));

    let body = rest
        .post_for_object::<String, _>("http://example.com/user", HttpEntity::new("Lisa Baia"), ())
        .execute()?;
    assert_eq!(body.as_deref(), Some("ok"));

    assert_eq!(i1.phases(), (1, 4));
    assert_eq!(i3.phases(), (2, 3));
    assert_eq!(i2.calls.load(Ordering::SeqCst), 1);
    // between the request phases of i1 and i3
    assert_eq!(i2.shared_at_call.load(Ordering::SeqCst), 1);

    let seen = factory.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].headers.get("x-before").as_deref(), Some("yes"));
    assert_eq!(seen[0].body, b"Lisa Baia");
    Ok(())
}

#[async_std::test]
async fn async_chain_is_an_onion() -> Result<(), Error> {
    common::setup_logger();

    let counter = Arc::new(AtomicUsize::new(0));
    let i1 = Counting::new(&counter);
    let i2 = Arc::new(Before {
        shared: counter.clone(),
        ..Default::default()
    });
    let i3 = Counting::new(&counter);

    let mut rest = RestTemplate::new();
    rest.set_request_factory(canned());
    rest.add_interceptor(RequestInterceptor::Async(i1.clone()));
    rest.add_interceptor(RequestInterceptor::Before(i2.clone()));
    rest.add_interceptor(RequestInterceptor::Async(i3.clone()));

    let body = rest
        .get_for_object::<String>("http://example.com/x", ())
        .execute_task(None)?
        .await?;
    assert_eq!(body.as_deref(), Some("ok"));

    assert_eq!(i1.phases(), (1, 4));
    assert_eq!(i3.phases(), (2, 3));
    assert_eq!(i2.calls.load(Ordering::SeqCst), 1);
    assert_eq!(i2.shared_at_call.load(Ordering::SeqCst), 1);
    Ok(())
}

#[async_std::test]
async fn each_path_skips_the_other_kind() -> Result<(), Error> {
    common::setup_logger();

    let counter = Arc::new(AtomicUsize::new(0));
    let sync = Counting::new(&counter);
    let not_sync = Counting::new(&counter);

    let mut rest = RestTemplate::new();
    rest.set_request_factory(canned());
    rest.add_interceptor(RequestInterceptor::Sync(sync.clone()));
    rest.add_interceptor(RequestInterceptor::Async(not_sync.clone()));

    rest.delete("http://example.com/x", ()).execute()?;

    assert_eq!(sync.phases(), (1, 2));
    assert_eq!(not_sync.phases(), (0, 0));

    rest.delete("http://example.com/x", ()).execute_task(None)?.await?;

    assert_eq!(sync.phases(), (1, 2));
    assert_eq!(not_sync.phases(), (3, 4));
    Ok(())
}

struct ShortCircuit;

impl SyncInterceptor for ShortCircuit {
    fn execute(&self, execution: SyncExecution) -> ResponseResult {
        assert_eq!(execution.request().uri().path(), "/cached");

        let mut headers = HttpHeaders::new();
        headers.set("Content-Type", "text/plain");

        Ok(Box::new(CannedResponse {
            status: StatusCode::OK,
            headers,
            body: b"from cache".to_vec(),
        }))
    }
}

#[test]
fn sync_interceptor_can_short_circuit() -> Result<(), Error> {
    common::setup_logger();

    let factory = canned();
    let mut rest = RestTemplate::new();
    rest.set_request_factory(factory.clone());
    rest.add_interceptor(RequestInterceptor::sync(ShortCircuit));

    let body = rest
        .get_for_object::<String>("http://example.com/cached", ())
        .execute()?;

    assert_eq!(body.as_deref(), Some("from cache"));
    assert!(factory.seen().is_empty());
    Ok(())
}

struct Rewrite;

impl SyncInterceptor for Rewrite {
    fn execute(&self, mut execution: SyncExecution) -> ResponseResult {
        execution.request_mut().headers_mut().set("X-Trace", "42");
        execution.execute()
    }
}

struct Fail;

impl BeforeInterceptor for Fail {
    fn before_execute(&self, _: &mut dyn ClientHttpRequest) -> Result<(), Error> {
        Err(Error::Argument("refused".into()))
    }
}

#[test]
fn sync_interceptor_can_mutate_the_request() -> Result<(), Error> {
    let factory = canned();
    let mut rest = RestTemplate::new();
    rest.set_request_factory(factory.clone());
    rest.add_interceptor(RequestInterceptor::sync(Rewrite));

    rest.delete("http://example.com/x", ()).execute()?;

    assert_eq!(factory.seen()[0].headers.get("X-Trace").as_deref(), Some("42"));
    Ok(())
}

#[async_std::test]
async fn before_interceptor_error_stops_the_request() {
    let factory = canned();
    let mut rest = RestTemplate::new();
    rest.set_request_factory(factory.clone());
    rest.add_interceptor(RequestInterceptor::before(Fail));

    let err = rest.delete("http://example.com/x", ()).execute().unwrap_err();
    assert!(matches!(err, Error::Argument(_)));

    let err = rest
        .delete("http://example.com/x", ())
        .execute_task(None)
        .unwrap()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Argument(_)));

    assert!(factory.seen().is_empty());
}

#[test]
fn basic_auth() -> Result<(), Error> {
    let factory = canned();
    let mut rest = RestTemplate::new();
    rest.set_request_factory(factory.clone());
    rest.add_interceptor(RequestInterceptor::before(BasicAuthInterceptor::new(
        "Aladdin",
        "open sesame",
    )));

    rest.delete("http://example.com/x", ()).execute()?;

    assert_eq!(
        factory.seen()[0].headers.get("Authorization").as_deref(),
        Some("Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==")
    );
    Ok(())
}
