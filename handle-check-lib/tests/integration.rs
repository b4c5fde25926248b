// handle-check-lib/tests/integration.rs

//! End-to-end checks of the dispatcher against scripted transports.

use async_trait::async_trait;
use handle_check_lib::protocols::{
    DnsError, DnsResolver, HttpRequest, HttpResponse, HttpTransport, Method, PageRenderer,
    RenderedPage,
};
use handle_check_lib::probes::ProfilePageProbe;
use handle_check_lib::protocols::ReqwestTransport;
use handle_check_lib::{
    Availability, AvailabilityChecker, CheckConfig, ClientCredentials, Credentials, ErrorCode,
    PlatformId, PlatformRegistry, ProbeError, ProbeObserver, ProbeRecord, ProbeRequest,
};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type Route = dyn Fn(&HttpRequest) -> Result<HttpResponse, ProbeError> + Send + Sync;

/// HTTP mock that answers through a routing closure and records every URL.
struct ScriptedHttp {
    route: Box<Route>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttp {
    fn new<F>(route: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, ProbeError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            route: Box::new(route),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn status(status: u16) -> Arc<Self> {
        Self::new(move |_| Ok(HttpResponse::new(status, "")))
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedHttp {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ProbeError> {
        let response = (self.route)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

/// DNS mock resolving only the hosts it was given and recording every lookup.
struct ScriptedDns {
    known: Vec<&'static str>,
    lookups: Mutex<Vec<String>>,
}

impl ScriptedDns {
    fn new(known: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            known,
            lookups: Mutex::new(Vec::new()),
        })
    }

    fn hosts(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsResolver for ScriptedDns {
    async fn resolve_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, DnsError> {
        self.lookups.lock().unwrap().push(host.to_string());
        if self.known.contains(&host) {
            Ok(vec![Ipv4Addr::new(93, 184, 216, 34)])
        } else {
            Err(DnsError::NotFound(host.to_string()))
        }
    }
}

/// Renderer mock returning a fixed page.
struct ScriptedRenderer {
    page: RenderedPage,
    renders: AtomicUsize,
}

impl ScriptedRenderer {
    fn new(title: &str, content: &str) -> Arc<Self> {
        Arc::new(Self {
            page: RenderedPage {
                title: Some(title.to_string()),
                content: content.to_string(),
            },
            renders: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PageRenderer for ScriptedRenderer {
    async fn render(&self, _url: &str) -> Result<RenderedPage, ProbeError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(self.page.clone())
    }
}

#[derive(Default)]
struct CapturingObserver {
    lines: Mutex<Vec<String>>,
}

impl ProbeObserver for CapturingObserver {
    fn on_probe(&self, record: &ProbeRecord<'_>) {
        self.lines.lock().unwrap().push(format!("{:?}", record));
    }
}

struct Harness {
    http: Arc<ScriptedHttp>,
    dns: Arc<ScriptedDns>,
    renderer: Arc<ScriptedRenderer>,
}

impl Harness {
    fn new(http: Arc<ScriptedHttp>) -> Self {
        Self {
            http,
            dns: ScriptedDns::new(vec![]),
            renderer: ScriptedRenderer::new("Instagram", "<html></html>"),
        }
    }

    fn checker(&self, credentials: Credentials) -> AvailabilityChecker {
        AvailabilityChecker::builder()
            .http_transport(self.http.clone())
            .dns_resolver(self.dns.clone())
            .page_renderer(self.renderer.clone())
            .credentials(credentials)
            .config(CheckConfig::default().with_timeout(Duration::from_secs(2)))
            .build()
            .unwrap()
    }

    fn total_io(&self) -> usize {
        self.http.calls()
            + self.dns.hosts().len()
            + self.renderer.renders.load(Ordering::SeqCst)
    }
}

fn twitch_credentials() -> Credentials {
    Credentials::new().with_client_credentials("twitch", ClientCredentials::new("cid", "s3cr3t"))
}

#[tokio::test]
async fn test_empty_name_is_invalid_everywhere_without_io() {
    let harness = Harness::new(ScriptedHttp::status(200));
    let checker = harness.checker(twitch_credentials().with_bearer_token("twitter", "tok"));

    for id in PlatformRegistry::builtin().ids() {
        for request in [ProbeRequest::new(""), ProbeRequest::new("  ").with_tld("com")] {
            let verdict = checker.check_availability(id.as_str(), &request).await;
            assert_eq!(
                verdict,
                Availability::error(ErrorCode::InvalidInput),
                "platform {}",
                id
            );
        }
    }

    assert_eq!(harness.total_io(), 0);
}

#[tokio::test]
async fn test_unknown_platform_without_io() {
    let harness = Harness::new(ScriptedHttp::status(404));
    let checker = harness.checker(Credentials::new());

    for id in ["myspace", "GitHub", "", "face book"] {
        let verdict = checker
            .check_availability(id, &ProbeRequest::new("someone"))
            .await;
        assert_eq!(verdict, Availability::error(ErrorCode::UnknownPlatform));
    }

    assert_eq!(harness.total_io(), 0);
}

#[tokio::test]
async fn test_status_code_heuristic() {
    let request = ProbeRequest::new("octocat");
    for (status, expected) in [
        (404, Availability::Available),
        (200, Availability::Unavailable),
        (500, Availability::error(ErrorCode::TransportFailure)),
        (302, Availability::error(ErrorCode::TransportFailure)),
    ] {
        let harness = Harness::new(ScriptedHttp::status(status));
        let checker = harness.checker(Credentials::new());

        assert_eq!(checker.check_availability("github", &request).await, expected);
        assert_eq!(harness.http.urls(), vec!["https://github.com/octocat/"]);
    }
}

const FOUND_LOGIN: &str =
    "HTTP/1.1 302 Found\r\nLocation: /login\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
const LOGIN_PAGE: &str =
    "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nlogin";
const SERVER_ERROR: &str =
    "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
const NOT_FOUND: &str =
    "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

/// Local HTTP/1.1 server answering each path with a canned response, 404
/// for anything else. Returns the base URL.
async fn serve(routes: Vec<(&'static str, &'static str)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut read = 0;
                while read < buf.len() {
                    let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    read += n;
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let head = String::from_utf8_lossy(&buf[..read]);
                let path = head.split_whitespace().nth(1).unwrap_or("/");
                let response = routes
                    .iter()
                    .find(|(route, _)| *route == path)
                    .map(|(_, response)| *response)
                    .unwrap_or(NOT_FOUND);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_real_transport_does_not_follow_redirects() {
    let base = serve(vec![
        ("/redirected/", FOUND_LOGIN),
        ("/login", LOGIN_PAGE),
        ("/broken/", SERVER_ERROR),
    ])
    .await;

    let config = CheckConfig::default().with_timeout(Duration::from_secs(2));
    let transport = ReqwestTransport::new(&config).unwrap();
    let response = transport
        .send(HttpRequest::get(format!("{}/redirected/", base)))
        .await
        .unwrap();
    assert_eq!(response.status, 302);

    let template: &'static str = Box::leak(format!("{}/{{name}}/", base).into_boxed_str());
    let registry = PlatformRegistry::builder()
        .register("local", None, template, ProfilePageProbe::new(template))
        .unwrap()
        .build();
    let checker = AvailabilityChecker::builder()
        .config(config)
        .registry(Arc::new(registry))
        .dns_resolver(ScriptedDns::new(vec![]))
        .page_renderer(ScriptedRenderer::new("", ""))
        .build()
        .unwrap();

    for (name, expected) in [
        ("redirected", Availability::error(ErrorCode::TransportFailure)),
        ("broken", Availability::error(ErrorCode::TransportFailure)),
        ("nobody", Availability::Available),
    ] {
        assert_eq!(
            checker.check_availability("local", &ProbeRequest::new(name)).await,
            expected,
            "name {}",
            name
        );
    }
}

#[tokio::test]
async fn test_transport_fault_is_an_error_verdict() {
    let harness = Harness::new(ScriptedHttp::new(|_| {
        Err(ProbeError::transport("connection reset"))
    }));
    let checker = harness.checker(Credentials::new());

    let verdict = checker
        .check_availability("patreon", &ProbeRequest::new("creator"))
        .await;
    assert_eq!(verdict, Availability::error(ErrorCode::TransportFailure));
}

#[tokio::test]
async fn test_dns_heuristic() {
    let mut harness = Harness::new(ScriptedHttp::status(200));
    harness.dns = ScriptedDns::new(vec!["taken.com", "taken.dev"]);
    let checker = harness.checker(Credentials::new());

    assert_eq!(
        checker
            .check_availability("com", &ProbeRequest::new("taken"))
            .await,
        Availability::Unavailable
    );
    assert_eq!(
        checker
            .check_availability("com", &ProbeRequest::new("free"))
            .await,
        Availability::Available
    );
    assert_eq!(
        checker
            .check_availability("web", &ProbeRequest::new("taken").with_tld("dev"))
            .await,
        Availability::Unavailable
    );
    assert_eq!(
        checker
            .check_availability("web", &ProbeRequest::new("free").with_tld(".dev"))
            .await,
        Availability::Available
    );
    assert_eq!(harness.http.calls(), 0);
}

#[tokio::test]
async fn test_tld_only_reaches_platforms_that_take_one() {
    let mut harness = Harness::new(ScriptedHttp::status(404));
    harness.dns = ScriptedDns::new(vec!["acme.com"]);
    let checker = harness.checker(Credentials::new());
    let request = ProbeRequest::new("acme").with_tld("dev");

    assert_eq!(
        checker.check_availability("github", &request).await,
        Availability::Available
    );
    assert_eq!(harness.http.urls(), vec!["https://github.com/acme/"]);

    assert_eq!(
        checker.check_availability("com", &request).await,
        Availability::Unavailable
    );
    assert_eq!(
        checker.check_availability("web", &request).await,
        Availability::Available
    );
    assert_eq!(harness.dns.hosts(), vec!["acme.com", "acme.dev"]);
}

#[tokio::test]
async fn test_error_message_heuristic() {
    let missing = Harness::new(ScriptedHttp::new(|_| {
        Ok(HttpResponse::new(
            400,
            r#"{"error":{"message":"User 12345 do not exist","type":"OAuthException","code":803}}"#,
        ))
    }));
    let verdict = missing
        .checker(Credentials::new())
        .check_availability("facebook", &ProbeRequest::new("12345"))
        .await;
    assert_eq!(verdict, Availability::Available);
    assert_eq!(
        missing.http.urls(),
        vec!["https://graph.facebook.com/v10.0/12345"]
    );

    let denied = Harness::new(ScriptedHttp::new(|_| {
        Ok(HttpResponse::new(
            400,
            r#"{"error":{"message":"permission denied"}}"#,
        ))
    }));
    let verdict = denied
        .checker(Credentials::new())
        .check_availability("facebook", &ProbeRequest::new("zuck"))
        .await;
    assert_eq!(verdict, Availability::Unavailable);

    let garbled = Harness::new(ScriptedHttp::new(|_| {
        Ok(HttpResponse::new(403, "<html>captcha</html>"))
    }));
    let verdict = garbled
        .checker(Credentials::new())
        .check_availability("facebook", &ProbeRequest::new("zuck"))
        .await;
    assert_eq!(verdict, Availability::error(ErrorCode::UnexpectedResponse));
}

#[tokio::test]
async fn test_oauth_token_failure_skips_lookup() {
    let harness = Harness::new(ScriptedHttp::new(|request| {
        if request.url.starts_with("https://id.twitch.tv/") {
            Ok(HttpResponse::new(401, r#"{"status":401,"message":"invalid client"}"#))
        } else {
            Ok(HttpResponse::new(200, r#"{"data":[]}"#))
        }
    }));
    let checker = harness.checker(twitch_credentials());

    let verdict = checker
        .check_availability("twitch", &ProbeRequest::new("ninja"))
        .await;
    assert_eq!(verdict, Availability::error(ErrorCode::AuthFailure));
    assert_eq!(harness.http.urls(), vec!["https://id.twitch.tv/oauth2/token"]);
}

#[tokio::test]
async fn test_oauth_exchange_then_lookup() {
    let harness = Harness::new(ScriptedHttp::new(|request| match request.method {
        Method::Post => Ok(HttpResponse::new(
            200,
            r#"{"access_token":"short-lived","expires_in":5000,"token_type":"bearer"}"#,
        )),
        Method::Get if request.url.ends_with("login=ninja") => Ok(HttpResponse::new(
            200,
            r#"{"data":[{"id":"19571641","login":"ninja"}]}"#,
        )),
        Method::Get => Ok(HttpResponse::new(200, r#"{"data":[]}"#)),
    }));
    let checker = harness.checker(twitch_credentials());

    assert_eq!(
        checker
            .check_availability("twitch", &ProbeRequest::new("ninja"))
            .await,
        Availability::Unavailable
    );
    assert_eq!(
        checker
            .check_availability("twitch", &ProbeRequest::new("nobody-here"))
            .await,
        Availability::Available
    );

    let requests = harness.http.requests.lock().unwrap();
    // One token exchange per probe, never cached
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[0].method, Method::Post);
    assert!(requests[0]
        .form
        .contains(&("grant_type".to_string(), "client_credentials".to_string())));
    assert!(!requests[0].url.contains("s3cr3t"));
    assert!(requests[1]
        .headers
        .contains(&("Authorization".to_string(), "Bearer short-lived".to_string())));
    assert!(requests[1]
        .headers
        .contains(&("Client-Id".to_string(), "cid".to_string())));
}

#[tokio::test]
async fn test_missing_credentials_fail_without_io() {
    let harness = Harness::new(ScriptedHttp::status(200));
    let checker = harness.checker(Credentials::new());

    for id in ["twitch", "twitter"] {
        assert_eq!(
            checker
                .check_availability(id, &ProbeRequest::new("someone"))
                .await,
            Availability::error(ErrorCode::AuthFailure)
        );
    }
    assert_eq!(harness.http.calls(), 0);
}

#[tokio::test]
async fn test_bearer_token_lookup() {
    let harness = Harness::new(ScriptedHttp::new(|request| {
        if request.url.ends_with("/jack") {
            Ok(HttpResponse::new(200, r#"{"data":{"id":"12","username":"jack"}}"#))
        } else {
            Ok(HttpResponse::new(
                200,
                r#"{"errors":[{"title":"Not Found Error","type":"https://api.twitter.com/2/problems/resource-not-found"}]}"#,
            ))
        }
    }));
    let checker = harness.checker(Credentials::new().with_bearer_token("twitter", "tok"));

    assert_eq!(
        checker
            .check_availability("twitter", &ProbeRequest::new("jack"))
            .await,
        Availability::Unavailable
    );
    assert_eq!(
        checker
            .check_availability("twitter", &ProbeRequest::new("nobody"))
            .await,
        Availability::Available
    );
}

#[tokio::test]
async fn test_rendered_page_markers() {
    let mut harness = Harness::new(ScriptedHttp::status(200));
    harness.renderer = ScriptedRenderer::new(
        "Page Not Found • Instagram",
        "<html><body>Couldn't find this account</body></html>",
    );
    let checker = harness.checker(Credentials::new());

    assert_eq!(
        checker
            .check_availability("instagram", &ProbeRequest::new("ghost"))
            .await,
        Availability::Available
    );
    assert_eq!(
        checker
            .check_availability("tiktok", &ProbeRequest::new("ghost"))
            .await,
        Availability::Available
    );

    let mut taken = Harness::new(ScriptedHttp::status(200));
    taken.renderer = ScriptedRenderer::new("Ghost (@ghost) • Instagram photos", "<html></html>");
    assert_eq!(
        taken
            .checker(Credentials::new())
            .check_availability("instagram", &ProbeRequest::new("ghost"))
            .await,
        Availability::Unavailable
    );
    assert_eq!(harness.http.calls(), 0);
}

#[tokio::test]
async fn test_repeated_probe_is_idempotent() {
    let harness = Harness::new(ScriptedHttp::new(|request| {
        let status = if request.url.contains("taken") { 200 } else { 404 };
        Ok(HttpResponse::new(status, ""))
    }));
    let checker = harness.checker(Credentials::new());
    let request = ProbeRequest::new("taken");

    let first = checker.check_availability("medium", &request).await;
    let second = checker.check_availability("medium", &request).await;
    assert_eq!(first, Availability::Unavailable);
    assert_eq!(first, second);
    assert_eq!(harness.http.calls(), 2);
}

#[tokio::test]
async fn test_concurrent_platforms_are_independent() {
    let harness = Harness::new(ScriptedHttp::new(|request| {
        let status = if request.url.contains("youtube") {
            200
        } else if request.url.contains("reddit") {
            503
        } else {
            404
        };
        Ok(HttpResponse::new(status, ""))
    }));
    let checker = Arc::new(harness.checker(Credentials::new()));
    let request = ProbeRequest::new("candidate");

    let expectations = [
        ("github", Availability::Available),
        ("youtube", Availability::Unavailable),
        ("reddit", Availability::error(ErrorCode::TransportFailure)),
        ("medium", Availability::Available),
        ("patreon", Availability::Available),
    ];

    let handles: Vec<_> = expectations
        .iter()
        .map(|(id, _)| {
            let checker = checker.clone();
            let request = request.clone();
            let id = id.to_string();
            tokio::spawn(async move { checker.check_availability(&id, &request).await })
        })
        .collect();

    for (handle, (id, expected)) in handles.into_iter().zip(expectations.iter()) {
        assert_eq!(handle.await.unwrap(), *expected, "platform {}", id);
    }

    let ids: Vec<PlatformId> = expectations.iter().map(|(id, _)| PlatformId::from(*id)).collect();
    let batch = checker.check_platforms(&ids, &request).await;
    let verdicts: Vec<_> = batch.into_iter().map(|(_, a)| a).collect();
    let expected: Vec<_> = expectations.iter().map(|(_, a)| *a).collect();
    assert_eq!(verdicts, expected);
}

#[tokio::test]
async fn test_secrets_never_reach_observer_or_results() {
    let harness = Harness::new(ScriptedHttp::new(|request| match request.method {
        Method::Post => Ok(HttpResponse::new(200, r#"{"access_token":"tkn-9f8e"}"#)),
        Method::Get => Ok(HttpResponse::new(200, r#"{"data":[]}"#)),
    }));
    let observer = Arc::new(CapturingObserver::default());
    let checker = AvailabilityChecker::builder()
        .http_transport(harness.http.clone())
        .dns_resolver(harness.dns.clone())
        .page_renderer(harness.renderer.clone())
        .credentials(twitch_credentials())
        .observer(observer.clone())
        .build()
        .unwrap();

    let verdict = checker
        .check_availability("twitch", &ProbeRequest::new("someone"))
        .await;
    let wire = serde_json::to_string(&verdict).unwrap();
    assert_eq!(wire, r#"{"available":true}"#);

    let lines = observer.lines.lock().unwrap();
    assert_eq!(lines.len(), 1);
    for text in lines.iter().chain(std::iter::once(&wire)) {
        assert!(!text.contains("s3cr3t"));
        assert!(!text.contains("tkn-9f8e"));
    }

    for request in harness.http.requests.lock().unwrap().iter() {
        let debug = format!("{:?}", request);
        assert!(!debug.contains("s3cr3t"));
        assert!(!debug.contains("tkn-9f8e"));
    }
}

#[test]
fn test_wire_shape_has_exactly_one_field() {
    let error = serde_json::to_value(Availability::error(ErrorCode::Timeout)).unwrap();
    assert_eq!(error, serde_json::json!({ "error": "Timeout" }));

    let taken = serde_json::to_value(Availability::Unavailable).unwrap();
    assert_eq!(taken, serde_json::json!({ "available": false }));

    assert!(serde_json::from_str::<Availability>(r#"{"available":true,"error":"Timeout"}"#).is_err());
    assert!(serde_json::from_str::<Availability>("{}").is_err());
}

#[test]
fn test_builtin_groups() {
    let registry = PlatformRegistry::builtin();
    let video = registry.group_platforms("video").unwrap();
    assert_eq!(video, vec![PlatformId::from("twitch"), PlatformId::from("youtube")]);
    assert!(registry.group_platforms("games").is_none());
    assert_eq!(
        registry.profile_url("github", "octocat").as_deref(),
        Some("https://www.github.com/octocat")
    );
}
