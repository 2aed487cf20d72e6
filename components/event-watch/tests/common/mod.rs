#![allow(dead_code)]

// External crates
use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    body::Incoming,
    header::{AUTHORIZATION, CONTENT_TYPE, HOST},
    http::{Request, Response, StatusCode},
    service::service_fn,
};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto::Builder as HyperServerBuilder,
};
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tokio::net::TcpListener;

/// What the mock platform saw for one request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: String,
    pub host: String,
    pub authorization: Option<String>,
}

pub type Responder = dyn Fn(&RecordedRequest) -> (StatusCode, String) + Send + Sync;

/// A local stand-in for both platform APIs, serving JSON from `responder`.
pub struct MockPlatform {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockPlatform {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responder: Arc<Responder> = Arc::new(responder);

        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };

                let io = TokioIo::new(stream);
                let recorded = recorded.clone();
                let responder = responder.clone();

                let service = service_fn(move |req: Request<Incoming>| {
                    let recorded = recorded.clone();
                    let responder = responder.clone();
                    async move {
                        let request = RecordedRequest {
                            path: req.uri().path().to_string(),
                            query: req.uri().query().unwrap_or_default().to_string(),
                            host: req
                                .headers()
                                .get(HOST)
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or_default()
                                .to_string(),
                            authorization: req
                                .headers()
                                .get(AUTHORIZATION)
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string),
                        };
                        let (status, body) = responder(&request);
                        recorded.lock().unwrap().push(request);

                        Ok::<_, Infallible>(
                            Response::builder()
                                .status(status)
                                .header(CONTENT_TYPE, "application/json")
                                .body(Full::new(Bytes::from(body)))
                                .unwrap(),
                        )
                    }
                });

                tokio::spawn(async move {
                    let _ = HyperServerBuilder::new(TokioExecutor::new())
                        .serve_connection(io, service)
                        .await;
                });
            }
        });

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path_suffix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with(path_suffix))
            .collect()
    }
}

pub const ACCOUNT_SID: &str = "AC123";
pub const AUTH_TOKEN: &str = "secret";
/// `Basic base64("AC123:secret")`.
pub const BASIC_AUTH: &str = "Basic QUMxMjM6c2VjcmV0";

pub fn empty_page(path: &str) -> String {
    if path.ends_with("/v1/Alerts") {
        r#"{"alerts": [], "meta": {"next_page_url": null}}"#.to_string()
    } else if path.ends_with("/Messages.json") {
        r#"{"messages": [], "next_page_uri": null}"#.to_string()
    } else {
        r#"{"calls": [], "next_page_uri": null}"#.to_string()
    }
}
