#![allow(dead_code)]

use async_trait::async_trait;
use core_logic::{ClientConfig, Outcome, RetryPolicy, RunObserver};
use sky_cr::{ApiRequest, ApiResponse, Credential, SessionClient, Transport, TransportError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "https://live.radiance.thatgamecompany.com";

type Responder = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync>;

/// Transport that records every request and answers from a script, then a responder.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    responder: Responder,
    calls: Mutex<Vec<ApiRequest>>,
    closed: AtomicBool,
}

impl ScriptedTransport {
    pub fn responding<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    {
        Self::scripted(Vec::new(), responder)
    }

    pub fn scripted<F>(script: Vec<Result<ApiResponse, TransportError>>, responder: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }

    pub fn always(status: u16, body: &'static str) -> Arc<Self> {
        Self::responding(move |_| Ok(ApiResponse::new(status, body)))
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Request paths in call order, relative to the base URL.
    pub fn paths(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|r| r.url.trim_start_matches(BASE_URL).to_string())
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.calls.lock().unwrap().push(request.clone());
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        (self.responder)(&request)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

pub fn path_of(request: &ApiRequest) -> &str {
    request.url.trim_start_matches(BASE_URL)
}

pub fn ok(body: &str) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::new(200, body))
}

pub fn status(code: u16) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::new(code, ""))
}

pub fn credential() -> Credential {
    Credential::new("sess-token", "user-42").unwrap()
}

/// Session client over `transport` with zero backoff.
pub fn session(transport: Arc<ScriptedTransport>, max_retries: u32) -> SessionClient {
    let config = ClientConfig {
        max_retries,
        ..Default::default()
    };
    SessionClient::with_transport(credential(), &config, transport)
        .unwrap()
        .with_retry_policy(RetryPolicy::new(max_retries).with_backoff_unit(Duration::ZERO))
}

#[derive(Default)]
pub struct Recorder {
    pub results: Mutex<Vec<(String, Outcome)>>,
    pub progress: Mutex<Vec<(usize, usize)>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn results(&self) -> Vec<(String, Outcome)> {
        self.results.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<(usize, usize)> {
        self.progress.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<(String, Outcome)> {
        self.results()
            .into_iter()
            .filter(|(_, o)| !o.is_success())
            .collect()
    }
}

impl RunObserver for Recorder {
    fn on_result(&self, label: &str, outcome: &Outcome) {
        self.results
            .lock()
            .unwrap()
            .push((label.to_string(), outcome.clone()));
    }

    fn on_progress(&self, done: usize, total: usize) {
        self.progress.lock().unwrap().push((done, total));
    }
}
