#![allow(dead_code)]

use axum::extract::ConnectInfo;
use chrono::Utc;
use resume_tracker::application::services::{
    ActivityLogger, DefaultTargetService, KeyDefaults, RedirectService,
};
use resume_tracker::domain::entities::{NewActivity, RedirectKey, RedirectRecord};
use resume_tracker::domain::repositories::{ProfileRepository, RedirectRepository};
use resume_tracker::infrastructure::memory::{MemoryProfileRepository, MemoryRedirectRepository};
use resume_tracker::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;

pub const DEFAULT_USER: &str = "JerrenSaunders";
pub const DEFAULT_COMPANY: &str = "Unknown";

/// In-memory stores behind a test [`AppState`].
pub struct TestStores {
    pub redirects: Arc<MemoryRedirectRepository>,
    pub profiles: Arc<MemoryProfileRepository>,
}

impl TestStores {
    pub async fn set_profile(&self, user: &str, url: &str) {
        self.profiles.upsert(user, url).await.unwrap();
    }

    pub async fn set_target(&self, user: &str, company: &str, job_id: &str, url: &str) {
        self.redirects
            .set_target(&RedirectKey::new(user, company, job_id), url, Utc::now())
            .await
            .unwrap();
    }

    pub async fn record(&self, user: &str, company: &str, job_id: &str) -> Option<RedirectRecord> {
        self.redirects
            .find(&RedirectKey::new(user, company, job_id))
            .await
            .unwrap()
    }

    /// Polls until the record has a target or the timeout passes.
    pub async fn wait_for_target(
        &self,
        user: &str,
        company: &str,
        job_id: &str,
    ) -> Option<String> {
        for _ in 0..50 {
            if let Some(target) = self
                .record(user, company, job_id)
                .await
                .and_then(|r| r.target().map(str::to_string))
            {
                return Some(target);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }
}

pub fn create_redirect_service(stores: &TestStores) -> RedirectService {
    let redirects: Arc<dyn RedirectRepository> = stores.redirects.clone();
    let profiles: Arc<dyn ProfileRepository> = stores.profiles.clone();

    RedirectService::new(
        redirects.clone(),
        DefaultTargetService::new(redirects, profiles),
        KeyDefaults {
            user: DEFAULT_USER.to_string(),
            company: DEFAULT_COMPANY.to_string(),
        },
    )
}

pub fn create_test_state() -> (AppState, mpsc::Receiver<NewActivity>, TestStores) {
    let stores = TestStores {
        redirects: Arc::new(MemoryRedirectRepository::new()),
        profiles: Arc::new(MemoryProfileRepository::new()),
    };
    let (tx, rx) = mpsc::channel(100);

    let state = AppState::new(
        Arc::new(create_redirect_service(&stores)),
        ActivityLogger::new(tx),
        false,
    );

    (state, rx, stores)
}

/// Inserts a fixed peer address, standing in for
/// `into_make_service_with_connect_info`.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
