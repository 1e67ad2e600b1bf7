use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::AppError;
use crate::AppState;

/// Budget for one client on one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl WindowPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_requests: config.rate_limit_max,
            window: Duration::from_secs(config.rate_limit_window_secs),
        }
    }
}

/// Login, register and refresh each get their own budget per address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey {
    pub ip: IpAddr,
    pub route: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    opened_at: Instant,
    used: u32,
}

impl Window {
    fn expired(&self, policy: &WindowPolicy, now: Instant) -> bool {
        now.saturating_duration_since(self.opened_at) >= policy.window
    }
}

/// Process-local fixed-window limiter. Instances behind a load balancer
/// each keep their own counts.
#[derive(Clone)]
pub struct RateLimitState {
    policy: WindowPolicy,
    windows: Arc<Mutex<HashMap<ClientKey, Window>>>,
}

impl RateLimitState {
    pub fn new(policy: WindowPolicy) -> Self {
        Self {
            policy,
            windows: Arc::default(),
        }
    }

    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    pub async fn check(&self, key: ClientKey) -> Decision {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: ClientKey, now: Instant) -> Decision {
        let policy = self.policy;
        let mut windows = self.windows.lock().await;
        let window = windows.entry(key).or_insert(Window {
            opened_at: now,
            used: 0,
        });

        if window.expired(&policy, now) {
            *window = Window {
                opened_at: now,
                used: 0,
            };
        }

        if window.used < policy.max_requests {
            window.used += 1;
            return Decision::Allowed {
                remaining: policy.max_requests - window.used,
            };
        }

        let elapsed = now.saturating_duration_since(window.opened_at);
        Decision::Limited {
            retry_after: policy.window.saturating_sub(elapsed),
        }
    }

    /// Forget windows that have expired. Returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now()).await
    }

    async fn purge_expired_at(&self, now: Instant) -> usize {
        let policy = self.policy;
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, window| !window.expired(&policy, now));
        before - windows.len()
    }

    pub fn spawn_cleanup_worker(&self) {
        let limiter = self.clone();
        let every = self.policy.window * 5;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let purged = limiter.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "Rate limiter: dropped expired windows");
                }
            }
        });
    }
}

/// Whole seconds a client should wait, never less than one.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

/// Applies the auth budget per client address and route.
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = ClientKey {
        ip: addr.ip(),
        route: req.uri().path().to_string(),
    };

    match state.rate_limiter.check(key.clone()).await {
        Decision::Allowed { remaining } => {
            tracing::debug!(ip = %key.ip, route = %key.route, remaining, "Auth request admitted");
            Ok(next.run(req).await)
        }
        Decision::Limited { retry_after } => {
            let retry_after_secs = retry_after_secs(retry_after);
            tracing::warn!(
                ip = %key.ip,
                route = %key.route,
                retry_after_secs,
                "Auth request rate limited"
            );
            Err(AppError::RateLimited { retry_after_secs })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimitState {
        RateLimitState::new(WindowPolicy {
            max_requests,
            window: Duration::from_secs(window_secs),
        })
    }

    fn key(ip: &str, route: &str) -> ClientKey {
        ClientKey {
            ip: ip.parse().unwrap(),
            route: route.into(),
        }
    }

    #[tokio::test]
    async fn test_budget_counts_down_then_limits() {
        let limiter = limiter(3, 60);
        let login = key("10.0.0.1", "/api/auth/login");
        let t0 = Instant::now();

        for remaining in [2, 1, 0] {
            assert_eq!(
                limiter.check_at(login.clone(), t0).await,
                Decision::Allowed { remaining }
            );
        }
        assert_eq!(
            limiter.check_at(login, t0 + Duration::from_secs(20)).await,
            Decision::Limited {
                retry_after: Duration::from_secs(40)
            }
        );
    }

    #[tokio::test]
    async fn test_window_reopens_after_it_elapses() {
        let limiter = limiter(1, 60);
        let login = key("10.0.0.1", "/api/auth/login");
        let t0 = Instant::now();

        limiter.check_at(login.clone(), t0).await;
        assert!(matches!(
            limiter.check_at(login.clone(), t0 + Duration::from_secs(59)).await,
            Decision::Limited { .. }
        ));
        assert_eq!(
            limiter.check_at(login, t0 + Duration::from_secs(60)).await,
            Decision::Allowed { remaining: 0 }
        );
    }

    #[tokio::test]
    async fn test_budgets_are_per_address_and_route() {
        let limiter = limiter(1, 60);
        let t0 = Instant::now();

        limiter.check_at(key("10.0.0.1", "/api/auth/login"), t0).await;
        assert!(matches!(
            limiter.check_at(key("10.0.0.1", "/api/auth/register"), t0).await,
            Decision::Allowed { .. }
        ));
        assert!(matches!(
            limiter.check_at(key("10.0.0.2", "/api/auth/login"), t0).await,
            Decision::Allowed { .. }
        ));
    }

    #[tokio::test]
    async fn test_purge_drops_only_expired_windows() {
        let limiter = limiter(5, 60);
        let t0 = Instant::now();

        limiter.check_at(key("10.0.0.1", "/a"), t0).await;
        limiter
            .check_at(key("10.0.0.2", "/a"), t0 + Duration::from_secs(30))
            .await;

        assert_eq!(limiter.purge_expired_at(t0 + Duration::from_secs(61)).await, 1);
        assert_eq!(limiter.purge_expired_at(t0 + Duration::from_secs(61)).await, 0);
    }

    #[test]
    fn test_retry_after_rounds_up_to_whole_seconds() {
        assert_eq!(retry_after_secs(Duration::from_millis(1500)), 2);
        assert_eq!(retry_after_secs(Duration::from_secs(40)), 40);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }
}
