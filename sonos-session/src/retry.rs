//! Timeout and bounded retry around remote calls
//!
//! Transient failures (network errors, timeouts, UPnP faults 701/714/716)
//! are retried after each delay in [`RetryPolicy::retry_delays`]. Anything
//! else fails immediately.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, SessionError};
use crate::session::{DeviceSession, SessionConnector};
use crate::types::{PlayMode, TrackInfo, TransportState, ZoneGroup, ZoneInfo};

/// Timeout and backoff applied to every remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound for a single attempt
    pub call_timeout: Duration,

    /// Delay before each retry; the length bounds the number of retries
    pub retry_delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
            retry_delays: [200, 500, 1000]
                .into_iter()
                .map(Duration::from_millis)
                .collect(),
        }
    }
}

impl RetryPolicy {
    /// Single attempt with the given timeout
    pub fn no_retry(call_timeout: Duration) -> Self {
        Self {
            call_timeout,
            retry_delays: Vec::new(),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.retry_delays.len() + 1
    }

    /// Run `operation` under this policy
    ///
    /// With `retryable == false` the call gets the timeout but only one attempt.
    pub async fn run<T, F, Fut>(&self, action: &'static str, retryable: bool, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let delays: &[Duration] = if retryable { &self.retry_delays } else { &[] };
        let mut attempt = 0;

        loop {
            let outcome = match tokio::time::timeout(self.call_timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(SessionError::Timeout { action }),
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => e,
                Err(e) => return Err(e),
            };

            let Some(delay) = delays.get(attempt) else {
                tracing::warn!("{} failed after {} attempt(s): {}", action, attempt + 1, error);
                return Err(error);
            };
            attempt += 1;

            tracing::info!(
                "Retrying {} (attempt {}/{}) after {:?}: {}",
                action,
                attempt + 1,
                delays.len() + 1,
                delay,
                error
            );
            tokio::time::sleep(*delay).await;
        }
    }
}

/// [`DeviceSession`] decorator applying a [`RetryPolicy`] to every call
///
/// `next` and `previous` are never retried: repeating a skip that reached the
/// device but lost its response would skip twice.
#[derive(Debug, Clone)]
pub struct ResilientSession<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: DeviceSession> ResilientSession<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: DeviceSession> DeviceSession for ResilientSession<S> {
    async fn name(&self) -> Result<String> {
        self.policy.run("GetZoneAttributes", true, || self.inner.name()).await
    }

    async fn volume(&self) -> Result<u8> {
        self.policy.run("GetVolume", true, || self.inner.volume()).await
    }

    async fn current_state(&self) -> Result<TransportState> {
        self.policy
            .run("GetTransportInfo", true, || self.inner.current_state())
            .await
    }

    async fn current_track(&self) -> Result<TrackInfo> {
        self.policy
            .run("GetPositionInfo", true, || self.inner.current_track())
            .await
    }

    async fn play_mode(&self) -> Result<PlayMode> {
        self.policy
            .run("GetTransportSettings", true, || self.inner.play_mode())
            .await
    }

    async fn all_groups(&self) -> Result<Vec<ZoneGroup>> {
        self.policy
            .run("GetZoneGroupState", true, || self.inner.all_groups())
            .await
    }

    async fn zone_info(&self) -> Result<ZoneInfo> {
        self.policy.run("GetZoneInfo", true, || self.inner.zone_info()).await
    }

    async fn supports_fixed_volume(&self) -> Result<bool> {
        self.policy
            .run("GetSupportsOutputFixed", true, || self.inner.supports_fixed_volume())
            .await
    }

    async fn fixed_volume(&self) -> Result<bool> {
        self.policy
            .run("GetOutputFixed", true, || self.inner.fixed_volume())
            .await
    }

    async fn crossfade_mode(&self) -> Result<bool> {
        self.policy
            .run("GetCrossfadeMode", true, || self.inner.crossfade_mode())
            .await
    }

    async fn play(&self) -> Result<()> {
        self.policy.run("Play", true, || self.inner.play()).await
    }

    async fn pause(&self) -> Result<()> {
        self.policy.run("Pause", true, || self.inner.pause()).await
    }

    async fn set_volume(&self, volume: u8) -> Result<()> {
        self.policy
            .run("SetVolume", true, || self.inner.set_volume(volume))
            .await
    }

    async fn set_play_mode(&self, mode: PlayMode) -> Result<()> {
        self.policy
            .run("SetPlayMode", true, || self.inner.set_play_mode(mode))
            .await
    }

    async fn seek(&self, position_secs: u64) -> Result<()> {
        self.policy
            .run("Seek", true, || self.inner.seek(position_secs))
            .await
    }

    async fn next(&self) -> Result<()> {
        self.policy.run("Next", false, || self.inner.next()).await
    }

    async fn previous(&self) -> Result<()> {
        self.policy.run("Previous", false, || self.inner.previous()).await
    }

    async fn leave_group(&self) -> Result<()> {
        self.policy
            .run("BecomeCoordinatorOfStandaloneGroup", true, || self.inner.leave_group())
            .await
    }

    async fn join_group(&self, coordinator_id: &str) -> Result<()> {
        self.policy
            .run("SetAVTransportURI", true, || self.inner.join_group(coordinator_id))
            .await
    }

    async fn set_crossfade_mode(&self, enabled: bool) -> Result<()> {
        self.policy
            .run("SetCrossfadeMode", true, || self.inner.set_crossfade_mode(enabled))
            .await
    }
}

/// Connector whose sessions are wrapped in [`ResilientSession`]
pub struct ResilientConnector<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: SessionConnector> ResilientConnector<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<C: SessionConnector> SessionConnector for ResilientConnector<C> {
    async fn connect(&self, address: &str) -> Result<Arc<dyn DeviceSession>> {
        let session = self.inner.connect(address).await?;
        Ok(Arc::new(ResilientSession::new(session, self.policy.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            call_timeout: Duration::from_secs(1),
            retry_delays: vec![Duration::from_millis(10), Duration::from_millis(20)],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_until_success() {
        let calls = AtomicUsize::new(0);
        let result = fast_policy()
            .run("Play", true, || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(SessionError::Fault(701))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_last_delay() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = fast_policy()
            .run("Play", true, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(SessionError::Network("unreachable".into())) }
            })
            .await;

        assert!(matches!(result, Err(SessionError::Network(_))));
        assert_eq!(calls.load(Ordering::SeqCst), fast_policy().max_attempts());
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = fast_policy()
            .run("SetVolume", true, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(SessionError::Fault(402)) }
            })
            .await;

        assert_eq!(result, Err(SessionError::Fault(402)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_gets_single_attempt() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = fast_policy()
            .run("Next", false, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(SessionError::Fault(701)) }
            })
            .await;

        assert_eq!(result, Err(SessionError::Fault(701)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_call_times_out() {
        let policy = RetryPolicy::no_retry(Duration::from_millis(50));
        let result: Result<()> = policy
            .run("GetVolume", true, || std::future::pending::<Result<()>>())
            .await;

        assert_eq!(result, Err(SessionError::Timeout { action: "GetVolume" }));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.call_timeout, Duration::from_secs(5));
        assert_eq!(policy.max_attempts(), 4);
    }
}
