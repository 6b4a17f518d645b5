// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::{future::Future, pin::Pin, time::Duration};

use super::errors::{classify, ErrorClassification, TunnelError};

const INITIAL_DELAY_MS: u64 = 100;
const MAX_DELAY_MS: u64 = 12_800;

/// The retry engine's backoff/attempt-count state for a single `ConnectSession`
/// call (C6). Never shared across connector instances or calls; recreated at
/// the top of every `connect_session`.
struct RetryEngine {
    attempt: u32,
    delay_ms: u64,
    token_already_refreshed: bool,
    min_delay_streak: u32,
}

enum RetryOutcome {
    RetryImmediately { refresh_token: bool },
    RetryAfter(Duration),
    Stop,
}

impl RetryEngine {
    fn new() -> Self {
        RetryEngine {
            attempt: 0,
            delay_ms: INITIAL_DELAY_MS,
            token_already_refreshed: false,
            min_delay_streak: 0,
        }
    }

    fn next_backoff(&mut self) -> Duration {
        let delay = self.delay_ms;
        self.delay_ms = (self.delay_ms.saturating_mul(2)).min(MAX_DELAY_MS);
        Duration::from_millis(delay)
    }

    fn on_failure(&mut self, error: &TunnelError) -> RetryOutcome {
        self.attempt += 1;

        match classify(error, self.token_already_refreshed) {
            ErrorClassification::RefreshTokenAndRetry => {
                self.token_already_refreshed = true;
                self.min_delay_streak = 0;
                RetryOutcome::RetryImmediately {
                    refresh_token: true,
                }
            }
            ErrorClassification::FallBackToFreshConnect => {
                self.min_delay_streak = 0;
                RetryOutcome::RetryImmediately {
                    refresh_token: false,
                }
            }
            ErrorClassification::RetryWithBackoff => {
                self.min_delay_streak = 0;
                RetryOutcome::RetryAfter(self.next_backoff())
            }
            ErrorClassification::RetryWithMinDelay {
                min_delay_ms,
                max_attempts,
            } => {
                self.min_delay_streak += 1;
                if self.min_delay_streak >= max_attempts {
                    return RetryOutcome::Stop;
                }
                let delay = self.next_backoff().max(Duration::from_millis(min_delay_ms));
                RetryOutcome::RetryAfter(delay)
            }
            ErrorClassification::Fatal => RetryOutcome::Stop,
        }
    }
}

/// What an observer decided after being told about an upcoming retry.
/// Mirrors the `Retrying` event's mutable `Retry`/`Delay` fields (spec §9's
/// "events with handler-set fields") as an explicit return value instead of
/// caller-mutated state.
pub(crate) enum RetryDecision {
    Retry(Duration),
    Cancel,
}

/// Observes retry attempts; may veto a retry or override its delay.
pub(crate) trait RetryObserver: Send + Sync {
    fn on_retrying(&self, attempt: u32, error: &TunnelError, proposed_delay: Duration) -> RetryDecision {
        let _ = (attempt, error);
        RetryDecision::Retry(proposed_delay)
    }
}

pub(crate) struct NoopRetryObserver;
impl RetryObserver for NoopRetryObserver {}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Drives the connect/reconnect loop (C6): create a stream, configure a
/// session on it; on failure, classify the error and either refresh the
/// token, fall back to a fresh connect, delay and retry, or give up.
///
/// `attempt` performs one connect try; `refresh_token` is invoked at most
/// once per call, on the first `Unauthorized`. If `enable_retry` is false,
/// any retryable failure is still surfaced immediately as an error (spec
/// §4.6 step 4: "if EnableRetry=false, force Retry=false").
pub(crate) async fn connect_session<'a, T>(
    enable_retry: bool,
    observer: &'a (dyn RetryObserver + 'a),
    mut refresh_token: impl FnMut() -> BoxFuture<'a, bool> + 'a,
    mut attempt: impl FnMut() -> BoxFuture<'a, Result<T, TunnelError>> + 'a,
) -> Result<T, TunnelError> {
    let mut engine = RetryEngine::new();

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => match engine.on_failure(&err) {
                RetryOutcome::Stop => return Err(err),
                RetryOutcome::RetryImmediately { refresh_token: should_refresh } => {
                    if should_refresh && !refresh_token().await {
                        return Err(err);
                    }
                    if !enable_retry {
                        return Err(err);
                    }
                    log::debug!("connect attempt {} failed ({err}), retrying immediately", engine.attempt);
                }
                RetryOutcome::RetryAfter(delay) => {
                    if !enable_retry {
                        return Err(err);
                    }
                    match observer.on_retrying(engine.attempt, &err, delay) {
                        RetryDecision::Cancel => return Err(err),
                        RetryDecision::Retry(delay) => {
                            log::debug!(
                                "connect attempt {} failed ({err}), retrying in {delay:?}",
                                engine.attempt
                            );
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU32, Ordering};

    use reqwest::StatusCode;
    use tokio::time::Instant;

    use super::*;

    fn boxed<T>(fut: impl Future<Output = T> + Send + 'static) -> BoxFuture<'static, T> {
        Box::pin(fut)
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_exponential_backoff_until_success() {
        let attempts = AtomicU32::new(0);
        let delays = std::sync::Mutex::new(Vec::new());
        let start = Instant::now();

        struct RecordingObserver<'a>(&'a std::sync::Mutex<Vec<Duration>>);
        impl RetryObserver for RecordingObserver<'_> {
            fn on_retrying(&self, _attempt: u32, _error: &TunnelError, proposed_delay: Duration) -> RetryDecision {
                self.0.lock().unwrap().push(proposed_delay);
                RetryDecision::Retry(proposed_delay)
            }
        }
        let observer = RecordingObserver(&delays);

        let result: Result<(), TunnelError> = connect_session(
            true,
            &observer,
            || boxed(async { false }),
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                boxed(async move {
                    if n < 3 {
                        Err(TunnelError::ConnectionLost("blip".into()))
                    } else {
                        Ok(())
                    }
                })
            },
        )
        .await;

        result.expect("expected eventual success");
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        assert_eq!(
            *delays.lock().unwrap(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
            ]
        );
        assert!(start.elapsed() >= Duration::from_millis(700));
    }

    #[tokio::test]
    async fn refreshes_token_at_most_once_per_call() {
        let refresh_calls = AtomicU32::new(0);
        let attempt_calls = AtomicU32::new(0);

        let result: Result<(), TunnelError> = connect_session(
            true,
            &NoopRetryObserver,
            || {
                refresh_calls.fetch_add(1, Ordering::SeqCst);
                boxed(async { true })
            },
            || {
                attempt_calls.fetch_add(1, Ordering::SeqCst);
                boxed(async { Err(TunnelError::Unauthorized { status: None }) })
            },
        )
        .await;

        assert!(matches!(result, Err(TunnelError::Unauthorized { .. })));
        assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(attempt_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn service_unavailable_stops_after_three_attempts_with_min_delay() {
        let attempts = AtomicU32::new(0);
        let delays = std::sync::Mutex::new(Vec::new());

        struct RecordingObserver<'a>(&'a std::sync::Mutex<Vec<Duration>>);
        impl RetryObserver for RecordingObserver<'_> {
            fn on_retrying(&self, _attempt: u32, _error: &TunnelError, proposed_delay: Duration) -> RetryDecision {
                self.0.lock().unwrap().push(proposed_delay);
                RetryDecision::Retry(proposed_delay)
            }
        }
        let observer = RecordingObserver(&delays);

        let result: Result<(), TunnelError> = connect_session(
            true,
            &observer,
            || boxed(async { false }),
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                boxed(async {
                    Err(TunnelError::ServiceNotAvailable {
                        status: Some(StatusCode::TOO_MANY_REQUESTS),
                    })
                })
            },
        )
        .await;

        assert!(matches!(result, Err(TunnelError::ServiceNotAvailable { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(delays.lock().unwrap().len(), 2);
        for delay in delays.lock().unwrap().iter() {
            assert!(*delay >= Duration::from_millis(6_400));
        }
    }

    #[tokio::test]
    async fn enable_retry_false_surfaces_first_retryable_failure() {
        let result: Result<(), TunnelError> = connect_session(
            false,
            &NoopRetryObserver,
            || boxed(async { false }),
            || boxed(async { Err(TunnelError::ConnectionLost("blip".into())) }),
        )
        .await;

        assert!(matches!(result, Err(TunnelError::ConnectionLost(_))));
    }
}
