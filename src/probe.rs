//! Best-effort calls to optional services
//!
//! Optional enrichments never fail a request. Every error and every timeout
//! collapses into [`Probe::Unavailable`] and is logged, so callers always take
//! a defined default path.

use crate::error::RouterError;
use crate::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Success(T),
    Unavailable,
}

impl<T> Probe<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Probe::Success(value) => Some(value),
            Probe::Unavailable => None,
        }
    }

    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.into_option().unwrap_or_default()
    }
}

impl<T> Probe<Option<T>> {
    /// A service that answered with nothing usable counts as unavailable
    pub fn flatten(self) -> Probe<T> {
        match self {
            Probe::Success(Some(value)) => Probe::Success(value),
            _ => Probe::Unavailable,
        }
    }
}

/// Run `call` with a time limit, swallowing any failure.
pub async fn best_effort<T, F>(service: &'static str, limit: Duration, call: F) -> Probe<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Probe::Success(value),
        Ok(Err(error)) => {
            warn!(service, %error, "Optional service failed, continuing without it");
            Probe::Unavailable
        }
        Err(_) => {
            let error = RouterError::timeout(service, limit);
            warn!(service, %error, "Optional service timed out, continuing without it");
            Probe::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_passes_through() {
        let probe = best_effort("test", Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(probe, Probe::Success(7));
    }

    #[tokio::test]
    async fn test_error_is_swallowed() {
        let probe: Probe<u32> = best_effort("test", Duration::from_secs(1), async {
            Err(RouterError::service("test", "connection refused"))
        })
        .await;

        assert_eq!(probe, Probe::Unavailable);
    }

    #[tokio::test]
    async fn test_timeout_is_swallowed() {
        let probe = best_effort("test", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late")
        })
        .await;

        assert_eq!(probe, Probe::Unavailable);
    }

    #[test]
    fn test_flatten_and_defaults() {
        assert_eq!(Probe::Success(Some(1)).flatten(), Probe::Success(1));
        assert_eq!(Probe::<Option<i32>>::Success(None).flatten(), Probe::Unavailable);
        assert_eq!(Probe::<String>::Unavailable.unwrap_or_default(), "");
    }
}
