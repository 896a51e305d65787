//! Per-card resolution state machine.

use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::debug;

use tubegrid_models::FileCode;

use crate::policy::PollPolicy;
use crate::probe::{ImageProbe, StatusProbe};

/// Resolution state of one video card.
///
/// Transitions are monotonic: primary, then fallback, then polling, then a
/// terminal state. A successful poll promotes the pending placeholder to a
/// real image; nothing ever moves backward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardState {
    Unattempted,
    PrimaryLoading,
    FallbackLoading,
    Polling { attempt: u32 },
    Resolved { url: String },
    PlaceholderFinal,
}

impl CardState {
    /// Terminal states are never left; the card stays visible as-is.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CardState::Resolved { .. } | CardState::PlaceholderFinal)
    }
}

/// Everything needed to resolve one card's thumbnail.
#[derive(Debug, Clone)]
pub struct CardRequest {
    pub file_code: FileCode,
    /// Primary image URL, already routed through the proxy.
    pub primary_url: Option<String>,
    /// Secondary image URL, already routed through the proxy.
    pub fallback_url: Option<String>,
}

/// Create a state channel for one card, starting at `Unattempted`.
pub fn state_channel() -> (watch::Sender<CardState>, watch::Receiver<CardState>) {
    watch::channel(CardState::Unattempted)
}

/// Drives one card from `Unattempted` to a terminal state.
pub struct CardResolver<I, S> {
    image: I,
    status: S,
    policy: PollPolicy,
}

impl<I: ImageProbe, S: StatusProbe> CardResolver<I, S> {
    pub fn new(image: I, status: S, policy: PollPolicy) -> Self {
        Self {
            image,
            status,
            policy,
        }
    }

    /// Resolve one card, publishing each transition on `state`.
    ///
    /// Re-invoking on an already-resolved card is a no-op. Always returns a
    /// terminal state; the poll budget and the load guard bound every path.
    pub async fn resolve(
        &self,
        req: &CardRequest,
        state: &watch::Sender<CardState>,
    ) -> CardState {
        if let CardState::Resolved { url } = &*state.borrow() {
            return CardState::Resolved { url: url.clone() };
        }

        if let Some(url) = req.primary_url.as_deref() {
            state.send_replace(CardState::PrimaryLoading);
            if self.try_load(url).await {
                return self.finish(state, CardState::Resolved { url: url.to_string() });
            }
            debug!(code = %req.file_code, "primary thumbnail failed");
        }

        if let Some(url) = req.fallback_url.as_deref() {
            // A fallback identical to the primary has already been tried.
            if req.primary_url.as_deref() != Some(url) {
                state.send_replace(CardState::FallbackLoading);
                if self.try_load(url).await {
                    return self.finish(state, CardState::Resolved { url: url.to_string() });
                }
                debug!(code = %req.file_code, "fallback thumbnail failed");
            }
        }

        self.poll(req, state).await
    }

    /// The polling tier: ask the status endpoint until a thumbnail appears
    /// or the attempt budget runs out.
    async fn poll(&self, req: &CardRequest, state: &watch::Sender<CardState>) -> CardState {
        for attempt in 1..=self.policy.max_attempts {
            state.send_replace(CardState::Polling { attempt });

            match self.status.check(&req.file_code).await {
                Ok(thumb) if thumb.has_thumbnail => {
                    if let Some(url) = thumb.best_url() {
                        debug!(code = %req.file_code, attempt, "thumbnail ready");
                        return self
                            .finish(state, CardState::Resolved { url: url.to_string() });
                    }
                    // Claimed ready without a usable URL; keep polling.
                }
                Ok(_) => {
                    debug!(code = %req.file_code, attempt, "still processing");
                }
                Err(e) => {
                    // Transient endpoint failure burns an attempt rather
                    // than extending the budget.
                    debug!(code = %req.file_code, attempt, error = %e, "status poll failed");
                }
            }

            if attempt < self.policy.max_attempts {
                sleep(self.policy.backoff).await;
            }
        }

        self.finish(state, CardState::PlaceholderFinal)
    }

    async fn try_load(&self, url: &str) -> bool {
        match timeout(self.policy.load_guard, self.image.load(url)).await {
            Ok(Ok(())) => true,
            Ok(Err(_)) | Err(_) => false,
        }
    }

    fn finish(&self, state: &watch::Sender<CardState>, terminal: CardState) -> CardState {
        state.send_replace(terminal.clone());
        terminal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tubegrid_models::ThumbnailStatus;

    /// Image probe scripted per-URL: listed URLs load, everything else fails.
    struct ScriptedImage {
        loadable: Vec<String>,
        calls: AtomicU32,
    }

    impl ScriptedImage {
        fn loading(urls: &[&str]) -> Self {
            Self {
                loadable: urls.iter().map(|s| s.to_string()).collect(),
                calls: AtomicU32::new(0),
            }
        }

        fn none() -> Self {
            Self::loading(&[])
        }
    }

    #[async_trait]
    impl ImageProbe for &ScriptedImage {
        async fn load(&self, url: &str) -> Result<(), ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.loadable.iter().any(|u| u == url) {
                Ok(())
            } else {
                Err(ProbeError::Load("scripted failure".to_string()))
            }
        }
    }

    /// Image probe that never completes; exercises the load guard.
    struct HangingImage;

    #[async_trait]
    impl ImageProbe for HangingImage {
        async fn load(&self, _url: &str) -> Result<(), ProbeError> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    /// Status probe replaying a script; repeats the last entry when drained.
    struct ScriptedStatus {
        script: Mutex<VecDeque<Result<ThumbnailStatus, ()>>>,
        calls: AtomicU32,
    }

    impl ScriptedStatus {
        fn new(script: Vec<Result<ThumbnailStatus, ()>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn always_processing() -> Self {
            Self::new(vec![])
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn processing() -> Result<ThumbnailStatus, ()> {
        Ok(ThumbnailStatus {
            has_thumbnail: false,
            is_processing: true,
            primary: None,
            fallback: None,
        })
    }

    fn ready(url: &str) -> Result<ThumbnailStatus, ()> {
        Ok(ThumbnailStatus {
            has_thumbnail: true,
            is_processing: false,
            primary: Some(url.to_string()),
            fallback: None,
        })
    }

    #[async_trait]
    impl StatusProbe for &ScriptedStatus {
        async fn check(&self, _code: &FileCode) -> Result<ThumbnailStatus, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(status)) => Ok(status),
                Some(Err(())) => Err(ProbeError::Timeout),
                None => Ok(ThumbnailStatus {
                    has_thumbnail: false,
                    is_processing: true,
                    primary: None,
                    fallback: None,
                }),
            }
        }
    }

    fn request() -> CardRequest {
        CardRequest {
            file_code: FileCode::parse("abc123xy").unwrap(),
            primary_url: Some("/api/proxy-thumb?url=primary".to_string()),
            fallback_url: Some("/api/proxy-thumb?url=fallback".to_string()),
        }
    }

    fn fast_policy() -> PollPolicy {
        PollPolicy::default()
            .with_backoff(Duration::from_millis(10))
            .with_load_guard(Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn primary_success_skips_everything_else() {
        let image = ScriptedImage::loading(&["/api/proxy-thumb?url=primary"]);
        let status = ScriptedStatus::always_processing();
        let resolver = CardResolver::new(&image, &status, fast_policy());
        let (tx, _rx) = state_channel();

        let state = resolver.resolve(&request(), &tx).await;

        assert_eq!(
            state,
            CardState::Resolved {
                url: "/api/proxy-thumb?url=primary".to_string()
            }
        );
        assert_eq!(image.calls.load(Ordering::SeqCst), 1);
        assert_eq!(status.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_is_tried_after_primary_failure() {
        let image = ScriptedImage::loading(&["/api/proxy-thumb?url=fallback"]);
        let status = ScriptedStatus::always_processing();
        let resolver = CardResolver::new(&image, &status, fast_policy());
        let (tx, _rx) = state_channel();

        let state = resolver.resolve(&request(), &tx).await;

        assert_eq!(
            state,
            CardState::Resolved {
                url: "/api/proxy-thumb?url=fallback".to_string()
            }
        );
        assert_eq!(image.calls.load(Ordering::SeqCst), 2);
        assert_eq!(status.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn three_processing_then_ready_makes_exactly_four_calls() {
        let image = ScriptedImage::none();
        let status = ScriptedStatus::new(vec![
            processing(),
            processing(),
            processing(),
            ready("https://cdn/Y.jpg"),
        ]);
        let resolver = CardResolver::new(&image, &status, fast_policy());
        let (tx, _rx) = state_channel();

        let state = resolver.resolve(&request(), &tx).await;

        assert_eq!(
            state,
            CardState::Resolved {
                url: "https://cdn/Y.jpg".to_string()
            }
        );
        assert_eq!(status.call_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn promotion_on_early_attempt_stops_polling() {
        let image = ScriptedImage::none();
        let status = ScriptedStatus::new(vec![processing(), ready("https://cdn/X.jpg")]);
        let resolver = CardResolver::new(&image, &status, fast_policy().with_max_attempts(6));
        let (tx, rx) = state_channel();

        let state = resolver.resolve(&request(), &tx).await;

        assert_eq!(
            state,
            CardState::Resolved {
                url: "https://cdn/X.jpg".to_string()
            }
        );
        assert_eq!(status.call_count(), 2);
        assert!(rx.borrow().is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_ends_in_placeholder() {
        let image = ScriptedImage::none();
        let status = ScriptedStatus::always_processing();
        let resolver = CardResolver::new(&image, &status, fast_policy().with_max_attempts(5));
        let (tx, rx) = state_channel();

        let state = resolver.resolve(&request(), &tx).await;

        assert_eq!(state, CardState::PlaceholderFinal);
        assert_eq!(status.call_count(), 5);
        assert!(rx.borrow().is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn status_errors_burn_attempts_and_still_terminate() {
        let image = ScriptedImage::none();
        let status = ScriptedStatus::new(vec![Err(()), Err(()), Err(())]);
        let resolver = CardResolver::new(&image, &status, fast_policy().with_max_attempts(3));
        let (tx, _rx) = state_channel();

        let state = resolver.resolve(&request(), &tx).await;

        assert_eq!(state, CardState::PlaceholderFinal);
        assert_eq!(status.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_image_load_hits_the_guard_and_proceeds() {
        let status = ScriptedStatus::new(vec![ready("https://cdn/late.jpg")]);
        let resolver = CardResolver::new(HangingImage, &status, fast_policy());
        let (tx, _rx) = state_channel();

        let state = resolver.resolve(&request(), &tx).await;

        assert_eq!(
            state,
            CardState::Resolved {
                url: "https://cdn/late.jpg".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn resolving_a_resolved_card_is_a_noop() {
        let image = ScriptedImage::none();
        let status = ScriptedStatus::always_processing();
        let resolver = CardResolver::new(&image, &status, fast_policy());
        let (tx, _rx) = state_channel();
        tx.send_replace(CardState::Resolved {
            url: "https://cdn/done.jpg".to_string(),
        });

        let state = resolver.resolve(&request(), &tx).await;

        assert_eq!(
            state,
            CardState::Resolved {
                url: "https://cdn/done.jpg".to_string()
            }
        );
        assert_eq!(image.calls.load(Ordering::SeqCst), 0);
        assert_eq!(status.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_urls_go_straight_to_polling() {
        let image = ScriptedImage::none();
        let status = ScriptedStatus::new(vec![ready("https://cdn/only.jpg")]);
        let resolver = CardResolver::new(&image, &status, fast_policy());
        let (tx, _rx) = state_channel();

        let req = CardRequest {
            file_code: FileCode::parse("abc123xy").unwrap(),
            primary_url: None,
            fallback_url: None,
        };
        let state = resolver.resolve(&req, &tx).await;

        assert_eq!(
            state,
            CardState::Resolved {
                url: "https://cdn/only.jpg".to_string()
            }
        );
        assert_eq!(image.calls.load(Ordering::SeqCst), 0);
        assert_eq!(status.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_fallback_is_not_retried() {
        let image = ScriptedImage::none();
        let status = ScriptedStatus::always_processing();
        let resolver = CardResolver::new(&image, &status, fast_policy().with_max_attempts(1));
        let (tx, _rx) = state_channel();

        let req = CardRequest {
            file_code: FileCode::parse("abc123xy").unwrap(),
            primary_url: Some("/same".to_string()),
            fallback_url: Some("/same".to_string()),
        };
        resolver.resolve(&req, &tx).await;

        assert_eq!(image.calls.load(Ordering::SeqCst), 1);
    }
}
