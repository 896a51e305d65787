//! Keyed reconciliation of card resolutions across list refreshes.
//!
//! The grid view re-fetches the whole video list every 10-15s. Cards are
//! tracked by file code: a refresh starts resolution only for codes that
//! just appeared, cancels in-flight work for codes that disappeared, and
//! leaves already-resolved cards untouched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use tubegrid_models::FileCode;

use crate::card::{state_channel, CardRequest, CardResolver, CardState};
use crate::probe::{ImageProbe, StatusProbe};

struct CardEntry {
    token: CancellationToken,
    state: watch::Receiver<CardState>,
    task: JoinHandle<()>,
}

/// Owns one resolution task per visible card.
pub struct GridResolver<I, S> {
    resolver: Arc<CardResolver<I, S>>,
    cards: Mutex<HashMap<FileCode, CardEntry>>,
}

impl<I, S> GridResolver<I, S>
where
    I: ImageProbe + Send + Sync + 'static,
    S: StatusProbe + Send + Sync + 'static,
{
    pub fn new(resolver: CardResolver<I, S>) -> Self {
        Self {
            resolver: Arc::new(resolver),
            cards: Mutex::new(HashMap::new()),
        }
    }

    /// Reconcile the tracked set against a freshly fetched list.
    ///
    /// Codes no longer in the list have their tasks cancelled promptly, so a
    /// pending backoff timer never fires for a card that left the view.
    pub async fn sync(&self, requests: Vec<CardRequest>) {
        let mut cards = self.cards.lock().await;

        let visible: HashSet<FileCode> =
            requests.iter().map(|r| r.file_code.clone()).collect();

        cards.retain(|code, entry| {
            if visible.contains(code) {
                true
            } else {
                debug!(code = %code, "card left the view, cancelling");
                entry.token.cancel();
                entry.task.abort();
                false
            }
        });

        for req in requests {
            if cards.contains_key(&req.file_code) {
                continue;
            }
            let code = req.file_code.clone();
            debug!(code = %code, "new card, starting resolution");
            cards.insert(code, self.spawn(req));
        }
    }

    fn spawn(&self, req: CardRequest) -> CardEntry {
        let (tx, rx) = state_channel();
        let token = CancellationToken::new();
        let child = token.clone();
        let resolver = Arc::clone(&self.resolver);

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = child.cancelled() => {}
                _ = resolver.resolve(&req, &tx) => {}
            }
        });

        CardEntry {
            token,
            state: rx,
            task,
        }
    }

    /// Current state of one tracked card.
    pub async fn state_of(&self, code: &FileCode) -> Option<CardState> {
        let cards = self.cards.lock().await;
        cards.get(code).map(|e| e.state.borrow().clone())
    }

    /// Current state of every tracked card.
    pub async fn snapshot(&self) -> HashMap<FileCode, CardState> {
        let cards = self.cards.lock().await;
        cards
            .iter()
            .map(|(code, e)| (code.clone(), e.state.borrow().clone()))
            .collect()
    }

    /// Wait until a tracked card reaches a terminal state.
    ///
    /// Returns the last observed state if the card's task was cancelled.
    pub async fn wait_terminal(&self, code: &FileCode) -> Option<CardState> {
        let mut rx = {
            let cards = self.cards.lock().await;
            cards.get(code)?.state.clone()
        };
        loop {
            let current = rx.borrow_and_update().clone();
            if current.is_terminal() {
                return Some(current);
            }
            if rx.changed().await.is_err() {
                return Some(rx.borrow().clone());
            }
        }
    }

    /// Cancel all in-flight resolutions.
    pub async fn shutdown(&self) {
        let mut cards = self.cards.lock().await;
        for (_, entry) in cards.drain() {
            entry.token.cancel();
            entry.task.abort();
        }
    }
}
