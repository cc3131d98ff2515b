//! # Advisory Boundary
//!
//! Contract with the external text-generation service that explains a chord:
//! given a root and a quality it returns a musical theme, a four-chord
//! progression starting on the chord, and a short theoretical description.
//!
//! ## Sub-parts
//! - [`AdviceRequest`] - what is asked, and the prompt text sent for it
//! - [`AdviceSource`] - anything that can answer a request
//! - [`JsonAdviceSource`] - decodes a JSON reply from a caller-supplied transport
//! - [`fetch_advice`] - never fails; substitutes [`Advice::fallback`] on error
//! - [`AdviceDesk`] - runs requests on worker threads, last request wins
//!
//! ## Reply Format
//! ```json
//! {
//!   "theme": "Twilight longing",
//!   "progression": ["Fm7", "Bbm7", "Eb7", "Abmaj7"],
//!   "description": "A minor seventh softens the minor triad..."
//! }
//! ```
//!
//! The service knows nothing about the resolver; the only shared vocabulary is
//! the root name and the quality name.

use crate::chord::ChordQuality;
use crate::pitch::NoteName;
use crate::resolver::{resolve_symbol, ChordDefinition};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Number of chords in an advisory progression
pub const PROGRESSION_LENGTH: usize = 4;

const FALLBACK_THEME: &str = "Connection error";
const FALLBACK_DESCRIPTION: &str = "Could not reach the advisor for detailed advice.";
const UNKNOWN_CHORD: &str = "?";

/// Errors talking to the advisory service
#[derive(Error, Debug)]
pub enum AdviceError {
    #[error("Advisor unreachable: {0}")]
    Transport(String),

    #[error("Malformed advice: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Expected a progression of {expected} chords, got {found}")]
    ProgressionLength { expected: usize, found: usize },

    #[error("Advice field '{0}' is empty")]
    EmptyField(&'static str),
}

/// Descriptive text for a chord
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub theme: String,
    pub progression: Vec<String>,
    pub description: String,
}

impl Advice {
    /// Advice shown when the service cannot be reached: the progression keeps the
    /// chord's root as its first entry and "?" for the rest.
    ///
    /// # Example
    /// ```
    /// use harmonia::advisor::Advice;
    /// use harmonia::pitch::NoteName;
    ///
    /// let advice = Advice::fallback(NoteName::A);
    /// assert_eq!(advice.progression, vec!["A", "?", "?", "?"]);
    /// assert!(advice.is_fallback());
    /// ```
    pub fn fallback(root: NoteName) -> Self {
        let mut progression = vec![root.to_string()];
        progression.extend((1..PROGRESSION_LENGTH).map(|_| UNKNOWN_CHORD.to_string()));
        Self {
            theme: FALLBACK_THEME.to_string(),
            progression,
            description: FALLBACK_DESCRIPTION.to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.theme == FALLBACK_THEME && self.description == FALLBACK_DESCRIPTION
    }

    /// Decode and validate a JSON reply
    pub fn from_json(text: &str) -> Result<Self, AdviceError> {
        let advice: Advice = serde_json::from_str(text.trim())?;
        advice.validate()?;
        Ok(advice)
    }

    fn validate(&self) -> Result<(), AdviceError> {
        if self.theme.trim().is_empty() {
            return Err(AdviceError::EmptyField("theme"));
        }
        if self.description.trim().is_empty() {
            return Err(AdviceError::EmptyField("description"));
        }
        if self.progression.len() != PROGRESSION_LENGTH {
            return Err(AdviceError::ProgressionLength {
                expected: PROGRESSION_LENGTH,
                found: self.progression.len(),
            });
        }
        Ok(())
    }

    /// Resolve each chord of the progression; symbols the vocabulary cannot
    /// express (e.g. "Csus4" or "?") come back as `None`
    pub fn resolved_progression(&self) -> Vec<Option<ChordDefinition>> {
        self.progression
            .iter()
            .map(|symbol| resolve_symbol(symbol).ok())
            .collect()
    }
}

/// What the advisor is asked about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdviceRequest {
    pub root: NoteName,
    pub quality: ChordQuality,
}

impl AdviceRequest {
    pub fn new(root: NoteName, quality: ChordQuality) -> Self {
        Self { root, quality }
    }

    /// Prompt text sent to a text-generation service
    pub fn prompt(&self) -> String {
        format!(
            "Briefly explain why the {root} {quality} chord matters or how it is commonly used in music. \
             Suggest a musical theme or mood this chord evokes and a progression of {n} chords that starts with it. \
             Reply in JSON with the fields \"theme\" (a creative name for the theme), \
             \"progression\" (a list of {n} chord symbols) and \"description\" (a short theoretical explanation).",
            root = self.root,
            quality = self.quality.name(),
            n = PROGRESSION_LENGTH,
        )
    }
}

/// Anything that can answer an advice request
pub trait AdviceSource: Send + Sync {
    fn advise(&self, request: &AdviceRequest) -> Result<Advice, AdviceError>;
}

/// Source backed by a transport that takes a prompt and returns JSON text.
///
/// The transport is whatever the host provides (an HTTP client, a local model);
/// its errors are reported as [`AdviceError::Transport`].
pub struct JsonAdviceSource<F> {
    transport: F,
}

impl<F> JsonAdviceSource<F>
where
    F: Fn(&str) -> Result<String, String> + Send + Sync,
{
    pub fn new(transport: F) -> Self {
        Self { transport }
    }
}

impl<F> AdviceSource for JsonAdviceSource<F>
where
    F: Fn(&str) -> Result<String, String> + Send + Sync,
{
    fn advise(&self, request: &AdviceRequest) -> Result<Advice, AdviceError> {
        let reply = (self.transport)(&request.prompt()).map_err(AdviceError::Transport)?;
        Advice::from_json(&reply)
    }
}

/// Source used when advice is switched off: always unreachable
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineAdvisor;

impl AdviceSource for OfflineAdvisor {
    fn advise(&self, _request: &AdviceRequest) -> Result<Advice, AdviceError> {
        Err(AdviceError::Transport("advice is disabled".to_string()))
    }
}

/// Ask a source for advice, falling back on any failure. Never returns an error.
pub fn fetch_advice<S: AdviceSource + ?Sized>(source: &S, request: &AdviceRequest) -> Advice {
    match source.advise(request) {
        Ok(advice) => advice,
        Err(e) => {
            log::warn!(
                "advice for {} {} failed: {}",
                request.root,
                request.quality.name(),
                e
            );
            Advice::fallback(request.root)
        }
    }
}

/// Runs advice requests in the background.
///
/// Every request gets a ticket; only the reply to the most recent ticket is
/// ever handed out. Replies to superseded requests are dropped when polled.
/// With a reply timeout, a latest request left unanswered for longer than the
/// timeout is answered with [`Advice::fallback`] and its late reply is dropped.
pub struct AdviceDesk<S: AdviceSource + 'static> {
    source: Arc<S>,
    sender: Sender<(u64, Advice)>,
    receiver: Receiver<(u64, Advice)>,
    latest: u64,
    pending: Option<PendingRequest>,
    reply_timeout: Option<Duration>,
}

struct PendingRequest {
    request: AdviceRequest,
    issued_at: Instant,
}

impl<S: AdviceSource + 'static> AdviceDesk<S> {
    /// A desk that waits for replies indefinitely
    pub fn new(source: S) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            source: Arc::new(source),
            sender,
            receiver,
            latest: 0,
            pending: None,
            reply_timeout: None,
        }
    }

    /// A desk that gives up on a request after `reply_timeout`
    pub fn with_timeout(source: S, reply_timeout: Duration) -> Self {
        Self {
            reply_timeout: Some(reply_timeout),
            ..Self::new(source)
        }
    }

    /// Start a request and return its ticket. Supersedes any request in flight.
    pub fn request(&mut self, request: AdviceRequest) -> u64 {
        self.latest += 1;
        self.pending = Some(PendingRequest {
            request,
            issued_at: Instant::now(),
        });
        let ticket = self.latest;
        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let advice = fetch_advice(source.as_ref(), &request);
            // The desk may be gone; nobody is waiting then
            let _ = sender.send((ticket, advice));
        });
        log::debug!("advice ticket {} for {} {}", ticket, request.root, request.quality.name());
        ticket
    }

    /// Ticket of the most recent request (0 before the first)
    pub fn latest_ticket(&self) -> u64 {
        self.latest
    }

    /// Whether the latest request is still unanswered
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Reply to the latest request, if it has arrived or timed out
    pub fn poll(&mut self) -> Option<Advice> {
        while let Ok((ticket, advice)) = self.receiver.try_recv() {
            if let Some(advice) = self.accept(ticket, advice) {
                return Some(advice);
            }
        }
        self.expire_if_overdue(Instant::now())
    }

    /// Block up to `timeout` for the reply to the latest request. Returns the
    /// fallback early if the desk's reply timeout runs out first.
    pub fn wait(&mut self, timeout: Duration) -> Option<Advice> {
        self.pending.as_ref()?;
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let now = Instant::now();
            if let Some(advice) = self.expire_if_overdue(now) {
                return Some(advice);
            }

            let mut limit = match deadline {
                Some(deadline) => deadline.checked_duration_since(now)?,
                None => Duration::MAX,
            };
            if let Some(expiry) = self.expiry() {
                limit = limit.min(expiry.saturating_duration_since(now));
            }

            match self.receiver.recv_timeout(limit) {
                Ok((ticket, advice)) => {
                    if let Some(advice) = self.accept(ticket, advice) {
                        return Some(advice);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if deadline.map_or(false, |deadline| Instant::now() >= deadline)
                        && !self.is_overdue(Instant::now())
                    {
                        return None;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn accept(&mut self, ticket: u64, advice: Advice) -> Option<Advice> {
        if ticket == self.latest && self.pending.is_some() {
            self.pending = None;
            Some(advice)
        } else {
            log::warn!("dropping stale advice for ticket {} (latest {})", ticket, self.latest);
            None
        }
    }

    /// When the pending request runs out of time, if it ever does
    fn expiry(&self) -> Option<Instant> {
        let pending = self.pending.as_ref()?;
        pending.issued_at.checked_add(self.reply_timeout?)
    }

    fn is_overdue(&self, now: Instant) -> bool {
        self.expiry().map_or(false, |expiry| now >= expiry)
    }

    fn expire_if_overdue(&mut self, now: Instant) -> Option<Advice> {
        if !self.is_overdue(now) {
            return None;
        }
        let pending = self.pending.take()?;
        log::warn!(
            "advice for {} {} timed out after {:?}",
            pending.request.root,
            pending.request.quality.name(),
            now.duration_since(pending.issued_at)
        );
        Some(Advice::fallback(pending.request.root))
    }
}
