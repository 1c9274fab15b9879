use super::error::EngineError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Cooperative cancellation shared between a caller and running tasks.
///
/// Tasks poll the token between independent work units, so cancellation takes
/// effect at the next frame, column pair or block pair rather than instantly.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<(Instant, Duration)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that additionally expires `limit` after this call.
    pub fn with_time_limit(limit: Duration) -> Self {
        Self::new().and_time_limit(limit)
    }

    /// The same cancellation flag with a deadline `limit` from now.
    ///
    /// An existing earlier deadline is kept. A limit too large to be
    /// represented as an instant adds no deadline.
    pub fn and_time_limit(&self, limit: Duration) -> Self {
        let deadline = match (self.deadline, Instant::now().checked_add(limit)) {
            (Some((existing, existing_limit)), Some(deadline)) if existing <= deadline => {
                Some((existing, existing_limit))
            }
            (existing, None) => existing,
            (_, Some(deadline)) => Some((deadline, limit)),
        };
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Fails with `Cancelled` or `TimedOut` once the token has fired.
    pub fn check(&self, phase: &'static str) -> Result<(), EngineError> {
        if self.is_cancelled() {
            return Err(EngineError::Cancelled { phase });
        }
        if let Some((deadline, limit)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(EngineError::TimedOut { phase, limit });
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
    cancellation: Option<CancellationToken>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    /// A child reporter that forwards every event to `self` and additionally
    /// expires after `time_limit`, sharing this reporter's cancellation flag.
    pub fn scoped(&self, time_limit: Option<Duration>) -> ProgressReporter<'_> {
        let cancellation = match (time_limit, &self.cancellation) {
            (Some(limit), Some(token)) => Some(token.and_time_limit(limit)),
            (Some(limit), None) => Some(CancellationToken::with_time_limit(limit)),
            (None, token) => token.clone(),
        };
        ProgressReporter {
            callback: Some(Box::new(move |event| self.report(event))),
            cancellation,
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Polls the attached cancellation token, if any.
    #[inline]
    pub fn checkpoint(&self, phase: &'static str) -> Result<(), EngineError> {
        match &self.cancellation {
            Some(token) => token.check(phase),
            None => Ok(()),
        }
    }
}
