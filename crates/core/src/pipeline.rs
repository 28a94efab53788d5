//! Serialized paint pipeline
//!
//! Every paint goes through one worker task fed by a bounded queue. The worker
//! takes one request at a time and runs it to completion:
//!
//! 1. Token present (skipped when restriction is disabled) → `MissingToken`
//! 2. Bounds and palette check → `InvalidRequest`
//! 3. Cooldown check-and-record → `Cooling`
//! 4. Cell write
//! 5. Change event handed to the broadcaster
//!
//! The cooldown is only recorded once the paint is known to be valid, so an
//! out-of-range paint never costs its token a cooldown window.
//!
//! Only then is the next request taken, so accepted paints reach the
//! broadcaster in the order they were dequeued and no two mutations overlap.
//! The submitter gets its outcome back over a oneshot after step 5.

use std::sync::Arc;

use governor::clock::Clock;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::board::Board;
use crate::broadcast::Broadcaster;
use crate::error::PaintError;
use crate::palette::{ColorIndex, PALETTE_SIZE};
use crate::ratelimit::{RateDecision, RateLimiterStore};
use crate::types::{ChangeEvent, PaintRequest};

/// Pending submissions before `submit` starts waiting for a slot
const QUEUE_CAPACITY: usize = 1024;

type PaintOutcome = Result<ChangeEvent, PaintError>;

struct PaintJob {
    request: PaintRequest,
    reply: oneshot::Sender<PaintOutcome>,
}

/// Handle for submitting paints
///
/// Cheap to clone; all clones feed the same worker.
#[derive(Clone)]
pub struct PaintPipeline {
    jobs: mpsc::Sender<PaintJob>,
    board: Arc<Board>,
}

impl PaintPipeline {
    /// Start the worker task
    ///
    /// The worker exits once every `PaintPipeline` clone has been dropped.
    pub fn spawn<C>(
        board: Arc<Board>,
        limiter: RateLimiterStore<C>,
        broadcaster: Broadcaster,
    ) -> (Self, JoinHandle<()>)
    where
        C: Clock + Send + Sync + 'static,
        C::Instant: Send + Sync + 'static,
    {
        let (jobs_tx, jobs_rx) = mpsc::channel(QUEUE_CAPACITY);

        let worker = PaintWorker {
            board: Arc::clone(&board),
            limiter,
            broadcaster,
        };
        let handle = tokio::spawn(worker.run(jobs_rx));

        (
            Self {
                jobs: jobs_tx,
                board,
            },
            handle,
        )
    }

    /// Board this pipeline writes to, for read-only access
    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    /// Submit a paint and wait for it to be applied or rejected
    pub async fn submit(&self, request: PaintRequest) -> PaintOutcome {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job = PaintJob {
            request,
            reply: reply_tx,
        };

        self.jobs
            .send(job)
            .await
            .map_err(|_| PaintError::PipelineClosed)?;

        reply_rx.await.map_err(|_| PaintError::PipelineClosed)?
    }
}

struct PaintWorker<C: Clock> {
    board: Arc<Board>,
    limiter: RateLimiterStore<C>,
    broadcaster: Broadcaster,
}

impl<C: Clock> PaintWorker<C> {
    async fn run(self, mut jobs: mpsc::Receiver<PaintJob>) {
        tracing::debug!("Paint worker started");

        while let Some(job) = jobs.recv().await {
            let outcome = self.process(job.request).await;
            // Submitter may have gone away; the paint still stands
            let _ = job.reply.send(outcome);
        }

        tracing::debug!("Paint worker stopped");
    }

    async fn process(&self, request: PaintRequest) -> PaintOutcome {
        let token = request.token();

        if self.limiter.is_enabled() && token.is_none() {
            return Err(PaintError::MissingToken);
        }

        let (x, y) = self.board.position(request.x, request.y).ok_or_else(|| {
            PaintError::InvalidRequest(format!(
                "({}, {}) is outside the {}x{} board",
                request.x,
                request.y,
                self.board.width(),
                self.board.height()
            ))
        })?;

        let color = ColorIndex::new(request.color).ok_or_else(|| {
            PaintError::InvalidRequest(format!(
                "color {} is outside the palette (0-{})",
                request.color,
                PALETTE_SIZE - 1
            ))
        })?;

        if let Some(token) = token.filter(|_| self.limiter.is_enabled()) {
            if self.limiter.check_and_record(token) == RateDecision::Cooling {
                return Err(PaintError::Cooling {
                    token: token.to_string(),
                });
            }
        }

        let written = self.board.set(x, y, color);
        debug_assert!(written, "validated position ({}, {}) rejected by board", x, y);

        let event = ChangeEvent::new(x, y, color);
        let delivered = self.broadcaster.publish(event).await;
        tracing::debug!(
            "Painted ({}, {}) = {} by {}, notified {} subscriber(s)",
            x,
            y,
            color.get(),
            token.unwrap_or("<anonymous>"),
            delivered
        );

        Ok(event)
    }
}
