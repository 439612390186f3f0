use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::{GenerationRequest, GenerationResponse, GenerationStatus};
use crate::services::NewsClient;

use super::fields::{Field, FieldState};

/// Message for a finished generation request.
pub struct GenerationOutcome {
    pub generation: u64,
    pub response: Option<GenerationResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started,
    MissingFields(Vec<Field>),
    AlreadyInFlight,
}

/// Transient "please fill in" notice shown after a premature trigger.
#[derive(Debug, Clone)]
pub struct MissingReport {
    pub fields: Vec<Field>,
    shown_at: Instant,
}

/// Runs at most one news request at a time and holds the single current
/// result. Only this type writes `status` and `result`.
pub struct GenerationCoordinator {
    client: NewsClient,
    missing_timeout: Duration,

    status: GenerationStatus,
    result: Option<GenerationResponse>,
    missing: Option<MissingReport>,

    generation: u64,
    task: Option<JoinHandle<()>>,
    result_tx: mpsc::Sender<GenerationOutcome>,
    result_rx: mpsc::Receiver<GenerationOutcome>,
}

impl GenerationCoordinator {
    pub fn new(client: NewsClient, missing_timeout: Duration) -> Self {
        let (result_tx, result_rx) = mpsc::channel(1);
        Self {
            client,
            missing_timeout,
            status: GenerationStatus::Idle,
            result: None,
            missing: None,
            generation: 0,
            task: None,
            result_tx,
            result_rx,
        }
    }

    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    pub fn is_in_flight(&self) -> bool {
        self.status == GenerationStatus::InFlight
    }

    pub fn result(&self) -> Option<&GenerationResponse> {
        self.result.as_ref()
    }

    pub fn missing(&self) -> Option<&MissingReport> {
        self.missing.as_ref()
    }

    /// Start a request if every field is ready. The request is only built
    /// once the gate has passed.
    pub fn trigger(
        &mut self,
        fields: &FieldState,
        build_request: impl FnOnce() -> GenerationRequest,
        now: Instant,
    ) -> TriggerOutcome {
        if !fields.all_ready() {
            let missing = fields.missing();
            tracing::debug!("Generation blocked, missing {:?}", missing);
            self.missing = Some(MissingReport {
                fields: missing.clone(),
                shown_at: now,
            });
            return TriggerOutcome::MissingFields(missing);
        }

        if self.is_in_flight() {
            return TriggerOutcome::AlreadyInFlight;
        }

        self.missing = None;
        self.result = None;
        self.status = GenerationStatus::InFlight;
        self.generation += 1;

        let generation = self.generation;
        let request = build_request();
        let client = self.client.clone();
        let tx = self.result_tx.clone();

        tracing::info!("Requesting news (generation #{})", generation);
        self.task = Some(tokio::spawn(async move {
            let response = match client.fetch_news(&request).await {
                Ok(news) => Some(news),
                Err(e) => {
                    tracing::warn!("News request failed: {}", e);
                    None
                }
            };
            let _ = tx.send(GenerationOutcome { generation, response }).await;
        }));

        TriggerOutcome::Started
    }

    /// Apply a finished request (non-blocking). A task that ended without
    /// reporting counts as a failure so the status never stays in flight.
    pub fn poll(&mut self) {
        while let Ok(outcome) = self.result_rx.try_recv() {
            self.apply(outcome);
        }

        if self.is_in_flight() && self.task.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Ok(outcome) = self.result_rx.try_recv() {
                self.apply(outcome);
            } else {
                tracing::warn!("News task ended without a result");
                self.task = None;
                self.result = None;
                self.status = GenerationStatus::Failed;
            }
        }
    }

    pub fn apply(&mut self, outcome: GenerationOutcome) {
        if outcome.generation != self.generation || !self.is_in_flight() {
            tracing::debug!("Ignoring result for generation #{}", outcome.generation);
            return;
        }

        self.task = None;
        match outcome.response {
            Some(news) => {
                tracing::info!("Received {} articles", news.articles.len());
                self.result = Some(news);
                self.status = GenerationStatus::Ready;
            }
            None => {
                self.result = None;
                self.status = GenerationStatus::Failed;
            }
        }
    }

    /// Drop the missing-fields notice once it has been visible long enough.
    pub fn tick(&mut self, now: Instant) {
        let expired = self
            .missing
            .as_ref()
            .is_some_and(|m| now.saturating_duration_since(m.shown_at) >= self.missing_timeout);
        if expired {
            self.missing = None;
        }
    }

    #[cfg(test)]
    async fn next_outcome(&mut self) -> Option<GenerationOutcome> {
        self.result_rx.recv().await
    }
}
