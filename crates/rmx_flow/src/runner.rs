use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::watch;

use rmx_core::{Concept, GenerationBackend, GenerationRequest, Result, Style};

use crate::state::{advance, FlowOutput, ProcessEvent, ProcessState};

/// Drives one generation run against a backend, publishing every state
/// transition on a watch channel and keeping a line-per-step log. A runner
/// is single-use: once it reaches a terminal state it stays there.
pub struct ProcessRunner {
    backend: Arc<dyn GenerationBackend>,
    state: ProcessState,
    log: Vec<String>,
    tx: watch::Sender<ProcessState>,
    rx: watch::Receiver<ProcessState>,
}

impl ProcessRunner {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        let (tx, rx) = watch::channel(ProcessState::Idle);
        Self {
            backend,
            state: ProcessState::Idle,
            log: Vec::new(),
            tx,
            rx,
        }
    }

    /// Watch the run from elsewhere. Only the latest state is retained, but
    /// terminal states are always observed.
    pub fn subscribe(&self) -> watch::Receiver<ProcessState> {
        self.rx.clone()
    }

    pub fn state(&self) -> &ProcessState {
        &self.state
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    fn apply(&mut self, event: ProcessEvent) {
        self.state = advance(&self.state, event);
        self.log.push(format!(
            "{} ({:.0}%)",
            self.state.label(),
            self.state.progress() * 100.0
        ));
        tracing::debug!("pipeline state: {}", self.state.label());
        let _ = self.tx.send(self.state.clone());
    }

    fn fail(&mut self, message: String) -> ProcessState {
        self.apply(ProcessEvent::Failed(message));
        self.state.clone()
    }

    /// Delegated variant: one call, the backend runs the whole pipeline.
    pub async fn run_delegated(&mut self, request: &GenerationRequest) -> ProcessState {
        self.apply(ProcessEvent::Delegated);
        match self.backend.generate(request).await {
            Ok(outcome) => {
                self.apply(ProcessEvent::Finished(FlowOutput::Delegated(outcome)));
            }
            Err(e) => return self.fail(e.to_string()),
        }
        self.state.clone()
    }

    /// Staged variant: scrape, synthesize, then render every concept. Any
    /// failure goes straight to `Error` and nothing further is attempted.
    pub async fn run_staged(&mut self, url: &str, style: Style) -> ProcessState {
        self.apply(ProcessEvent::Started);
        let scraped = match self.backend.scrape(url).await {
            Ok(scraped) => scraped,
            Err(e) => return self.fail(e.to_string()),
        };

        self.apply(ProcessEvent::Scraped);
        let concepts = match self.backend.synthesize(style, &scraped).await {
            Ok(concepts) => concepts,
            Err(e) => return self.fail(e.to_string()),
        };

        self.apply(ProcessEvent::Synthesized);
        match self.render_all(concepts).await {
            Ok(concepts) => {
                self.apply(ProcessEvent::Finished(FlowOutput::Staged { scraped, concepts }));
            }
            Err(e) => return self.fail(e.to_string()),
        }
        self.state.clone()
    }

    /// Renders run concurrently with no ordering guarantee on completion;
    /// each result stays paired with its concept by position. One rejection
    /// fails the whole batch.
    async fn render_all(&self, mut concepts: Vec<Concept>) -> Result<Vec<Concept>> {
        let renders = concepts
            .iter()
            .map(|concept| self.backend.render_image(&concept.prompt));
        let urls = join_all(renders)
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        for (concept, url) in concepts.iter_mut().zip(urls) {
            concept.visual = url;
        }
        Ok(concepts)
    }
}
