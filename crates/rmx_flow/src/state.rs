use serde::Serialize;

use rmx_core::{Concept, GenerationOutcome, ScrapedContent};

/// What a finished run produced. The delegated variant hands back the
/// backend's identifiers; the staged variant keeps the intermediate
/// artifacts so they can be shown alongside the rendered concepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlowOutput {
    Delegated(GenerationOutcome),
    Staged {
        scraped: ScrapedContent,
        concepts: Vec<Concept>,
    },
}

/// Client-observable state of one generation run. Terminal states absorb
/// every further event; a retry is a fresh runner, never a resumed one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ProcessState {
    Idle,
    /// Whole pipeline delegated to the backend; nothing to report until the
    /// single call resolves.
    Loading,
    Scraping,
    Synthesizing,
    Rendering,
    Complete(FlowOutput),
    Error(String),
}

impl ProcessState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessState::Complete(_) | ProcessState::Error(_))
    }

    /// Display fraction for a progress bar.
    pub fn progress(&self) -> f32 {
        match self {
            ProcessState::Idle => 0.0,
            ProcessState::Scraping => 0.25,
            ProcessState::Loading | ProcessState::Synthesizing => 0.5,
            ProcessState::Rendering => 0.75,
            ProcessState::Complete(_) | ProcessState::Error(_) => 1.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProcessState::Idle => "idle",
            ProcessState::Loading => "loading",
            ProcessState::Scraping => "scraping",
            ProcessState::Synthesizing => "synthesizing",
            ProcessState::Rendering => "rendering",
            ProcessState::Complete(_) => "complete",
            ProcessState::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// Staged run entered its first step
    Started,
    /// Delegated run handed everything to the backend
    Delegated,
    Scraped,
    Synthesized,
    Finished(FlowOutput),
    Failed(String),
}

/// Pure reducer. Transitions are driven only by the resolution or rejection
/// of the runner's sequential calls; there is nothing to undo, so the
/// reducer never moves out of a terminal state.
pub fn advance(state: &ProcessState, event: ProcessEvent) -> ProcessState {
    if state.is_terminal() {
        return state.clone();
    }

    match event {
        ProcessEvent::Started => ProcessState::Scraping,
        ProcessEvent::Delegated => ProcessState::Loading,
        ProcessEvent::Scraped => ProcessState::Synthesizing,
        ProcessEvent::Synthesized => ProcessState::Rendering,
        ProcessEvent::Finished(output) => ProcessState::Complete(output),
        ProcessEvent::Failed(message) => ProcessState::Error(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> FlowOutput {
        FlowOutput::Delegated(GenerationOutcome {
            article_id: "a1".to_string(),
            media_id: "m1".to_string(),
            media_url: "https://img.example/m1.png".to_string(),
            article_text: None,
        })
    }

    #[test]
    fn test_staged_happy_path() {
        let mut state = ProcessState::Idle;
        for event in [
            ProcessEvent::Started,
            ProcessEvent::Scraped,
            ProcessEvent::Synthesized,
            ProcessEvent::Finished(outcome()),
        ] {
            state = advance(&state, event);
        }
        assert!(matches!(state, ProcessState::Complete(_)));
        assert_eq!(state.progress(), 1.0);
    }

    #[test]
    fn test_delegated_happy_path() {
        let state = advance(&ProcessState::Idle, ProcessEvent::Delegated);
        assert_eq!(state, ProcessState::Loading);
        let state = advance(&state, ProcessEvent::Finished(outcome()));
        assert!(matches!(state, ProcessState::Complete(_)));
    }

    #[test]
    fn test_failure_is_terminal_at_every_step() {
        for state in [
            ProcessState::Idle,
            ProcessState::Loading,
            ProcessState::Scraping,
            ProcessState::Synthesizing,
            ProcessState::Rendering,
        ] {
            let failed = advance(&state, ProcessEvent::Failed("boom".to_string()));
            assert_eq!(failed, ProcessState::Error("boom".to_string()));
        }
    }

    #[test]
    fn test_terminal_states_absorb_events() {
        let error = ProcessState::Error("boom".to_string());
        assert_eq!(advance(&error, ProcessEvent::Started), error);
        assert_eq!(advance(&error, ProcessEvent::Finished(outcome())), error);

        let complete = advance(&ProcessState::Loading, ProcessEvent::Finished(outcome()));
        assert_eq!(
            advance(&complete, ProcessEvent::Failed("late".to_string())),
            complete
        );
    }

    #[test]
    fn test_progress_is_monotone_through_staged_run() {
        let mut state = ProcessState::Idle;
        let mut last = state.progress();
        for event in [
            ProcessEvent::Started,
            ProcessEvent::Scraped,
            ProcessEvent::Synthesized,
            ProcessEvent::Finished(outcome()),
        ] {
            state = advance(&state, event);
            assert!(state.progress() >= last);
            last = state.progress();
        }
    }
}
