//! Mock analyzer for tests and local development without credentials.

use super::{Extraction, InlineImage, ProviderError, ReportAnalyzer};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// What the mock returns for every call.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Caption(String),
    Empty,
    Malformed,
    Fail(String),
}

/// Mock analyzer that records the requests it receives.
pub struct MockAnalyzer {
    outcome: MockOutcome,
    calls: AtomicUsize,
    last_image: Mutex<Option<InlineImage>>,
}

impl MockAnalyzer {
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_image: Mutex::new(None),
        }
    }

    /// Canned summary used by `GENAI_PROVIDER=mock`.
    pub fn sample() -> Self {
        Self::new(MockOutcome::Caption(
            "## Tests Performed\n- Complete Blood Count (CBC)\n\n## Findings\n- **Hemoglobin:** 13.5 g/dL (normal range)\n"
                .to_string(),
        ))
    }

    /// Number of `analyze` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The image passed to the most recent call.
    pub fn last_image(&self) -> Option<InlineImage> {
        self.last_image
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }
}

#[async_trait]
impl ReportAnalyzer for MockAnalyzer {
    async fn analyze(
        &self,
        image: &InlineImage,
        _prompt: &str,
    ) -> Result<Extraction, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_image.lock() {
            *last = Some(image.clone());
        }

        match &self.outcome {
            MockOutcome::Caption(text) => Ok(Extraction::Text(text.clone())),
            MockOutcome::Empty => Ok(Extraction::Empty),
            MockOutcome::Malformed => Ok(Extraction::Malformed),
            MockOutcome::Fail(message) => Err(ProviderError::NetworkError(message.clone())),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
