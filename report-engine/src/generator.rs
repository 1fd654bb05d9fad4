//! Report content generation: prompt assembly plus one model call.

use std::time::Instant;

use ai_llm_service::TextCompletion;
use migration_store::MigrationRecord;
use tracing::{debug, info, instrument};

use crate::{
    error::ReportError,
    kind::ReportKind,
    prompt::{hotspot_prompt, impact_prompt},
};

/// Turns record selections into narrative text via a [`TextCompletion`].
///
/// The model reply is returned verbatim. No retries; any model error is
/// surfaced as [`ReportError::Llm`].
pub struct ReportGenerator<'a> {
    llm: &'a dyn TextCompletion,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(llm: &'a dyn TextCompletion) -> Self {
        Self { llm }
    }

    pub async fn hotspot_prediction(
        &self,
        records: &[MigrationRecord],
    ) -> Result<String, ReportError> {
        self.run(ReportKind::HotspotPrediction, hotspot_prompt(records), records.len())
            .await
    }

    pub async fn impact_report(&self, records: &[MigrationRecord]) -> Result<String, ReportError> {
        self.run(ReportKind::ImpactAnalysis, impact_prompt(records), records.len())
            .await
    }

    /// Dispatches on `kind`.
    pub async fn generate(
        &self,
        kind: ReportKind,
        records: &[MigrationRecord],
    ) -> Result<String, ReportError> {
        match kind {
            ReportKind::HotspotPrediction => self.hotspot_prediction(records).await,
            ReportKind::ImpactAnalysis => self.impact_report(records).await,
        }
    }

    #[instrument(level = "debug", skip(self, prompt), fields(kind = kind.label()))]
    async fn run(
        &self,
        kind: ReportKind,
        prompt: String,
        records: usize,
    ) -> Result<String, ReportError> {
        debug!(records, prompt_len = prompt.len(), "report prompt assembled");

        let started = Instant::now();
        let text = self.llm.complete(&prompt).await?;

        info!(
            records,
            text_len = text.len(),
            latency_ms = started.elapsed().as_millis() as u64,
            "report text generated"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::{
        AiLlmError, CompletionFuture,
        error_handler::{Provider, ProviderError, ProviderErrorKind},
    };
    use migration_store::bson::doc;
    use std::sync::Mutex;

    /// Records every prompt and answers with a fixed text.
    struct EchoLlm {
        seen: Mutex<Vec<String>>,
    }

    impl TextCompletion for EchoLlm {
        fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
            self.seen.lock().unwrap().push(prompt.to_string());
            Box::pin(async { Ok("Section 1\nSection 2".to_string()) })
        }
    }

    struct BlockedLlm;

    impl TextCompletion for BlockedLlm {
        fn complete<'a>(&'a self, _prompt: &'a str) -> CompletionFuture<'a> {
            Box::pin(async {
                Err(AiLlmError::Provider(ProviderError::new(
                    Provider::Gemini,
                    ProviderErrorKind::EmptyCandidates(Some("SAFETY".into())),
                )))
            })
        }
    }

    fn records() -> Vec<MigrationRecord> {
        vec![MigrationRecord::from_document(doc! {
            "Country of Origin": "Iraq",
            "Country of Origin ISO": "IRQ",
            "Year": 2020,
            "Refugees": "330000",
            "Asylum Seekers": "25000",
        })]
    }

    #[tokio::test]
    async fn generate_dispatches_to_matching_template() {
        let llm = EchoLlm {
            seen: Mutex::new(Vec::new()),
        };
        let generator = ReportGenerator::new(&llm);

        let text = generator
            .generate(ReportKind::ImpactAnalysis, &records())
            .await
            .unwrap();
        assert_eq!(text, "Section 1\nSection 2");

        generator
            .generate(ReportKind::HotspotPrediction, &records())
            .await
            .unwrap();

        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].starts_with("Create a detailed impact report based on:"));
        assert!(seen[1].starts_with("Analyze this migration data"));
        assert!(seen[1].contains("Iraq (IRQ), 2020"));
    }

    #[tokio::test]
    async fn model_error_propagates() {
        let generator = ReportGenerator::new(&BlockedLlm);
        let err = generator.hotspot_prediction(&records()).await.unwrap_err();
        assert!(matches!(err, ReportError::Llm(AiLlmError::Provider(_))));
    }
}
