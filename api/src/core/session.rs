//! Interactive session: chat transcript plus the last generated report.
//!
//! One process-local session. Every action locks the session for its whole
//! duration, so user actions run one at a time (idle → awaiting model → idle).
//! A failed action leaves the transcript and the previous report untouched,
//! except that a chat turn keeps the user's message.

use std::sync::Arc;

use ai_llm_service::{AiLlmError, TextCompletion};
use chrono::{DateTime, Utc};
use migration_store::{
    MigrationFilter, MigrationRecord, MigrationStore, StoreError, YearBounds, YearRange,
};
use report_engine::{ReportError, ReportGenerator, ReportKind, pdf, prompt::chat_prompt};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Years shown by default: `max - DEFAULT_YEAR_SPAN ..= max`.
pub const DEFAULT_YEAR_SPAN: i32 = 5;
/// Countries preselected by default.
pub const DEFAULT_COUNTRY_COUNT: usize = 2;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("data store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("model call failed: {0}")]
    Model(#[source] AiLlmError),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("no valid 'Year' data found in the database")]
    NoYearData,

    #[error("no origin countries found in the database")]
    NoCountries,

    #[error("no report has been generated yet")]
    NoReport,

    #[error("year_from ({from}) must not be after year_to ({to})")]
    InvalidYearRange { from: i32, to: i32 },
}

impl From<ReportError> for SessionError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Llm(e) => SessionError::Model(e),
            ReportError::Pdf(msg) => SessionError::Pdf(msg),
        }
    }
}

/// Chat failure; the user turn stays in the transcript.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("data store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("model call failed: {0}")]
    Model(#[from] AiLlmError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Sidebar defaults derived from live data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DefaultSelection {
    pub countries: Vec<String>,
    pub years: YearRange,
    pub kind: ReportKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportKindOption {
    pub kind: ReportKind,
    pub label: &'static str,
}

/// Everything the sidebar needs, loaded fresh on each call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub countries: Vec<String>,
    pub year_bounds: YearBounds,
    pub defaults: DefaultSelection,
    pub report_kinds: Vec<ReportKindOption>,
}

impl FilterOptions {
    fn from_live(countries: Vec<String>, bounds: YearBounds) -> Self {
        let default_countries = countries
            .iter()
            .take(DEFAULT_COUNTRY_COUNT)
            .cloned()
            .collect();
        Self {
            defaults: DefaultSelection {
                countries: default_countries,
                years: default_years(bounds),
                kind: ReportKind::default(),
            },
            countries,
            year_bounds: bounds,
            report_kinds: ReportKind::ALL
                .iter()
                .map(|&kind| ReportKindOption {
                    kind,
                    label: kind.label(),
                })
                .collect(),
        }
    }
}

/// `max - 5 ..= max`, clamped so the start never precedes the data.
pub fn default_years(bounds: YearBounds) -> YearRange {
    let from = (bounds.max - DEFAULT_YEAR_SPAN).max(bounds.min);
    YearRange::new(from, bounds.max)
}

/// User choices for one report. Omitted fields fall back to the defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportSelection {
    pub countries: Option<Vec<String>>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub kind: ReportKind,
}

/// Last successful report, kept until the next one replaces it.
#[derive(Clone, Debug, Serialize)]
pub struct ReportArtifact {
    pub kind: ReportKind,
    pub title: String,
    pub text: String,
    pub file_name: String,
    #[serde(skip)]
    pub pdf: Vec<u8>,
    /// Records used for the report, sorted by year for preview.
    #[serde(skip)]
    pub records: Vec<MigrationRecord>,
    pub filter: MigrationFilter,
    pub generated_at: DateTime<Utc>,
}

#[derive(Default)]
struct SessionState {
    transcript: Vec<ChatTurn>,
    report: Option<Arc<ReportArtifact>>,
}

/// Orchestrates store, model and renderer for one user session.
pub struct SessionController {
    store: Arc<dyn MigrationStore>,
    llm: Arc<dyn TextCompletion>,
    state: Mutex<SessionState>,
}

impl SessionController {
    pub fn new(store: Arc<dyn MigrationStore>, llm: Arc<dyn TextCompletion>) -> Self {
        Self {
            store,
            llm,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Live countries, year bounds and defaults. Never cached.
    ///
    /// # Errors
    /// [`SessionError::NoYearData`] when no record has a numeric year,
    /// [`SessionError::NoCountries`] when the country list is empty.
    pub async fn filter_options(&self) -> Result<FilterOptions, SessionError> {
        let _guard = self.state.lock().await;
        self.load_options().await
    }

    async fn load_options(&self) -> Result<FilterOptions, SessionError> {
        let bounds = self
            .store
            .year_bounds()
            .await?
            .ok_or(SessionError::NoYearData)?;
        let countries = self.store.distinct_countries().await?;
        if countries.is_empty() {
            return Err(SessionError::NoCountries);
        }
        Ok(FilterOptions::from_live(countries, bounds))
    }

    /// Fills omitted selections from live defaults.
    ///
    /// The year range is checked after defaults apply, so a lone `year_from`
    /// past the default end is rejected before any model call.
    async fn resolve_filter(
        &self,
        selection: &ReportSelection,
    ) -> Result<MigrationFilter, SessionError> {
        let needs_defaults = selection.countries.is_none()
            || selection.year_from.is_none()
            || selection.year_to.is_none();
        let defaults = if needs_defaults {
            Some(self.load_options().await?.defaults)
        } else {
            None
        };

        let countries = match (&selection.countries, &defaults) {
            (Some(c), _) => c.clone(),
            (None, Some(d)) => d.countries.clone(),
            (None, None) => Vec::new(),
        };
        let from = selection
            .year_from
            .or(defaults.as_ref().map(|d| d.years.min))
            .ok_or(SessionError::NoYearData)?;
        let to = selection
            .year_to
            .or(defaults.as_ref().map(|d| d.years.max))
            .ok_or(SessionError::NoYearData)?;
        if from > to {
            return Err(SessionError::InvalidYearRange { from, to });
        }

        Ok(MigrationFilter::all()
            .with_countries(countries)
            .with_years(from, to))
    }

    /// Fetches the selection, asks the model for the narrative, renders the
    /// PDF and stores the result as the latest report.
    #[instrument(level = "info", skip(self, selection), fields(kind = selection.kind.label()))]
    pub async fn generate_report(
        &self,
        selection: ReportSelection,
    ) -> Result<Arc<ReportArtifact>, SessionError> {
        let mut state = self.state.lock().await;

        let filter = self.resolve_filter(&selection).await?;
        let mut records = self.store.raw(Some(&filter)).await?;

        let text = ReportGenerator::new(self.llm.as_ref())
            .generate(selection.kind, &records)
            .await?;

        let title = selection.kind.title();
        let pdf = pdf::render(&text, &title)?;

        // Preview order; the model saw store order.
        records.sort_by_key(|r| r.year);

        let artifact = Arc::new(ReportArtifact {
            kind: selection.kind,
            title,
            text,
            file_name: selection.kind.file_name(),
            pdf,
            records,
            filter,
            generated_at: Utc::now(),
        });

        info!(
            records = artifact.records.len(),
            pdf_bytes = artifact.pdf.len(),
            file = %artifact.file_name,
            "report ready"
        );

        state.report = Some(Arc::clone(&artifact));
        Ok(artifact)
    }

    /// One chat turn over fresh unfiltered statistics.
    #[instrument(level = "info", skip(self, message), fields(len = message.len()))]
    pub async fn chat(&self, message: &str) -> Result<String, ChatError> {
        let mut state = self.state.lock().await;
        state.transcript.push(ChatTurn::user(message));

        let reply = match self.answer(message).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "chat turn failed");
                return Err(err);
            }
        };

        state.transcript.push(ChatTurn::assistant(reply.clone()));
        Ok(reply)
    }

    async fn answer(&self, message: &str) -> Result<String, ChatError> {
        let stats = self.store.stats(None).await?;
        let prompt = chat_prompt(message, &stats);
        Ok(self.llm.complete(&prompt).await?)
    }

    pub async fn transcript(&self) -> Vec<ChatTurn> {
        self.state.lock().await.transcript.clone()
    }

    pub async fn latest_report(&self) -> Result<Arc<ReportArtifact>, SessionError> {
        self.state
            .lock()
            .await
            .report
            .clone()
            .ok_or(SessionError::NoReport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{FailingStore, ScriptedLlm, sample_store};

    fn controller(llm: ScriptedLlm) -> SessionController {
        SessionController::new(Arc::new(sample_store()), Arc::new(llm))
    }

    #[tokio::test]
    async fn filter_options_come_from_live_data() {
        let session = controller(ScriptedLlm::ok("unused"));
        let opts = session.filter_options().await.unwrap();

        assert_eq!(opts.countries, vec!["Afghanistan", "Iraq", "Syria"]);
        assert_eq!(opts.year_bounds, YearBounds { min: 2015, max: 2021 });
        assert_eq!(opts.defaults.countries, vec!["Afghanistan", "Iraq"]);
        assert_eq!(opts.defaults.years, YearRange::new(2016, 2021));
        assert_eq!(opts.report_kinds.len(), 2);
    }

    #[test]
    fn default_years_clamp_to_lower_bound() {
        let r = default_years(YearBounds { min: 2019, max: 2021 });
        assert_eq!(r, YearRange::new(2019, 2021));
    }

    #[tokio::test]
    async fn empty_store_reports_missing_year_data() {
        let session = SessionController::new(
            Arc::new(migration_store::InMemoryStore::default()),
            Arc::new(ScriptedLlm::ok("unused")),
        );
        let err = session.filter_options().await.unwrap_err();
        assert!(matches!(err, SessionError::NoYearData));
    }

    #[tokio::test]
    async fn store_without_countries_reports_no_countries() {
        use migration_store::bson::doc;
        let store = migration_store::InMemoryStore::new(vec![doc! { "Year": 2020 }]);
        let session = SessionController::new(Arc::new(store), Arc::new(ScriptedLlm::ok("x")));
        let err = session.filter_options().await.unwrap_err();
        assert!(matches!(err, SessionError::NoCountries));
    }

    #[tokio::test]
    async fn report_uses_selection_and_sorts_preview() {
        let llm = ScriptedLlm::ok("Executive Summary\n- point");
        let session = controller(llm.clone());

        let artifact = session
            .generate_report(ReportSelection {
                countries: Some(vec!["Syria".into()]),
                year_from: Some(2018),
                year_to: Some(2020),
                kind: ReportKind::ImpactAnalysis,
            })
            .await
            .unwrap();

        assert_eq!(artifact.file_name, "migration_impact_analysis.pdf");
        assert!(artifact.title.starts_with("Impact Analysis - "));
        assert_eq!(artifact.text, "Executive Summary\n- point");
        assert!(artifact.pdf.starts_with(b"%PDF"));

        let years: Vec<Option<i32>> = artifact.records.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![Some(2018), Some(2019), Some(2020)]);
        assert!(artifact.records.iter().all(|r| r.country_of_origin == "Syria"));

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("Create a detailed impact report"));

        let latest = session.latest_report().await.unwrap();
        assert_eq!(latest.generated_at, artifact.generated_at);
    }

    #[tokio::test]
    async fn report_without_selection_uses_defaults() {
        let session = controller(ScriptedLlm::ok("text"));
        let artifact = session
            .generate_report(ReportSelection::default())
            .await
            .unwrap();
        assert_eq!(
            artifact.filter,
            MigrationFilter::all()
                .with_countries(["Afghanistan", "Iraq"])
                .with_years(2016, 2021)
        );
        assert_eq!(artifact.kind, ReportKind::HotspotPrediction);
    }

    #[tokio::test]
    async fn lone_year_from_past_default_end_is_rejected() {
        let llm = ScriptedLlm::ok("unused");
        let session = controller(llm.clone());

        let err = session
            .generate_report(ReportSelection {
                year_from: Some(2025),
                ..ReportSelection::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidYearRange { from: 2025, to: 2021 }
        ));
        assert!(llm.prompts().is_empty());
        assert!(matches!(
            session.latest_report().await,
            Err(SessionError::NoReport)
        ));
    }

    #[tokio::test]
    async fn lone_year_to_before_default_start_is_rejected() {
        let session = controller(ScriptedLlm::ok("unused"));
        let err = session
            .generate_report(ReportSelection {
                year_to: Some(2010),
                ..ReportSelection::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidYearRange { from: 2016, to: 2010 }
        ));
    }

    #[tokio::test]
    async fn failed_report_keeps_previous_artifact() {
        let llm = ScriptedLlm::ok("first");
        let session = controller(llm.clone());
        session
            .generate_report(ReportSelection::default())
            .await
            .unwrap();

        llm.fail_next();
        let err = session
            .generate_report(ReportSelection::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Model(_)));

        let latest = session.latest_report().await.unwrap();
        assert_eq!(latest.text, "first");
    }

    #[tokio::test]
    async fn no_report_before_first_generation() {
        let session = controller(ScriptedLlm::ok("x"));
        assert!(matches!(
            session.latest_report().await,
            Err(SessionError::NoReport)
        ));
    }

    #[tokio::test]
    async fn chat_appends_user_and_assistant_turns() {
        let llm = ScriptedLlm::ok("Syria leads the list.");
        let session = controller(llm.clone());

        let reply = session
            .chat("What are the top origin countries?")
            .await
            .unwrap();
        assert_eq!(reply, "Syria leads the list.");

        let transcript = session.transcript().await;
        assert_eq!(
            transcript,
            vec![
                ChatTurn::user("What are the top origin countries?"),
                ChatTurn::assistant("Syria leads the list."),
            ]
        );
        assert!(llm.prompts()[0].contains("Top origin countries: Syria (SYR)"));
    }

    #[tokio::test]
    async fn chat_model_failure_keeps_only_user_turn() {
        let llm = ScriptedLlm::ok("unused");
        llm.fail_next();
        let session = controller(llm);

        let err = session
            .chat("What are the top origin countries?")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Model(_)));
        assert_eq!(session.transcript().await.len(), 1);
    }

    #[tokio::test]
    async fn chat_store_failure_is_typed() {
        let session =
            SessionController::new(Arc::new(FailingStore), Arc::new(ScriptedLlm::ok("x")));
        let err = session.chat("hello").await.unwrap_err();
        assert!(matches!(err, ChatError::Store(_)));
        assert_eq!(session.transcript().await, vec![ChatTurn::user("hello")]);
    }
}
