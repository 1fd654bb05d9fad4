//! Deterministic stand-ins for the store and the model.

use std::sync::{Arc, Mutex};

use ai_llm_service::{
    AiLlmError, CompletionFuture, TextCompletion,
    error_handler::{Provider, ProviderError, ProviderErrorKind},
};
use migration_store::{
    InMemoryStore, MigrationFilter, MigrationRecord, MigrationStore, StatsBundle, StoreError,
    StoreFuture, YearBounds,
    bson::{Document, doc},
};

fn row(country: &str, iso: &str, year: i32, refugees: &str, asylum: &str) -> Document {
    doc! {
        "Country of Origin": country,
        "Country of Origin ISO": iso,
        "Year": year,
        "Refugees": refugees,
        "Asylum Seekers": asylum,
    }
}

/// Three countries over 2015..=2021, Syria rows deliberately out of year order.
pub fn sample_store() -> InMemoryStore {
    InMemoryStore::new(vec![
        row("Syria", "SYR", 2020, "6700000", "100000"),
        row("Afghanistan", "AFG", 2015, "2600000", "250000"),
        row("Syria", "SYR", 2018, "6650000", "130000"),
        row("Iraq", "IRQ", 2021, "330000", "n/a"),
        row("Syria", "SYR", 2019, "6600000", "120000"),
        row("Afghanistan", "AFG", 2019, "2700000", "300000"),
        row("Syria", "SYR", 2016, "5500000", "190000"),
    ])
}

#[derive(Default)]
struct Script {
    reply: String,
    fail_next: bool,
    prompts: Vec<String>,
}

/// Answers every prompt with a fixed reply; can be told to fail once.
#[derive(Clone, Default)]
pub struct ScriptedLlm {
    inner: Arc<Mutex<Script>>,
}

impl ScriptedLlm {
    pub fn ok(reply: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Script {
                reply: reply.to_string(),
                ..Script::default()
            })),
        }
    }

    pub fn fail_next(&self) {
        self.inner.lock().unwrap().fail_next = true;
    }

    pub fn prompts(&self) -> Vec<String> {
        self.inner.lock().unwrap().prompts.clone()
    }
}

impl TextCompletion for ScriptedLlm {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        let result = {
            let mut s = self.inner.lock().unwrap();
            s.prompts.push(prompt.to_string());
            if std::mem::take(&mut s.fail_next) {
                Err(AiLlmError::Provider(ProviderError::new(
                    Provider::Gemini,
                    ProviderErrorKind::EmptyCandidates(Some("SAFETY".into())),
                )))
            } else {
                Ok(s.reply.clone())
            }
        };
        Box::pin(async move { result })
    }
}

/// Every call fails as if the database were unreachable.
pub struct FailingStore;

fn offline<'a, T>() -> StoreFuture<'a, T>
where
    T: Send + 'a,
{
    Box::pin(async { Err(StoreError::Config("store offline".into())) })
}

impl MigrationStore for FailingStore {
    fn stats<'a>(&'a self, _filter: Option<&'a MigrationFilter>) -> StoreFuture<'a, StatsBundle> {
        offline()
    }

    fn raw<'a>(
        &'a self,
        _filter: Option<&'a MigrationFilter>,
    ) -> StoreFuture<'a, Vec<MigrationRecord>> {
        offline()
    }

    fn distinct_countries(&self) -> StoreFuture<'_, Vec<String>> {
        offline()
    }

    fn year_bounds(&self) -> StoreFuture<'_, Option<YearBounds>> {
        offline()
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        offline()
    }
}
