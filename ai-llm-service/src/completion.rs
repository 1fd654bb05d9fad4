//! Narrow text-completion interface used by the rest of the workspace.
//!
//! Callers depend on [`TextCompletion`] instead of a concrete client so that
//! tests can plug in a deterministic stub.

use std::{future::Future, pin::Pin, sync::Arc};

use crate::{error_handler::AiLlmError, services::gemini_service::GeminiService};

/// Boxed future returned by [`TextCompletion::complete`].
pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>>;

/// Single-shot prompt → text completion.
///
/// One prompt string in, one text string out. No streaming, no tools.
pub trait TextCompletion: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a>;
}

impl TextCompletion for GeminiService {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        Box::pin(self.generate(prompt))
    }
}

impl<T: TextCompletion + ?Sized> TextCompletion for Arc<T> {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        (**self).complete(prompt)
    }
}
