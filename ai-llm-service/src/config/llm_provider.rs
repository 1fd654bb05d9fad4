/// Represents the hosted provider used for text generation.
///
/// Only Google Gemini is wired today. Adding another hosted backend means
/// extending this enum and routing it in [`crate::completion`] and
/// [`crate::health_service`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Google Generative Language API (`generateContent`).
    Gemini,
}
