//! Types for transcription operations.

use serde::{Deserialize, Serialize};

/// Per-request transcription settings.
///
/// `language` is a hint, not a constraint; providers that auto-detect the
/// language are free to ignore it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// ISO 639-1 language hint (e.g., "ru")
    pub language: Option<String>,
    /// Original file name of the uploaded audio, used by multipart uploads
    pub file_name: Option<String>,
}

/// A completed transcription result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Full transcript text
    pub text: String,
    /// Detected or requested language code, when the provider reports one
    pub language: Option<String>,
    /// Audio duration in seconds, when the provider reports it
    pub duration_seconds: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_round_trips_through_json() {
        let transcript = Transcript {
            text: "Добрый день, чем могу помочь?".to_owned(),
            language: Some("ru".to_owned()),
            duration_seconds: Some(12.5),
        };

        let json = serde_json::to_string(&transcript).unwrap();
        let parsed: Transcript = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.text, transcript.text);
        assert_eq!(parsed.language.as_deref(), Some("ru"));
    }
}
