//! Thresholds that govern which pipeline branch runs.
use std::time::Duration;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(25);
/// Bytes kept from a fetched body; the rest is never read.
pub const FETCH_MAX_BYTES: usize = 1_000_000;
/// Normalized or model text shorter than this is treated as "nothing found".
pub const MIN_TEXT_CHARS: usize = 50;
/// Raw pages shorter than this are not worth an HTML model call.
pub const MIN_RAW_HTML_CHARS: usize = 200;
pub const HTML_SNIPPET_CHARS: usize = 50_000;
/// Usable text longer than this goes through the text model.
pub const MODEL_TEXT_THRESHOLD_CHARS: usize = 12_000;
pub const MAX_OUTPUT_CHARS: usize = 15_000;

/// Tunable copy of the constants above. All lengths are in characters
/// except `fetch_max_bytes`.
///
/// ```
/// use tailor_extract::ExtractionLimits;
///
/// let limits = ExtractionLimits::default();
/// assert_eq!(limits.fetch_timeout.as_secs(), 25);
/// assert_eq!(limits.model_text_threshold_chars, 12_000);
/// assert!(limits.max_output_chars > limits.model_text_threshold_chars);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionLimits {
    pub fetch_timeout: Duration,
    pub fetch_max_bytes: usize,
    pub min_text_chars: usize,
    pub min_raw_html_chars: usize,
    pub html_snippet_chars: usize,
    pub model_text_threshold_chars: usize,
    pub max_output_chars: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            fetch_timeout: FETCH_TIMEOUT,
            fetch_max_bytes: FETCH_MAX_BYTES,
            min_text_chars: MIN_TEXT_CHARS,
            min_raw_html_chars: MIN_RAW_HTML_CHARS,
            html_snippet_chars: HTML_SNIPPET_CHARS,
            model_text_threshold_chars: MODEL_TEXT_THRESHOLD_CHARS,
            max_output_chars: MAX_OUTPUT_CHARS,
        }
    }
}
