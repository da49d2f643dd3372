//! Request normalization: validation, sanitization and option building.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{GenerationOptions, GenerationRequest, QueryParams};
use crate::error::ValidationError;
use crate::settings::ModelPolicy;

/// ANSI / terminal escape sequences (7-bit C1 forms).
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B[@-_][0-?]*[ -/]*[@-~]").expect("ANSI escape pattern is valid")
});

/// Prefix of backend diagnostic log lines that must not reach the model.
const LOG_LINE_MARKER: &str = "INFO";

/// Characters rejected to block command injection.
const SHELL_METACHARACTERS: [char; 3] = [';', '&', '|'];

/// Turns raw caller parameters into a [`GenerationRequest`].
#[derive(Debug, Clone, Default)]
pub struct RequestNormalizer {
    policy: ModelPolicy,
}

impl RequestNormalizer {
    pub fn new(policy: ModelPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ModelPolicy {
        &self.policy
    }

    /// Validate and normalize `raw`. The first violation wins.
    pub fn normalize(&self, raw: &QueryParams) -> Result<GenerationRequest, ValidationError> {
        let query = raw
            .query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .ok_or(ValidationError::QueryRequired)?;

        let model = self.policy.resolve(raw.model.as_deref())?;

        guard_query(query)?;

        if !(0.0..=2.0).contains(&raw.temperature) {
            return Err(ValidationError::TemperatureOutOfRange);
        }
        if !(0.0..=1.0).contains(&raw.top_p) {
            return Err(ValidationError::TopPOutOfRange);
        }
        let top_k = u64::try_from(raw.top_k).map_err(|_| ValidationError::NegativeTopK)?;
        let num_predict =
            u64::try_from(raw.num_predict).map_err(|_| ValidationError::NegativeNumPredict)?;

        let query = sanitize_query(query);
        if query.is_empty() {
            return Err(ValidationError::QueryRequired);
        }
        // Stripping escapes or log lines can expose a marker that was split before.
        guard_query(&query)?;

        let stop = parse_stop_sequences(&raw.stop);

        Ok(GenerationRequest {
            model,
            query,
            context: raw.context.clone(),
            options: GenerationOptions {
                num_ctx: raw.num_ctx,
                num_gpu: raw.num_gpu,
                num_thread: raw.num_thread,
                temperature: raw.temperature,
                top_p: raw.top_p,
                top_k,
                num_predict,
                stop: (!stop.is_empty()).then_some(stop),
            },
            stream: raw.stream,
            format: Some(raw.format.trim())
                .filter(|f| !f.is_empty())
                .map(ToString::to_string),
        })
    }
}

/// Path-traversal and injection guards.
fn guard_query(query: &str) -> Result<(), ValidationError> {
    if query.contains("..") || query.starts_with('/') {
        return Err(ValidationError::InvalidQuery);
    }
    if query.contains(SHELL_METACHARACTERS) {
        return Err(ValidationError::InvalidCharacters);
    }
    Ok(())
}

/// Strip escape sequences and diagnostic log lines, collapsing the rest
/// into a single space-separated line.
///
/// Only lines that start with `INFO` at column zero are log lines; an
/// indented `INFO` is user text. The whole text is trimmed first, so the
/// first line counts from its first visible character.
pub fn sanitize_query(query: &str) -> String {
    let mut text = query.to_string();
    // Removing one sequence can splice together another.
    loop {
        let stripped = ANSI_ESCAPE.replace_all(&text, "");
        if stripped == text {
            break;
        }
        text = stripped.into_owned();
    }

    text.trim()
        .lines()
        .filter(|line| !line.starts_with(LOG_LINE_MARKER))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a comma-separated stop list, dropping blank entries.
pub fn parse_stop_sequences(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> RequestNormalizer {
        RequestNormalizer::new(
            ModelPolicy::new("llama3:8b", vec!["llama3:8b".into(), "mistral:7b".into()]).unwrap(),
        )
    }

    fn params(query: &str) -> QueryParams {
        QueryParams::for_query(query)
    }

    #[test]
    fn test_minimal_request_uses_defaults() {
        let request = normalizer().normalize(&params("Hello")).unwrap();

        assert_eq!(request.model, "llama3:8b");
        assert_eq!(request.query, "Hello");
        assert_eq!(request.context, "");
        assert_eq!(request.options.temperature, 0.7);
        assert_eq!(request.options.top_p, 0.9);
        assert_eq!(request.options.top_k, 40);
        assert_eq!(request.options.num_predict, 2048);
        assert_eq!(request.options.num_ctx, 4096);
        assert_eq!(request.options.num_gpu, 1);
        assert_eq!(request.options.num_thread, 4);
        assert_eq!(request.options.stop, None);
        assert_eq!(request.format, None);
        assert!(!request.stream);
    }

    #[test]
    fn test_missing_or_blank_query_is_required() {
        let n = normalizer();
        let mut raw = QueryParams::default();
        assert_eq!(n.normalize(&raw).unwrap_err(), ValidationError::QueryRequired);

        for blank in ["", "   ", "\n\t"] {
            raw.query = Some(blank.to_string());
            assert_eq!(n.normalize(&raw).unwrap_err(), ValidationError::QueryRequired);
        }
    }

    #[test]
    fn test_query_check_precedes_model_check() {
        let raw = QueryParams {
            model: Some("gpt-4".into()),
            ..QueryParams::default()
        };
        assert_eq!(
            normalizer().normalize(&raw).unwrap_err(),
            ValidationError::QueryRequired
        );
    }

    #[test]
    fn test_model_allow_list() {
        let n = normalizer();

        let mut raw = params("Hello");
        raw.model = Some("   ".into());
        assert_eq!(n.normalize(&raw).unwrap().model, "llama3:8b");

        raw.model = Some("mistral:7b".into());
        assert_eq!(n.normalize(&raw).unwrap().model, "mistral:7b");

        raw.model = Some("gpt-4".into());
        assert_eq!(
            n.normalize(&raw).unwrap_err(),
            ValidationError::ModelNotAllowed {
                allowed: "llama3:8b, mistral:7b".into()
            }
        );
    }

    #[test]
    fn test_path_traversal_rejected() {
        let n = normalizer();
        for query in ["../etc/passwd", "read a/../b", "/etc/passwd", "wait..."] {
            assert_eq!(
                n.normalize(&params(query)).unwrap_err(),
                ValidationError::InvalidQuery,
                "query {query:?}"
            );
        }
    }

    #[test]
    fn test_traversal_wins_over_later_violations() {
        let mut raw = params("/bin/sh; rm -rf");
        raw.temperature = 9.0;
        assert_eq!(
            normalizer().normalize(&raw).unwrap_err(),
            ValidationError::InvalidQuery
        );
    }

    #[test]
    fn test_shell_metacharacters_rejected() {
        let n = normalizer();
        for query in ["ls; whoami", "a && b", "cat x | nc"] {
            assert_eq!(
                n.normalize(&params(query)).unwrap_err(),
                ValidationError::InvalidCharacters,
                "query {query:?}"
            );
        }
    }

    #[test]
    fn test_numeric_ranges() {
        let n = normalizer();

        for temperature in [-0.1, 2.01, f64::NAN] {
            let mut raw = params("Hi");
            raw.temperature = temperature;
            assert_eq!(
                n.normalize(&raw).unwrap_err(),
                ValidationError::TemperatureOutOfRange
            );
        }
        for top_p in [-0.5, 1.5] {
            let mut raw = params("Hi");
            raw.top_p = top_p;
            assert_eq!(n.normalize(&raw).unwrap_err(), ValidationError::TopPOutOfRange);
        }

        let mut raw = params("Hi");
        raw.top_k = -1;
        assert_eq!(n.normalize(&raw).unwrap_err(), ValidationError::NegativeTopK);

        let mut raw = params("Hi");
        raw.num_predict = -5;
        assert_eq!(
            n.normalize(&raw).unwrap_err(),
            ValidationError::NegativeNumPredict
        );

        let mut raw = params("Hi");
        raw.temperature = 2.0;
        raw.top_p = 0.0;
        raw.top_k = 0;
        raw.num_predict = 0;
        assert!(n.normalize(&raw).is_ok());
    }

    #[test]
    fn test_temperature_checked_before_top_p() {
        let mut raw = params("Hi");
        raw.temperature = 3.0;
        raw.top_p = 3.0;
        raw.top_k = -1;
        assert_eq!(
            normalizer().normalize(&raw).unwrap_err(),
            ValidationError::TemperatureOutOfRange
        );
    }

    #[test]
    fn test_sanitization_strips_escapes_and_log_lines() {
        let request = normalizer()
            .normalize(&params(
                "\x1b[32mHello\x1b[0m\nINFO loading model\n  world  \n\nagain",
            ))
            .unwrap();
        assert_eq!(request.query, "Hello world again");
    }

    #[test]
    fn test_query_of_only_log_lines_is_required() {
        assert_eq!(
            normalizer()
                .normalize(&params("INFO one\nINFO two"))
                .unwrap_err(),
            ValidationError::QueryRequired
        );
    }

    #[test]
    fn test_guards_rerun_after_sanitization() {
        let n = normalizer();
        assert_eq!(
            n.normalize(&params("a.\x1b[0m.b")).unwrap_err(),
            ValidationError::InvalidQuery
        );
        assert_eq!(
            n.normalize(&params("INFO banner\n/etc/passwd")).unwrap_err(),
            ValidationError::InvalidQuery
        );
    }

    #[test]
    fn test_only_unindented_info_lines_are_dropped() {
        assert_eq!(sanitize_query("keep\n  INFO is a word"), "keep INFO is a word");
        assert_eq!(
            sanitize_query("  INFO banner\nkeep me\n INFO y"),
            "keep me INFO y"
        );
        assert_eq!(sanitize_query("INFORMATION\nrest"), "rest");
    }

    #[test]
    fn test_sanitize_collapses_whitespace_lines() {
        assert_eq!(
            sanitize_query("line one\r\nline two\n\n\nline three"),
            "line one line two line three"
        );
        assert_eq!(sanitize_query("tabs\tinside\tline"), "tabs\tinside\tline");
        assert_eq!(sanitize_query("\x1b\x1b[0m[0mnested"), "nested");
        assert_eq!(sanitize_query(""), "");
    }

    #[test]
    fn test_stop_sequences() {
        assert_eq!(parse_stop_sequences("a, b ,, c"), vec!["a", "b", "c"]);
        assert!(parse_stop_sequences("").is_empty());
        assert!(parse_stop_sequences("  , ,  ").is_empty());

        let n = normalizer();
        let mut raw = params("Hi");
        raw.stop = "a, b ,, c".into();
        assert_eq!(
            n.normalize(&raw).unwrap().options.stop,
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );

        raw.stop = "   ".into();
        assert_eq!(n.normalize(&raw).unwrap().options.stop, None);
    }

    #[test]
    fn test_format_only_when_supplied() {
        let n = normalizer();
        let mut raw = params("Hi");
        assert_eq!(n.normalize(&raw).unwrap().format, None);

        raw.format = "json".into();
        assert_eq!(n.normalize(&raw).unwrap().format.as_deref(), Some("json"));
    }
}
