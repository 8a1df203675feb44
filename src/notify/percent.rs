//! Normalized completion-percent extraction.
//!
//! Providers report progress in wildly different shapes. Extraction order:
//! a direct numeric `progress` field, a nested `metrics.progress` field, a
//! literal `NN%` token in the most recent log line, then a
//! `progress[:=]<float>` token. Values at or below 1.0 are fractions and
//! scaled by 100; larger values are taken as percentages already.

use std::sync::OnceLock;

use regex::Regex;

use crate::provider::StatusPayload;

fn percent_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Anchored against a preceding digit so an oversized token like "1000%"
    // is rejected rather than read as its trailing digits.
    RE.get_or_init(|| Regex::new(r"(?:^|[^\d])(\d{1,3})\s*%").expect("valid percent regex"))
}

fn progress_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"progress\s*[:=]\s*([0-9]*\.?[0-9]+)").expect("valid progress regex")
    })
}

/// Scale a raw progress value to 0-100, rejecting non-finite or negative input.
fn normalize(value: f64) -> Option<u8> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let percent = if value <= 1.0 { value * 100.0 } else { value };
    Some(percent.clamp(0.0, 100.0).round() as u8)
}

/// Extract a normalized completion percentage from a raw status payload.
///
/// Returns `None` when no recognizable progress signal is present this tick.
pub fn extract_percent(payload: &StatusPayload) -> Option<u8> {
    if let Some(percent) = payload.progress.and_then(normalize) {
        return Some(percent);
    }
    if let Some(percent) = payload
        .metrics
        .as_ref()
        .and_then(|m| m.progress)
        .and_then(normalize)
    {
        return Some(percent);
    }

    let line = payload.last_log()?;
    if let Some(captures) = percent_token_re().captures(line) {
        if let Ok(n) = captures[1].parse::<u16>() {
            return Some(n.min(100) as u8);
        }
    }
    if let Some(captures) = progress_token_re().captures(line) {
        if let Ok(value) = captures[1].parse::<f64>() {
            return normalize(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::JobMetrics;

    fn with_logs(lines: &[&str]) -> StatusPayload {
        StatusPayload {
            status: "running".to_string(),
            logs: lines.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn direct_field_fraction_scales_to_percent() {
        let payload = StatusPayload {
            progress: Some(0.42),
            ..Default::default()
        };
        assert_eq!(extract_percent(&payload), Some(42));
    }

    #[test]
    fn direct_field_whole_number_taken_as_percent() {
        let payload = StatusPayload {
            progress: Some(73.0),
            ..Default::default()
        };
        assert_eq!(extract_percent(&payload), Some(73));
    }

    #[test]
    fn direct_field_takes_priority_over_metrics_and_logs() {
        let payload = StatusPayload {
            progress: Some(0.5),
            metrics: Some(JobMetrics {
                progress: Some(0.9),
            }),
            logs: vec!["99% done".to_string()],
            ..Default::default()
        };
        assert_eq!(extract_percent(&payload), Some(50));
    }

    #[test]
    fn metrics_progress_used_when_direct_absent() {
        let payload = StatusPayload {
            metrics: Some(JobMetrics {
                progress: Some(0.25),
            }),
            ..Default::default()
        };
        assert_eq!(extract_percent(&payload), Some(25));
    }

    #[test]
    fn percent_token_in_most_recent_log_line() {
        assert_eq!(extract_percent(&with_logs(&["step 3/10", "30% done"])), Some(30));
        // Only the most recent line is considered
        assert_eq!(extract_percent(&with_logs(&["30% done", "finalizing"])), None);
    }

    #[test]
    fn progress_token_fraction_and_percent_forms() {
        assert_eq!(extract_percent(&with_logs(&["progress: 0.42"])), Some(42));
        assert_eq!(extract_percent(&with_logs(&["progress=0.8"])), Some(80));
        assert_eq!(extract_percent(&with_logs(&["progress: 65"])), Some(65));
    }

    #[test]
    fn values_clamp_to_valid_range() {
        let payload = StatusPayload {
            progress: Some(250.0),
            ..Default::default()
        };
        assert_eq!(extract_percent(&payload), Some(100));
        assert_eq!(extract_percent(&with_logs(&["999% done"])), Some(100));
    }

    #[test]
    fn oversized_percent_tokens_are_rejected_not_truncated() {
        // "1000%" must not be read as its trailing "000"
        assert_eq!(extract_percent(&with_logs(&["1000% done"])), None);
        assert_eq!(extract_percent(&with_logs(&["scale 12345%"])), None);
        // Digit-adjacent tokens still match when the token itself fits
        assert_eq!(extract_percent(&with_logs(&["step 2: 85% done"])), Some(85));
    }

    #[test]
    fn garbage_yields_unknown() {
        assert_eq!(extract_percent(&StatusPayload::default()), None);
        assert_eq!(extract_percent(&with_logs(&["loading weights"])), None);
        let negative = StatusPayload {
            progress: Some(-0.5),
            ..Default::default()
        };
        assert_eq!(extract_percent(&negative), None);
        let nan = StatusPayload {
            progress: Some(f64::NAN),
            ..Default::default()
        };
        assert_eq!(extract_percent(&nan), None);
    }
}
