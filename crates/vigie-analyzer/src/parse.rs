//! Strict report parsing from model output.
//!
//! Models are instructed to return bare JSON, but replies still arrive
//! wrapped in markdown fences or prose. The contract: take the FIRST
//! JSON object found in the text and require it to match the full report
//! schema. Anything else is a hard parse failure, never retried.

use vigie_models::AnalysisReport;

use crate::error::{AnalyzerError, AnalyzerResult};

/// Extract the first balanced JSON object from free text.
///
/// Brace matching is string- and escape-aware so braces inside string
/// values do not terminate the scan.
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse a model reply into a schema-complete report.
pub fn parse_report(text: &str) -> AnalyzerResult<AnalysisReport> {
    // Strip markdown code fences before scanning
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);

    let object = extract_first_json_object(text)
        .ok_or_else(|| AnalyzerError::unparseable("No JSON object found in model response"))?;

    let report: AnalysisReport = serde_json::from_str(object)
        .map_err(|e| AnalyzerError::unparseable(format!("Report does not match schema: {}", e)))?;

    report.check().map_err(AnalyzerError::unparseable)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigie_models::{RiskLevel, Sentiment};

    fn report_json() -> String {
        r#"{
            "summary": "A market vendor discusses rising prices.",
            "key_points": ["prices doubled"],
            "sentiment": "negative",
            "topics": ["economy"],
            "risk_flags": [],
            "credibility_score": 64,
            "misinformation_flags": [],
            "content_type": "testimony",
            "detected_languages": ["fr"],
            "hate_speech": false,
            "violence_incitation": false,
            "risk_level": "low",
            "regional_context": {
                "political_content": false,
                "tribal_references": [],
                "economic_concerns": ["food prices"],
                "security_threats": [],
                "regional_references": ["Yaoundé"]
            },
            "linguistic_profile": {
                "has_french": true,
                "has_english": false,
                "has_local_languages": false,
                "mixed_language": false
            }
        }"#
        .to_string()
    }

    #[test]
    fn test_parses_bare_json() {
        let report = parse_report(&report_json()).unwrap();
        assert_eq!(report.sentiment, Sentiment::Negative);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(report.credibility_score, 64);
    }

    #[test]
    fn test_parses_fenced_json() {
        let fenced = format!("```json\n{}\n```", report_json());
        assert!(parse_report(&fenced).is_ok());
    }

    #[test]
    fn test_takes_first_object_from_prose() {
        let wrapped = format!("Here is the requested analysis:\n{}\nLet me know!", report_json());
        assert!(parse_report(&wrapped).is_ok());
    }

    #[test]
    fn test_braces_inside_strings_do_not_break_scan() {
        let tricky = report_json().replace(
            "A market vendor discusses rising prices.",
            "Quote: \"{prices} rose\" said {someone}",
        );
        let report = parse_report(&tricky).unwrap();
        assert!(report.summary.contains("{prices}"));
    }

    #[test]
    fn test_no_json_object_is_a_hard_failure() {
        let err = parse_report("The video could not be assessed.").unwrap_err();
        assert!(matches!(err, AnalyzerError::UnparseableResponse(_)));
    }

    #[test]
    fn test_missing_field_is_a_hard_failure() {
        let truncated = report_json().replace("\"sentiment\": \"negative\",", "");
        let err = parse_report(&truncated).unwrap_err();
        assert!(matches!(err, AnalyzerError::UnparseableResponse(_)));
    }

    #[test]
    fn test_out_of_range_score_is_a_hard_failure() {
        let bad = report_json().replace("\"credibility_score\": 64", "\"credibility_score\": 240");
        assert!(parse_report(&bad).is_err());
    }

    #[test]
    fn test_unbalanced_object_yields_nothing() {
        assert!(extract_first_json_object("{ \"a\": { \"b\": 1 }").is_none());
    }
}
