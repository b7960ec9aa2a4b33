//! Expression Codec - the compact `@TAG:ind1,ind2` directive.
//!
//! Grammar: `"@" tag ":" indicator ("," indicator)*` where tag is one of
//! `TOPSIS_POSITIVE` / `TOPSIS_NEGATIVE`. Tokens are trimmed and blank
//! tokens are dropped; a list that collapses to nothing is rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::orientation::Orientation;
use crate::domain::foundation::IndicatorCode;

/// Marker every TOPSIS directive starts with (prefix plus tag family).
pub const TOPSIS_MARKER: &str = "@TOPSIS_";

/// Directive prefix that tags text as TOPSIS, old bare-tag form included.
const TOPSIS_DIRECTIVE_PREFIX: &str = "@TOPSIS";

/// Structured form of a TOPSIS directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopsisExpression {
    pub orientation: Orientation,
    pub indicators: Vec<IndicatorCode>,
}

impl TopsisExpression {
    /// Creates an expression from an orientation and indicator codes.
    pub fn new<I, S>(orientation: Orientation, indicators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<IndicatorCode>,
    {
        Self {
            orientation,
            indicators: indicators.into_iter().map(Into::into).collect(),
        }
    }
}

/// Why a directive could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionDefect {
    #[error("expression is empty")]
    Empty,

    #[error("expression does not start with '@'")]
    MissingMarker,

    #[error("expression has no ':' between tag and indicator list")]
    MissingSeparator,

    #[error("unknown orientation tag '{0}'")]
    UnknownTag(String),

    #[error("indicator list is empty")]
    NoIndicators,
}

/// Bidirectional mapping between directive text and [`TopsisExpression`].
pub struct ExpressionCodec;

impl ExpressionCodec {
    /// Decodes a directive.
    ///
    /// Never fails loudly: malformed text yields `None`, so callers treat
    /// "no TOPSIS configuration" and "malformed directive" the same way.
    pub fn decode(text: &str) -> Option<TopsisExpression> {
        match Self::inspect(text) {
            Ok(expression) => Some(expression),
            Err(defect) => {
                debug!(expression = %text, %defect, "Rejected TOPSIS expression");
                None
            }
        }
    }

    /// Decodes a directive, reporting the first defect found.
    pub fn inspect(text: &str) -> Result<TopsisExpression, ExpressionDefect> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ExpressionDefect::Empty);
        }

        let body = trimmed
            .strip_prefix('@')
            .ok_or(ExpressionDefect::MissingMarker)?;
        let (tag, list) = body
            .split_once(':')
            .ok_or(ExpressionDefect::MissingSeparator)?;
        let orientation = Orientation::from_tag(tag)
            .ok_or_else(|| ExpressionDefect::UnknownTag(tag.to_string()))?;

        let indicators: Vec<IndicatorCode> = list
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(IndicatorCode::from)
            .collect();

        if indicators.is_empty() {
            return Err(ExpressionDefect::NoIndicators);
        }

        Ok(TopsisExpression {
            orientation,
            indicators,
        })
    }

    /// Encodes an expression. Total, including an empty indicator list
    /// (which produces `"@TAG:"`).
    pub fn encode(expression: &TopsisExpression) -> String {
        let indicators: Vec<&str> = expression.indicators.iter().map(|i| i.as_str()).collect();
        format!("@{}:{}", expression.orientation.tag(), indicators.join(","))
    }

    /// True when `decode` would accept the text.
    pub fn is_well_formed(text: &str) -> bool {
        Self::inspect(text).is_ok()
    }

    /// True when the text carries an `@TOPSIS` directive in any case,
    /// well-formed or not.
    pub fn mentions_topsis(text: &str) -> bool {
        text.to_ascii_uppercase().contains(TOPSIS_DIRECTIVE_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decode_positive_expression() {
        let expr = ExpressionCodec::decode("@TOPSIS_POSITIVE:indicator1,indicator2,indicator3")
            .expect("should decode");

        assert_eq!(expr.orientation, Orientation::Positive);
        assert_eq!(
            expr.indicators,
            vec![
                IndicatorCode::from("indicator1"),
                IndicatorCode::from("indicator2"),
                IndicatorCode::from("indicator3"),
            ]
        );
    }

    #[test]
    fn encode_reproduces_original_text() {
        let text = "@TOPSIS_POSITIVE:indicator1,indicator2,indicator3";
        let expr = ExpressionCodec::decode(text).unwrap();
        assert_eq!(ExpressionCodec::encode(&expr), text);
    }

    #[test]
    fn decode_strips_token_whitespace() {
        let expr = ExpressionCodec::decode("@TOPSIS_NEGATIVE: indicator1 , indicator2 , indicator3 ")
            .unwrap();

        assert_eq!(expr.orientation, Orientation::Negative);
        assert_eq!(
            expr.indicators,
            vec![
                IndicatorCode::from("indicator1"),
                IndicatorCode::from("indicator2"),
                IndicatorCode::from("indicator3"),
            ]
        );
    }

    #[test]
    fn decode_missing_marker_is_absent() {
        assert!(ExpressionCodec::decode("TOPSIS_POSITIVE:indicator1,indicator2").is_none());
        assert_eq!(
            ExpressionCodec::inspect("TOPSIS_POSITIVE:indicator1"),
            Err(ExpressionDefect::MissingMarker)
        );
    }

    #[test]
    fn decode_missing_colon_is_absent() {
        assert_eq!(
            ExpressionCodec::inspect("@TOPSIS_POSITIVE indicator1"),
            Err(ExpressionDefect::MissingSeparator)
        );
    }

    #[test]
    fn decode_unknown_tag_is_absent() {
        assert_eq!(
            ExpressionCodec::inspect("@TOPSIS_NEUTRAL:a,b"),
            Err(ExpressionDefect::UnknownTag("TOPSIS_NEUTRAL".to_string()))
        );
        assert!(ExpressionCodec::decode("@topsis_positive:a").is_none());
    }

    #[test]
    fn decode_empty_list_is_absent() {
        assert_eq!(
            ExpressionCodec::inspect("@TOPSIS_POSITIVE:"),
            Err(ExpressionDefect::NoIndicators)
        );
        assert!(ExpressionCodec::decode("@TOPSIS_POSITIVE: , ,").is_none());
    }

    #[test]
    fn decode_empty_text_is_absent() {
        assert_eq!(ExpressionCodec::inspect("   "), Err(ExpressionDefect::Empty));
    }

    #[test]
    fn blank_tokens_are_dropped() {
        let expr = ExpressionCodec::decode("@TOPSIS_POSITIVE:a,,b,").unwrap();
        assert_eq!(expr.indicators.len(), 2);
    }

    #[test]
    fn encode_empty_list_produces_bare_tag() {
        let expr = TopsisExpression::new(Orientation::Negative, Vec::<&str>::new());
        assert_eq!(ExpressionCodec::encode(&expr), "@TOPSIS_NEGATIVE:");
    }

    #[test]
    fn marker_detection_ignores_well_formedness() {
        assert!(ExpressionCodec::mentions_topsis("@TOPSIS_POSITIVE:"));
        assert!(!ExpressionCodec::is_well_formed("@TOPSIS_POSITIVE:"));
        assert!(ExpressionCodec::mentions_topsis("@topsis_negative:a"));
        assert!(!ExpressionCodec::mentions_topsis("weighted_sum(a,b)"));
        assert!(!ExpressionCodec::mentions_topsis("grade(topsis_score)"));
    }

    fn token() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_]{1,12}"
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(
            negative in any::<bool>(),
            tokens in prop::collection::vec(token(), 1..8),
        ) {
            let orientation = if negative { Orientation::Negative } else { Orientation::Positive };
            let expr = TopsisExpression::new(orientation, tokens);
            let decoded = ExpressionCodec::decode(&ExpressionCodec::encode(&expr));
            prop_assert_eq!(decoded, Some(expr));
        }

        #[test]
        fn encode_inverts_decode_after_normalisation(
            tokens in prop::collection::vec(token(), 1..8),
            pad in "[ \t]{0,3}",
        ) {
            let padded: Vec<String> = tokens.iter().map(|t| format!("{pad}{t}{pad}")).collect();
            let text = format!("@TOPSIS_POSITIVE:{}", padded.join(","));
            let expr = ExpressionCodec::decode(&text).unwrap();
            prop_assert_eq!(
                ExpressionCodec::encode(&expr),
                format!("@TOPSIS_POSITIVE:{}", tokens.join(","))
            );
        }
    }
}
