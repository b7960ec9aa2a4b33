//! Lenient reader for TOPSIS directives written in older shapes.
//!
//! Only migration uses this. Accepted deviations:
//! - missing leading `@`
//! - tag in the wrong case
//! - bare `TOPSIS` tag, orientation taken from the output param name
//! - `;` or `|` used as separators
//! - blank or duplicated tokens

use serde::{Deserialize, Serialize};

use super::expression::TopsisExpression;
use super::orientation::Orientation;
use crate::domain::foundation::IndicatorCode;

/// Expression recovered from legacy text, with what had to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalvagedExpression {
    pub expression: TopsisExpression,
    pub notes: Vec<String>,
}

pub struct LegacyExpressionParser;

impl LegacyExpressionParser {
    /// Recovers an expression, or `None` when nothing usable remains.
    pub fn salvage(text: &str, output_param: &str) -> Option<SalvagedExpression> {
        let mut notes = Vec::new();
        let trimmed = text.trim();

        let body = match trimmed.strip_prefix('@') {
            Some(body) => body,
            None => {
                notes.push("added missing '@' marker".to_string());
                trimmed
            }
        };

        let (tag, list) = body.split_once(':')?;
        let tag = tag.trim();
        let upper = tag.to_ascii_uppercase();

        let orientation = match Orientation::from_tag(&upper) {
            Some(orientation) => {
                if upper != tag {
                    notes.push(format!("normalised tag '{tag}' to '{upper}'"));
                }
                orientation
            }
            None if upper == "TOPSIS" => {
                let orientation = if output_param.to_ascii_lowercase().contains("negative") {
                    Orientation::Negative
                } else {
                    Orientation::Positive
                };
                notes.push(format!(
                    "bare TOPSIS tag; orientation {orientation} inferred from output param '{output_param}'"
                ));
                orientation
            }
            None => return None,
        };

        if list.contains([';', '|']) {
            notes.push("replaced ';' / '|' separators with ','".to_string());
        }

        let mut indicators: Vec<IndicatorCode> = Vec::new();
        let mut blanks = 0usize;
        for token in list.split([',', ';', '|']).map(str::trim) {
            if token.is_empty() {
                blanks += 1;
                continue;
            }
            let code = IndicatorCode::from(token);
            if indicators.contains(&code) {
                notes.push(format!("removed duplicate indicator '{token}'"));
            } else {
                indicators.push(code);
            }
        }
        if blanks > 0 && !indicators.is_empty() {
            notes.push(format!("dropped {blanks} blank token(s)"));
        }

        if indicators.is_empty() {
            return None;
        }

        Some(SalvagedExpression {
            expression: TopsisExpression {
                orientation,
                indicators,
            },
            notes,
        })
    }
}
