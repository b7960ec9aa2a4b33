//! TopsisMigrationService - finds stale TOPSIS step records and upgrades them.
//!
//! A record is stale when its expression does not decode, its decoded
//! configuration fails validation, or it names indicators the model's
//! catalog no longer has. Plans are ordered by step code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::foundation::{DomainError, IndicatorCode, ModelId, StepId, Timestamp};
use crate::domain::topsis::{
    is_topsis_tagged, ExpressionCodec, LegacyExpressionParser, TopsisConfiguration, TopsisExpression,
    TOPSIS_ALGORITHM_CODE,
};
use crate::ports::{IndicatorCatalog, StepAlgorithmStore, StepExpression, StoredExpression};

/// What migration will do with one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MigrationAction {
    /// Record is current.
    Keep,
    /// Record will be replaced.
    Rewrite {
        record: StoredExpression,
        notes: Vec<String>,
    },
    /// Record needs a human.
    Unresolvable { reason: String },
}

/// One analyzed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationEntry {
    pub step_code: String,
    pub step_id: StepId,
    pub current: StoredExpression,
    pub issues: Vec<String>,
    pub action: MigrationAction,
}

/// Read-only migration plan for a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub model_id: ModelId,
    pub analyzed_at: Timestamp,
    pub entries: Vec<MigrationEntry>,
}

impl MigrationPlan {
    /// Entries that will be rewritten.
    pub fn rewrites(&self) -> impl Iterator<Item = &MigrationEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.action, MigrationAction::Rewrite { .. }))
    }

    /// Entries no automatic fix exists for.
    pub fn unresolvable(&self) -> impl Iterator<Item = &MigrationEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.action, MigrationAction::Unresolvable { .. }))
    }

    /// True when every stale record has an automatic fix.
    pub fn is_consistent(&self) -> bool {
        self.unresolvable().next().is_none()
    }

    pub fn needs_migration(&self) -> bool {
        self.entries
            .iter()
            .any(|e| !matches!(e.action, MigrationAction::Keep))
    }
}

/// A write performed by migration, kept for rollback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedChange {
    pub step_code: String,
    pub previous: StoredExpression,
    pub applied: StoredExpression,
    pub applied_at: Timestamp,
}

/// Result of executing (or dry-running) a migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationOutcome {
    pub success: bool,
    pub dry_run: bool,
    pub plan: MigrationPlan,
    pub applied: Vec<AppliedChange>,
}

/// Pass/fail compatibility of a model's TOPSIS records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub model_id: ModelId,
    pub compatible: bool,
    pub checked_steps: usize,
    pub issues: Vec<String>,
}

/// Service for checking and migrating stored TOPSIS expressions.
pub struct TopsisMigrationService {
    store: Arc<dyn StepAlgorithmStore>,
    catalog: Arc<dyn IndicatorCatalog>,
    default_output_param: String,
}

impl TopsisMigrationService {
    pub fn new(
        store: Arc<dyn StepAlgorithmStore>,
        catalog: Arc<dyn IndicatorCatalog>,
        default_output_param: impl Into<String>,
    ) -> Self {
        Self {
            store,
            catalog,
            default_output_param: default_output_param.into(),
        }
    }

    /// Builds the migration plan. Never writes.
    pub async fn analyze_migration(&self, model_id: ModelId) -> Result<MigrationPlan, DomainError> {
        let (steps, catalog) = self.scan(model_id).await?;

        let entries: Vec<MigrationEntry> = steps
            .into_iter()
            .map(|entry| {
                let issues = inspect(&entry, &catalog);
                let action = if issues.is_empty() {
                    MigrationAction::Keep
                } else {
                    self.plan_fix(&entry.record, &catalog)
                };
                MigrationEntry {
                    step_code: entry.step.step_code,
                    step_id: entry.step.step_id,
                    current: entry.record,
                    issues,
                    action,
                }
            })
            .collect();

        let plan = MigrationPlan {
            model_id,
            analyzed_at: Timestamp::now(),
            entries,
        };
        info!(
            model_id = %model_id,
            steps = plan.entries.len(),
            rewrites = plan.rewrites().count(),
            unresolvable = plan.unresolvable().count(),
            "Analyzed TOPSIS migration"
        );
        Ok(plan)
    }

    /// Executes the plan, or only reports it when `dry_run` is set.
    ///
    /// A plan with unresolvable entries is not applied at all. If a write
    /// fails midway, the writes already made are rolled back before the
    /// error is returned.
    pub async fn execute_migration(
        &self,
        model_id: ModelId,
        dry_run: bool,
    ) -> Result<MigrationOutcome, DomainError> {
        let plan = self.analyze_migration(model_id).await?;
        let consistent = plan.is_consistent();

        if dry_run || !consistent {
            if !consistent {
                warn!(
                    model_id = %model_id,
                    dry_run,
                    "Migration plan has unresolvable entries; nothing applied"
                );
            }
            return Ok(MigrationOutcome {
                success: consistent,
                dry_run,
                plan,
                applied: Vec::new(),
            });
        }

        let mut applied = Vec::new();
        for entry in plan.rewrites() {
            let MigrationAction::Rewrite { record, .. } = &entry.action else {
                continue;
            };
            if let Err(err) = self
                .store
                .set_expression(model_id, &entry.step_code, record.clone())
                .await
            {
                error!(
                    model_id = %model_id,
                    step_code = %entry.step_code,
                    error = %err,
                    "Migration write failed; rolling back"
                );
                if let Err(rollback_err) = self.rollback(model_id, &applied).await {
                    error!(model_id = %model_id, error = %rollback_err, "Rollback failed");
                }
                return Err(err);
            }
            applied.push(AppliedChange {
                step_code: entry.step_code.clone(),
                previous: entry.current.clone(),
                applied: record.clone(),
                applied_at: Timestamp::now(),
            });
        }

        info!(model_id = %model_id, applied = applied.len(), "Executed TOPSIS migration");
        Ok(MigrationOutcome {
            success: true,
            dry_run,
            plan,
            applied,
        })
    }

    /// Restores the records replaced by `changes`, newest first.
    /// Returns how many were restored.
    pub async fn rollback(
        &self,
        model_id: ModelId,
        changes: &[AppliedChange],
    ) -> Result<usize, DomainError> {
        for change in changes.iter().rev() {
            self.store
                .set_expression(model_id, &change.step_code, change.previous.clone())
                .await?;
        }
        if !changes.is_empty() {
            info!(model_id = %model_id, restored = changes.len(), "Rolled back TOPSIS migration");
        }
        Ok(changes.len())
    }

    /// Pass/fail check over the same scan, without planning fixes.
    pub async fn check_compatibility(&self, model_id: ModelId) -> Result<CompatibilityReport, DomainError> {
        let (steps, catalog) = self.scan(model_id).await?;

        let issues: Vec<String> = steps
            .iter()
            .flat_map(|entry| {
                inspect(entry, &catalog)
                    .into_iter()
                    .map(move |issue| format!("step '{}': {issue}", entry.step.step_code))
            })
            .collect();

        Ok(CompatibilityReport {
            model_id,
            compatible: issues.is_empty(),
            checked_steps: steps.len(),
            issues,
        })
    }

    /// TOPSIS steps of the model, ordered by step code, plus its catalog.
    async fn scan(
        &self,
        model_id: ModelId,
    ) -> Result<(Vec<StepExpression>, BTreeSet<IndicatorCode>), DomainError> {
        let (steps, catalog) = futures::try_join!(
            self.store.list_expressions(model_id),
            self.catalog.list_indicators(model_id),
        )?;

        let mut steps: Vec<StepExpression> =
            steps
            .into_iter()
            .filter(|entry| is_topsis_tagged(&entry.record.algorithm_code, &entry.record.expression))
            .collect();
        steps.sort_by(|a, b| a.step.step_code.cmp(&b.step.step_code));
        Ok((steps, catalog))
    }

    fn plan_fix(&self, record: &StoredExpression, catalog: &BTreeSet<IndicatorCode>) -> MigrationAction {
        let (expression, mut notes) = match ExpressionCodec::decode(&record.expression) {
            Some(decoded) => (decoded, Vec::new()),
            None => match LegacyExpressionParser::salvage(&record.expression, &record.output_param) {
                Some(salvaged) => (salvaged.expression, salvaged.notes),
                None => {
                    return MigrationAction::Unresolvable {
                        reason: format!("expression '{}' cannot be salvaged", record.expression),
                    }
                }
            },
        };

        let mut indicators: Vec<IndicatorCode> = Vec::new();
        for code in expression.indicators {
            if !catalog.contains(&code) {
                notes.push(format!("dropped indicator '{code}' missing from catalog"));
            } else if !indicators.contains(&code) {
                indicators.push(code);
            }
        }
        if indicators.is_empty() {
            return MigrationAction::Unresolvable {
                reason: "no configured indicator exists in the model catalog".to_string(),
            };
        }

        if record.algorithm_code.trim() != TOPSIS_ALGORITHM_CODE {
            notes.push(format!(
                "normalised algorithm code '{}' to '{TOPSIS_ALGORITHM_CODE}'",
                record.algorithm_code
            ));
        }
        let output_param = if record.output_param.trim().is_empty() {
            notes.push(format!("set missing output param to '{}'", self.default_output_param));
            self.default_output_param.clone()
        } else {
            record.output_param.clone()
        };

        MigrationAction::Rewrite {
            record: StoredExpression {
                algorithm_code: TOPSIS_ALGORITHM_CODE.to_string(),
                expression: ExpressionCodec::encode(&TopsisExpression {
                    orientation: expression.orientation,
                    indicators,
                }),
                output_param,
            },
            notes,
        }
    }
}

/// Problems of one record under the current format and catalog.
fn inspect(entry: &StepExpression, catalog: &BTreeSet<IndicatorCode>) -> Vec<String> {
    let record = &entry.record;
    let mut issues = Vec::new();

    match TopsisConfiguration::from_expression(
        Some(entry.step.step_id),
        record.algorithm_code.trim(),
        record.output_param.clone(),
        &record.expression,
    ) {
        Some(config) => {
            issues.extend(config.problems());
            issues.extend(
                config
                    .indicators
                    .iter()
                    .filter(|code| !catalog.contains(*code))
                    .map(|code| format!("indicator '{code}' is not in the model catalog")),
            );
        }
        None => {
            let defect = ExpressionCodec::inspect(&record.expression)
                .err()
                .map(|d| d.to_string())
                .unwrap_or_default();
            issues.push(format!(
                "expression '{}' does not decode: {defect}",
                record.expression
            ));
            if record.algorithm_code.trim() != TOPSIS_ALGORITHM_CODE {
                issues.push(format!(
                    "algorithm code '{}' is not '{TOPSIS_ALGORITHM_CODE}'",
                    record.algorithm_code
                ));
            }
        }
    }
    issues
}
