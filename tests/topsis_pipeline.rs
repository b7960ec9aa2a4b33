//! Integration tests for the TOPSIS pipeline.
//!
//! These tests verify the end-to-end flow:
//! 1. Config service encodes a configuration onto a step record
//! 2. Evaluation service decodes it, scores data and validates the results
//! 3. Diagnostics explain the same data without any stored configuration
//! 4. Migration upgrades legacy step records and can roll them back
//!
//! Uses the in-memory adapters so no external services are needed.

use approx::assert_relative_eq;
use std::sync::Arc;

use topsis_evaluator::adapters::{InMemoryIndicatorCatalog, InMemoryStepAlgorithmStore, WeightedDataLoader};
use topsis_evaluator::application::handlers::{
    EvaluationError, MigrationAction, TopsisConfigService, TopsisEvaluationService,
    TopsisMigrationService,
};
use topsis_evaluator::config::TopsisConfig;
use topsis_evaluator::domain::foundation::{IndicatorCode, ModelId, StepId};
use topsis_evaluator::domain::topsis::{
    ExpressionCodec, Orientation, TopsisCalculator, TopsisConfiguration, TopsisDiagnostics,
    TopsisResultValidator, TraceStage, WeightedData, NEUTRAL_SCORE,
};
use topsis_evaluator::ports::{StepAlgorithmStore, StoredExpression};

// =============================================================================
// Test Infrastructure
// =============================================================================

const MODEL: i64 = 42;

struct Harness {
    store: Arc<InMemoryStepAlgorithmStore>,
    configs: Arc<TopsisConfigService>,
    evaluation: TopsisEvaluationService,
    migration: TopsisMigrationService,
}

async fn harness() -> Harness {
    let settings = TopsisConfig::default();
    let store = Arc::new(InMemoryStepAlgorithmStore::new());
    store.register_step(StepId::new(1), model(), "disaster_rank").await;
    store.register_step(StepId::new(2), model(), "cost_rank").await;

    let catalog = Arc::new(InMemoryIndicatorCatalog::new());
    catalog
        .set_indicators(model(), ["prep_score", "shelter_capacity", "response_cost"])
        .await;

    let configs = Arc::new(TopsisConfigService::new(
        store.clone(),
        catalog.clone(),
        settings.default_output_param.clone(),
    ));
    let evaluation = TopsisEvaluationService::new(
        configs.clone(),
        TopsisCalculator::new(settings.calculator_settings()),
        TopsisResultValidator::new(settings.validator_settings()),
    );
    let migration = TopsisMigrationService::new(store.clone(), catalog, settings.default_output_param);

    Harness {
        store,
        configs,
        evaluation,
        migration,
    }
}

fn model() -> ModelId {
    ModelId::new(MODEL)
}

fn regions() -> WeightedData {
    WeightedData::new()
        .with_entity("north", [("prep_score", 0.9), ("shelter_capacity", 0.8)])
        .with_entity("south", [("prep_score", 0.2), ("shelter_capacity", 0.1)])
        .with_entity("east", [("prep_score", 0.55), ("shelter_capacity", 0.45)])
}

// =============================================================================
// Configure and evaluate
// =============================================================================

#[tokio::test]
async fn configured_step_scores_regions() {
    let h = harness().await;
    let config = TopsisConfiguration::new(
        StepId::new(1),
        ["prep_score", "shelter_capacity"],
        "disaster_score",
        Orientation::Positive,
    )
    .unwrap()
    .located_at(model(), "disaster_rank");

    let stored = h.configs.create(&config).await.unwrap();
    assert_eq!(
        stored.original_expression.as_deref(),
        Some("@TOPSIS_POSITIVE:prep_score,shelter_capacity")
    );

    let outcome = h
        .evaluation
        .evaluate(model(), "disaster_rank", &regions())
        .await
        .unwrap();

    assert!(outcome.validation.valid);
    assert_relative_eq!(outcome.results["north"].comprehensive_score, 1.0, epsilon = 1e-9);
    assert_relative_eq!(outcome.results["south"].comprehensive_score, 0.0, epsilon = 1e-9);
    let east = outcome.results["east"].comprehensive_score;
    assert!(east > 0.0 && east < 1.0);

    let published = outcome.published_scores();
    assert!(published["north"].contains_key("disaster_score_positive"));
}

#[tokio::test]
async fn updating_orientation_reverses_ranking() {
    let h = harness().await;
    h.configs
        .update_by_step(
            model(),
            "cost_rank",
            vec![IndicatorCode::from("prep_score")],
            "TOPSIS_NEGATIVE",
        )
        .await
        .unwrap();

    let outcome = h.evaluation.evaluate(model(), "cost_rank", &regions()).await.unwrap();

    assert_relative_eq!(outcome.results["south"].comprehensive_score, 1.0, epsilon = 1e-9);
    assert_relative_eq!(outcome.results["north"].comprehensive_score, 0.0, epsilon = 1e-9);
}

#[tokio::test]
async fn deleted_configuration_cannot_be_evaluated() {
    let h = harness().await;
    h.configs
        .update_by_step(
            model(),
            "cost_rank",
            vec![IndicatorCode::from("response_cost")],
            "TOPSIS_NEGATIVE",
        )
        .await
        .unwrap();
    h.configs.delete(model(), "cost_rank").await.unwrap();

    let err = h
        .evaluation
        .evaluate(model(), "cost_rank", &regions())
        .await
        .unwrap_err();
    assert!(matches!(err, EvaluationError::ConfigurationMissing { .. }));
}

#[tokio::test]
async fn identical_regions_score_neutral() {
    let h = harness().await;
    h.configs
        .update_by_step(
            model(),
            "disaster_rank",
            vec![IndicatorCode::from("prep_score")],
            "TOPSIS_POSITIVE",
        )
        .await
        .unwrap();
    let data = WeightedData::new()
        .with_entity("a", [("prep_score", 0.5)])
        .with_entity("b", [("prep_score", 0.5)]);

    let outcome = h.evaluation.evaluate(model(), "disaster_rank", &data).await.unwrap();

    for result in outcome.results.values() {
        assert_eq!(result.comprehensive_score, NEUTRAL_SCORE);
    }
}

// =============================================================================
// Diagnostics
// =============================================================================

#[tokio::test]
async fn diagnostics_over_loaded_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("regions.yaml");
    tokio::fs::write(
        &path,
        "north:\n  prep_score: 0.9\n  shelter_capacity: 0.8\nsouth:\n  prep_score: 0.2\n  shelter_capacity: null\nwest: null\n",
    )
    .await
    .unwrap();

    let data = WeightedDataLoader::new().load(&path).await.unwrap();
    let diagnostics = TopsisDiagnostics::default();

    let report = diagnostics.diagnose(&data, model(), "disaster_rank");
    assert_eq!(report.metrics.entity_count, 3);
    assert!(report.input_summary.null_entities.contains(&"west".to_string()));
    let details = report.calculation_details.as_ref().unwrap();
    assert!(!details.results["south"].is_complete());

    let trace = diagnostics.generate_calculation_log(&data, model(), "disaster_rank");
    assert_eq!(trace.input_size, 3);
    assert_eq!(trace.steps.first().map(|s| s.stage), Some(TraceStage::InputValidation));
    assert_eq!(trace.steps.last().map(|s| s.stage), Some(TraceStage::ResultValidation));
}

#[tokio::test]
async fn empty_data_is_diagnosed_without_calculation() {
    let diagnostics = TopsisDiagnostics::default();
    let report = diagnostics.diagnose(&WeightedData::new(), model(), "disaster_rank");

    assert!(report.has_issues);
    assert!(report.calculation_details.is_none());

    let trace = diagnostics.generate_calculation_log(&WeightedData::new(), model(), "disaster_rank");
    assert!(!trace.success);
    assert_eq!(trace.steps.len(), 1);
}

// =============================================================================
// Migration
// =============================================================================

#[tokio::test]
async fn legacy_records_migrate_and_roll_back() {
    let h = harness().await;
    let legacy = StoredExpression {
        algorithm_code: "topsis".to_string(),
        expression: "topsis_positive:prep_score;retired_indicator".to_string(),
        output_param: "disaster_score".to_string(),
    };
    h.store
        .set_expression(model(), "disaster_rank", legacy.clone())
        .await
        .unwrap();

    let report = h.migration.check_compatibility(model()).await.unwrap();
    assert!(!report.compatible);

    let plan = h.migration.analyze_migration(model()).await.unwrap();
    assert!(plan.is_consistent());
    let MigrationAction::Rewrite { record, notes } = &plan.entries[0].action else {
        panic!("expected a rewrite, got {:?}", plan.entries[0].action);
    };
    assert_eq!(record.expression, "@TOPSIS_POSITIVE:prep_score");
    assert!(notes.iter().any(|n| n.contains("retired_indicator")));

    let outcome = h.migration.execute_migration(model(), false).await.unwrap();
    assert!(outcome.success);
    assert!(h.migration.check_compatibility(model()).await.unwrap().compatible);
    let evaluated = h
        .evaluation
        .evaluate(model(), "disaster_rank", &regions())
        .await
        .unwrap();
    assert_eq!(evaluated.configuration.output_param, "disaster_score");

    h.migration.rollback(model(), &outcome.applied).await.unwrap();
    let restored = h
        .store
        .get_expression(model(), "disaster_rank")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restored, legacy);
    assert!(!ExpressionCodec::is_well_formed(&restored.expression));
}

#[tokio::test]
async fn other_algorithms_on_the_model_are_left_alone() {
    let h = harness().await;
    let grade = StoredExpression {
        algorithm_code: "GRADE".to_string(),
        expression: "grade(topsis_score)".to_string(),
        output_param: "grade".to_string(),
    };
    h.store
        .register_step_with(StepId::new(3), model(), "grade", grade.clone())
        .await;

    let err = h
        .configs
        .update_by_step(model(), "grade", vec![IndicatorCode::from("prep_score")], "TOPSIS_POSITIVE")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("GRADE"));
    assert!(h.configs.delete(model(), "grade").await.is_err());

    let report = h.migration.check_compatibility(model()).await.unwrap();
    assert!(report.compatible);
    assert_eq!(report.checked_steps, 0);

    assert_eq!(
        h.store.get_expression(model(), "grade").await.unwrap(),
        Some(grade)
    );
}
