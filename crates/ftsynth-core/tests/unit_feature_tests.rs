//! Unit tests for feature construction
//!
//! Covers type checking, entity checks, window validation, naming and
//! identity parity between explicit construction and operator sugar.

use chrono::TimeDelta;
use ftsynth_core::*;
use std::sync::Arc;

struct Schemas {
    customers: Arc<EntitySchema>,
    sessions: Arc<EntitySchema>,
    log: Arc<EntitySchema>,
    int_log: Arc<EntitySchema>,
    sessions_customers: Relationship,
    log_sessions: Relationship,
}

fn schemas() -> Schemas {
    let customers = Arc::new(
        EntitySchema::new("customers", "id")
            .add_variable("age", VariableType::Numeric)
            .add_variable("loves_ice_cream", VariableType::Boolean),
    );
    let sessions = Arc::new(
        EntitySchema::new("sessions", "id").add_variable("customer_id", VariableType::Id),
    );
    let log = Arc::new(
        EntitySchema::new("log", "id")
            .add_variable("session_id", VariableType::Id)
            .add_variable("product_id", VariableType::Id)
            .add_variable("value", VariableType::Numeric)
            .add_variable("value_2", VariableType::Numeric)
            .add_variable("datetime", VariableType::Datetime)
            .with_time_index("datetime", TimeIndexKind::Datetime),
    );
    let int_log = Arc::new(
        EntitySchema::new("int_log", "id")
            .add_variable("session_id", VariableType::Id)
            .add_variable("value", VariableType::Numeric)
            .add_variable("time", VariableType::Numeric)
            .with_time_index("time", TimeIndexKind::Integer),
    );
    let sessions_customers =
        Relationship::new(customers.clone(), sessions.clone(), "customer_id").unwrap();
    let log_sessions = Relationship::new(sessions.clone(), log.clone(), "session_id").unwrap();

    Schemas {
        customers,
        sessions,
        log,
        int_log,
        sessions_customers,
        log_sessions,
    }
}

// =============================================================================
// Type checking
// =============================================================================

#[test]
fn test_datetime_part_rejects_numeric_input() {
    let s = schemas();
    let value = Feature::variable(&s.log, "value").unwrap();

    let err = Feature::transform(Primitive::Hour, &value).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Primitive hour does not accept input type numeric for slot 0"
    );
}

#[test]
fn test_arithmetic_rejects_categorical_literal() {
    let s = schemas();
    let value = Feature::variable(&s.log, "value").unwrap();

    let err = (&value + "two").unwrap_err();
    assert!(matches!(err, CoreError::TypeMismatch { slot: 1, .. }));
}

#[test]
fn test_datetime_subtraction_yields_timedelta() {
    let s = schemas();
    let datetime = Feature::variable(&s.log, "datetime").unwrap();

    let delta = (&datetime - &datetime).unwrap();
    assert_eq!(delta.variable_type(), VariableType::Timedelta);
}

#[test]
fn test_cumulative_requires_discrete_group() {
    let s = schemas();
    let value = Feature::variable(&s.log, "value").unwrap();
    let value_2 = Feature::variable(&s.log, "value_2").unwrap();

    let err = Feature::cumulative(Primitive::CumSum, &value, &value_2, FeatureConfig::new())
        .unwrap_err();
    assert!(matches!(err, CoreError::TypeMismatch { slot: 1, .. }));
}

#[test]
fn test_where_clause_must_be_boolean() {
    let s = schemas();
    let value = Feature::variable(&s.log, "value").unwrap();
    let session = Feature::variable(&s.log, "session_id").unwrap();

    let err = Feature::cumulative(
        Primitive::CumSum,
        &value,
        &session,
        FeatureConfig::new().with_where(value.clone()),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidOperand(_)));
}

// =============================================================================
// Entities
// =============================================================================

#[test]
fn test_transform_operands_share_entity() {
    let s = schemas();
    let value = Feature::variable(&s.log, "value").unwrap();
    let age = Feature::variable(&s.customers, "age").unwrap();

    let err = (&value + &age).unwrap_err();
    assert!(matches!(err, CoreError::EntityMismatch(_)));
}

#[test]
fn test_direct_feature_chain() {
    let s = schemas();
    let age = Feature::variable(&s.customers, "age").unwrap();

    let session_age = Feature::direct(&age, &s.sessions_customers).unwrap();
    assert_eq!(session_age.entity().name, "sessions");
    assert_eq!(session_age.name(), "customers.age");

    let log_age = Feature::direct(&session_age, &s.log_sessions).unwrap();
    assert_eq!(log_age.entity().name, "log");
    assert_eq!(log_age.name(), "sessions.customers.age");
    assert_eq!(log_age.variable_type(), VariableType::Numeric);

    let err = Feature::direct(&age, &s.log_sessions).unwrap_err();
    assert!(matches!(err, CoreError::EntityMismatch(_)));
}

#[test]
fn test_aggregation_names_and_entity() {
    let s = schemas();
    let value = Feature::variable(&s.log, "value").unwrap();

    let count = Feature::count(&s.log_sessions).unwrap();
    assert_eq!(count.name(), "COUNT(log)");
    assert_eq!(count.entity().name, "sessions");

    let sum = Feature::aggregate(Primitive::Sum, &value, &s.log_sessions).unwrap();
    assert_eq!(sum.name(), "SUM(log.value)");

    let gate = value.gt(3).unwrap();
    let gated = Feature::aggregate_where(Primitive::Mean, &value, &s.log_sessions, &gate).unwrap();
    assert_eq!(gated.name(), "MEAN(log.value WHERE value > 3)");
    assert_ne!(gated, Feature::aggregate(Primitive::Mean, &value, &s.log_sessions).unwrap());
}

#[test]
fn test_aggregation_requires_relationship() {
    let s = schemas();
    let value = Feature::variable(&s.log, "value").unwrap();

    let err = Feature::transform(Primitive::Sum, &value).unwrap_err();
    assert!(matches!(err, CoreError::InvalidOperand(_)));

    let customer = Feature::variable(&s.sessions, "customer_id").unwrap();
    let err = Feature::aggregate(Primitive::Mode, &customer, &s.log_sessions).unwrap_err();
    assert!(matches!(err, CoreError::EntityMismatch(_)));
}

// =============================================================================
// Windows
// =============================================================================

#[test]
fn test_duration_window_on_integer_time_index_is_rejected() {
    let s = schemas();
    let value = Feature::variable(&s.int_log, "value").unwrap();
    let session = Feature::variable(&s.int_log, "session_id").unwrap();

    let err = Feature::cumulative(
        Primitive::CumSum,
        &value,
        &session,
        FeatureConfig::new().with_window(Window::duration(TimeDelta::minutes(3))),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidWindow(_)));

    let ok = Feature::cumulative(
        Primitive::CumSum,
        &value,
        &session,
        FeatureConfig::new().with_window(Window::observations(3)),
    )
    .unwrap();
    assert_eq!(ok.name(), "CUM_SUM(value by session_id, last 3 observations)");
}

#[test]
fn test_duration_window_on_datetime_time_index() {
    let s = schemas();
    let value = Feature::variable(&s.log, "value").unwrap();
    let session = Feature::variable(&s.log, "session_id").unwrap();

    let cum = Feature::cumulative(
        Primitive::CumMean,
        &value,
        &session,
        FeatureConfig::new().with_window(Window::duration(TimeDelta::seconds(40))),
    )
    .unwrap();
    assert_eq!(cum.name(), "CUM_MEAN(value by session_id, last 40 seconds)");
}

#[test]
fn test_zero_observation_window_is_rejected() {
    let s = schemas();
    let value = Feature::variable(&s.log, "value").unwrap();
    let session = Feature::variable(&s.log, "session_id").unwrap();

    let err = Feature::cumulative(
        Primitive::CumMax,
        &value,
        &session,
        FeatureConfig::new().with_window(Window::observations(0)),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidWindow(_)));
}

#[test]
fn test_window_changes_identity() {
    let s = schemas();
    let value = Feature::variable(&s.log, "value").unwrap();
    let session = Feature::variable(&s.log, "session_id").unwrap();

    let unbounded =
        Feature::cumulative(Primitive::CumSum, &value, &session, FeatureConfig::new()).unwrap();
    let bounded = Feature::cumulative(
        Primitive::CumSum,
        &value,
        &session,
        FeatureConfig::new().with_window(Window::observations(3)),
    )
    .unwrap();
    assert_ne!(unbounded.id(), bounded.id());
}

// =============================================================================
// Overload parity
// =============================================================================

#[test]
fn test_comparison_parity() -> anyhow::Result<()> {
    let s = schemas();
    let value = Feature::variable(&s.log, "value")?;

    let explicit = Feature::construct(
        Primitive::GreaterThan,
        vec![value.clone().into(), Operand::from(2)],
        FeatureConfig::new(),
    )?;
    assert_eq!(value.gt(2)?, explicit);

    // 2 < value is value > 2
    let mirrored = Feature::construct(
        Primitive::LessThan,
        vec![Operand::from(2), value.clone().into()],
        FeatureConfig::new(),
    )?;
    assert_eq!(mirrored, explicit);
    assert_eq!(mirrored.name(), "value > 2");
    Ok(())
}

#[test]
fn test_commutative_parity_for_every_commutative_primitive() -> anyhow::Result<()> {
    let s = schemas();
    let value = Feature::variable(&s.log, "value")?;
    let value_2 = Feature::variable(&s.log, "value_2")?;
    let a = value.gt(1)?;
    let b = value_2.gt(1)?;

    for primitive in Primitive::ALL.into_iter().filter(Primitive::is_commutative) {
        let (x, y) = if primitive == Primitive::And || primitive == Primitive::Or {
            (&a, &b)
        } else {
            (&value, &value_2)
        };
        let forward = Feature::construct(primitive, vec![x.into(), y.into()], FeatureConfig::new())?;
        let backward = Feature::construct(primitive, vec![y.into(), x.into()], FeatureConfig::new())?;
        assert_eq!(forward.id(), backward.id(), "{}", primitive);
        assert_eq!(forward.name(), backward.name(), "{}", primitive);
    }
    Ok(())
}

#[test]
fn test_non_commutative_order_is_kept() -> anyhow::Result<()> {
    let s = schemas();
    let value = Feature::variable(&s.log, "value")?;
    let value_2 = Feature::variable(&s.log, "value_2")?;

    assert_ne!((&value / &value_2)?, (&value_2 / &value)?);
    assert_ne!(value.lt(&value_2)?, value_2.lt(&value)?);
    assert_eq!((&value / &value_2)?.name(), "value / value_2");
    Ok(())
}

#[test]
fn test_nested_names_are_parenthesized() -> anyhow::Result<()> {
    let s = schemas();
    let value = Feature::variable(&s.log, "value")?;
    let value_2 = Feature::variable(&s.log, "value_2")?;

    let sum = (&value - &value_2)?;
    let scaled = (&sum * 2)?;
    assert_eq!(scaled.name(), "(value - value_2) * 2");
    Ok(())
}
