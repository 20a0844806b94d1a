//! Shared e-commerce fixture for SDK integration tests
//!
//! Six entities: regions, stores, products, customers, sessions and log.
//! `log` has 17 rows over six sessions; the last two rows have no value.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use ftsynth_sdk::{
    EntitySchema, EntityTable, Feature, FeatureEngine, FeatureEngineBuilder, InMemoryEntitySet,
    Relationship, TimeIndexKind, Value, VariableType,
};
use std::sync::Arc;

pub const PRODUCTS: [&str; 6] = [
    "Haribo sugar-free gummy bears",
    "car",
    "toothpaste",
    "brown bag",
    "coke zero",
    "taco clock",
];

pub struct Ecommerce {
    pub es: InMemoryEntitySet,
    pub regions: Arc<EntitySchema>,
    pub stores: Arc<EntitySchema>,
    pub products: Arc<EntitySchema>,
    pub customers: Arc<EntitySchema>,
    pub sessions: Arc<EntitySchema>,
    pub log: Arc<EntitySchema>,
    pub regions_stores: Relationship,
    pub regions_customers: Relationship,
    pub customers_sessions: Relationship,
    pub sessions_log: Relationship,
    pub products_log: Relationship,
}

impl Ecommerce {
    /// Column feature of an entity
    pub fn var(&self, entity: &Arc<EntitySchema>, column: &str) -> Feature {
        Feature::variable(entity, column).unwrap()
    }

    /// Engine over this entity set
    pub fn engine(&self) -> FeatureEngine {
        engine_for(self.es.clone())
    }
}

pub fn engine_for(es: InMemoryEntitySet) -> FeatureEngine {
    FeatureEngineBuilder::new()
        .with_entity_source(Arc::new(es))
        .build()
        .unwrap()
}

pub fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

pub fn ids(n: i64) -> Vec<Value> {
    (0..n).map(Value::from).collect()
}

pub fn numbers(values: &[f64]) -> Vec<Value> {
    values.iter().map(|v| Value::Number(*v)).collect()
}

fn repeat(value: &str, n: usize) -> Vec<Value> {
    vec![Value::from(value); n]
}

pub fn log_values() -> Vec<Value> {
    let mut values = numbers(&[0., 5., 10., 15., 20., 0., 1., 2., 3., 0., 0., 5., 0., 7., 14.]);
    values.extend([Value::Null, Value::Null]);
    values
}

fn log_datetimes() -> Vec<NaiveDateTime> {
    let mut times = Vec::new();
    times.extend((0..5).map(|i| dt(2011, 4, 9, 10, 30, i * 6)));
    times.extend((0..4).map(|i| dt(2011, 4, 9, 10, 31, i * 9)));
    times.push(dt(2011, 4, 9, 10, 40, 0));
    times.extend((0..2).map(|i| dt(2011, 4, 10, 10, 40, i)));
    times.extend((0..3).map(|i| dt(2011, 4, 10, 10, 41, i * 3)));
    times.extend((0..2).map(|i| dt(2011, 4, 10, 11, 10, i * 3)));
    times
}

pub fn log_product_ids() -> Vec<Value> {
    [
        repeat("coke zero", 3),
        repeat("car", 2),
        repeat("toothpaste", 3),
        repeat("brown bag", 2),
        repeat("Haribo sugar-free gummy bears", 1),
        repeat("coke zero", 4),
        repeat("taco clock", 2),
    ]
    .concat()
}

/// Build the fixture; with `integer_time_index` the log is ordered by a
/// synthetic integer column instead of its datetimes
pub fn make_ecommerce_entityset(integer_time_index: bool) -> Ecommerce {
    let mut es = InMemoryEntitySet::new();

    let regions = es
        .add_entity(
            EntityTable::new("regions", "id")
                .with_column("id", VariableType::Index, ["United States", "Mexico"]),
        )
        .unwrap();

    let stores = es
        .add_entity(
            EntityTable::new("stores", "id")
                .with_column("id", VariableType::Index, 0..6)
                .with_column(
                    "region_id",
                    VariableType::Id,
                    [repeat("United States", 3), repeat("Mexico", 2), vec![Value::Null]].concat(),
                ),
        )
        .unwrap();

    let products = es
        .add_entity(
            EntityTable::new("products", "id")
                .with_column("id", VariableType::Index, PRODUCTS)
                .with_column("rating", VariableType::Numeric, [3.5, 4.0, 4.5, 1.5, 5.0, 5.0]),
        )
        .unwrap();

    let customers = es
        .add_entity(
            EntityTable::new("customers", "id")
                .with_column("id", VariableType::Index, [0, 1, 2])
                .with_column("age", VariableType::Numeric, [33, 25, 56])
                .with_column("region_id", VariableType::Id, repeat("United States", 3))
                .with_column("cohort", VariableType::Categorical, [0, 1, 0])
                .with_column("loves_ice_cream", VariableType::Boolean, [true, false, true])
                .with_column(
                    "signup_date",
                    VariableType::Datetime,
                    [
                        dt(2011, 4, 8, 0, 0, 0),
                        dt(2011, 4, 9, 0, 0, 0),
                        dt(2011, 4, 6, 0, 0, 0),
                    ],
                )
                .with_time_index("signup_date", TimeIndexKind::Datetime),
        )
        .unwrap();

    let sessions = es
        .add_entity(
            EntityTable::new("sessions", "id")
                .with_column("id", VariableType::Index, 0..6)
                .with_column("customer_id", VariableType::Id, [0, 0, 0, 1, 1, 2])
                .with_column("device_type", VariableType::Categorical, [0, 1, 1, 0, 0, 1]),
        )
        .unwrap();

    let log_table = EntityTable::new("log", "id")
        .with_column("id", VariableType::Index, 0..17)
        .with_column(
            "session_id",
            VariableType::Id,
            [0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 3, 3, 4, 4, 4, 5, 5],
        )
        .with_column("product_id", VariableType::Id, log_product_ids())
        .with_column("value", VariableType::Numeric, log_values())
        .with_column(
            "value_2",
            VariableType::Numeric,
            [
                numbers(&[0., 2., 4., 6., 8., 0., 1., 2., 3., 0., 0., 2., 0., 3., 6.]),
                vec![Value::Null, Value::Null],
            ]
            .concat(),
        )
        .with_column("datetime", VariableType::Datetime, log_datetimes());
    let log_table = if integer_time_index {
        log_table
            .with_column("time", VariableType::Numeric, 0..17)
            .with_time_index("time", TimeIndexKind::Integer)
    } else {
        log_table.with_time_index("datetime", TimeIndexKind::Datetime)
    };
    let log = es.add_entity(log_table).unwrap();

    let regions_stores = es.add_relationship("regions", "stores", "region_id").unwrap();
    let regions_customers = es.add_relationship("regions", "customers", "region_id").unwrap();
    let customers_sessions = es.add_relationship("customers", "sessions", "customer_id").unwrap();
    let sessions_log = es.add_relationship("sessions", "log", "session_id").unwrap();
    let products_log = es.add_relationship("products", "log", "product_id").unwrap();

    Ecommerce {
        es,
        regions,
        stores,
        products,
        customers,
        sessions,
        log,
        regions_stores,
        regions_customers,
        customers_sessions,
        sessions_log,
        products_log,
    }
}

/// Assert a column equals `expected`, treating two missing values as equal
pub fn assert_values(actual: &[Value], expected: &[Value]) {
    assert_eq!(actual.len(), expected.len(), "length of {:?}", actual);
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        if e.is_missing() {
            assert!(a.is_missing(), "row {}: expected missing, got {:?}", i, a);
        } else {
            assert_eq!(a, e, "row {}", i);
        }
    }
}
