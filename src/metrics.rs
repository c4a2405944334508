//! Prometheus metrics & middleware helper.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

/// Global Prometheus handle reused in tests.
pub static METRICS: Lazy<PrometheusMetrics> = Lazy::new(|| {
    PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics") // exposed URL
        .build()
        .expect("metrics builder")
});

/// Applications submitted for review.
pub static CHARACTERS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new("characters_submitted_total", "Character applications submitted")
        .expect("counter");
    METRICS.registry.register(Box::new(c.clone())).ok();
    c
});

/// Review verdicts, labelled approved / rejected.
pub static CHARACTERS_REVIEWED: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new("characters_reviewed_total", "Character review verdicts"),
        &["verdict"],
    )
    .expect("counter vec");
    METRICS.registry.register(Box::new(c.clone())).ok();
    c
});

/// Rules-test gradings, labelled passed / failed.
pub static TESTS_GRADED: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new("rules_tests_graded_total", "Rules-test grading outcomes"),
        &["outcome"],
    )
    .expect("counter vec");
    METRICS.registry.register(Box::new(c.clone())).ok();
    c
});
