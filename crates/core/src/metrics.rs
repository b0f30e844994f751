//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Reference lookups (counts by outcome, latency)
//! - Composite assembly (lookups per page)
//! - Ingest pipeline (jobs, records)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Reference Lookup Metrics
// =============================================================================

/// Reference lookups total by kind and outcome.
pub static REFERENCE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "inventory_reference_lookups_total",
            "Total reference lookups",
        ),
        &["kind", "outcome"], // outcome: "found", "not_found", "error", "timeout"
    )
    .unwrap()
});

/// Reference lookup duration in seconds.
pub static LOOKUP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "inventory_reference_lookup_duration_seconds",
            "Duration of reference lookups",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["kind"],
    )
    .unwrap()
});

/// Deduplicated lookups issued per composite page.
pub static PAGE_LOOKUPS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "inventory_composite_page_lookups",
            "Number of deduplicated lookups issued per composite page",
        )
        .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Ingest Metrics
// =============================================================================

/// Ingest jobs finished by outcome.
pub static INGEST_JOBS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("inventory_ingest_jobs_total", "Total ingest jobs finished"),
        &["outcome"], // "completed", "failed"
    )
    .unwrap()
});

/// Records persisted by the ingest pipeline.
pub static INGEST_RECORDS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "inventory_ingest_records_total",
        "Total records persisted by the ingest pipeline",
    )
    .unwrap()
});

/// Ingest batch duration in seconds.
pub static INGEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "inventory_ingest_duration_seconds",
            "Duration of ingest batch processing",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["outcome"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Reference lookups
        Box::new(REFERENCE_LOOKUPS.clone()),
        Box::new(LOOKUP_DURATION.clone()),
        Box::new(PAGE_LOOKUPS.clone()),
        // Ingest
        Box::new(INGEST_JOBS.clone()),
        Box::new(INGEST_RECORDS.clone()),
        Box::new(INGEST_DURATION.clone()),
    ]
}
