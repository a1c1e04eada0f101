//! End-to-end pipeline scenarios.
