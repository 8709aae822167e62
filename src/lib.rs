// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod types;
pub mod error;

// Matching core
pub mod vocabulary;
pub mod keywords;
pub mod eligibility;
pub mod scoring;
pub mod resume;

// Search pipeline
pub mod ingest;

// Service surface
pub mod api;
pub mod applications;
pub mod config;
pub mod debug;
pub mod metrics;
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::eligibility::EligibilityFilter;
pub use crate::ingest::SearchOrchestrator;
pub use crate::keywords::KeywordExtractor;
pub use crate::scoring::MatchScorer;
pub use crate::types::{JobMatch, JobPosting, Recommendation, ResumeData};
