//! Documentation tooling: scan a project for docs, score their quality,
//! check them against the code, plan improvements, and generate skeletons
//! for the documents a project is missing.

pub mod consistency;
pub mod error;
pub mod generate;
pub mod improve;
pub mod quality;
pub mod report;
pub mod scan;

use serde::Serialize;

pub use {
    consistency::{ConsistencyChecker, ConsistencyIssue, IssueKind},
    error::{Error, Result},
    generate::{DocKind, DocsGenerator, GeneratedDoc, ProjectFacts},
    improve::{ImprovementPlan, suggest},
    quality::{DimensionScores, QualityAnalyzer, QualityReport, score_document},
    scan::DocScanner,
};

/// Severity of a documentation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
        }
    }
}
