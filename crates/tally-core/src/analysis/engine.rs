//! Analytics Engine - registers analyzers and runs them over a snapshot

use crate::config::AnalyticsConfig;
use crate::models::Transaction;
use crate::Result;

use super::types::{AnalysisKind, AnalysisReport};
use super::{
    AnomalyDetector, CategoryAnalyzer, LoanCalculator, PaymentMixAnalyzer, SavingsPlanner,
    TrendAnalyzer,
};

/// Trait for analyzers
///
/// Implementations are pure: the same transactions always produce the same
/// report, and the input slice is never modified.
pub trait Analyzer: Send + Sync {
    /// Which analysis this is
    fn kind(&self) -> AnalysisKind;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Analyze the snapshot
    fn analyze(&self, transactions: &[Transaction]) -> AnalysisReport;
}

/// Holds one analyzer per kind and dispatches to it
pub struct AnalyticsEngine {
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl AnalyticsEngine {
    /// Create an engine with the built-in analyzers configured from `config`
    ///
    /// Fails only when a classifier rule does not compile.
    pub fn new(config: &AnalyticsConfig) -> Result<Self> {
        let mut engine = Self::empty();

        engine.register(Box::new(PaymentMixAnalyzer::from_config(config)?));
        engine.register(Box::new(CategoryAnalyzer::from_config(config)));
        engine.register(Box::new(AnomalyDetector::from_config(config)));
        engine.register(Box::new(TrendAnalyzer::from_config(config)));
        engine.register(Box::new(SavingsPlanner::from_config(config)));
        engine.register(Box::new(LoanCalculator::from_config(config)));

        Ok(engine)
    }

    /// An engine with nothing registered
    pub fn empty() -> Self {
        Self { analyzers: vec![] }
    }

    /// Register an analyzer, replacing any existing one of the same kind
    pub fn register(&mut self, analyzer: Box<dyn Analyzer>) {
        self.analyzers.retain(|a| a.kind() != analyzer.kind());
        self.analyzers.push(analyzer);
    }

    /// Run one analysis; `None` when no analyzer of that kind is registered
    pub fn run(&self, kind: AnalysisKind, transactions: &[Transaction]) -> Option<AnalysisReport> {
        let analyzer = self.analyzers.iter().find(|a| a.kind() == kind)?;
        let report = analyzer.analyze(transactions);
        tracing::debug!(
            analysis = kind.as_str(),
            transactions = transactions.len(),
            count = report.item_count(),
            "Analysis complete"
        );
        Some(report)
    }

    /// Run every registered analyzer, in [`AnalysisKind`] order
    pub fn run_all(&self, transactions: &[Transaction]) -> Vec<AnalysisReport> {
        self.kinds()
            .into_iter()
            .filter_map(|kind| self.run(kind, transactions))
            .collect()
    }

    /// Get list of registered analysis kinds
    pub fn kinds(&self) -> Vec<AnalysisKind> {
        let mut kinds: Vec<AnalysisKind> = self.analyzers.iter().map(|a| a.kind()).collect();
        kinds.sort();
        kinds
    }

    /// Name of the analyzer registered for `kind`
    pub fn analyzer_name(&self, kind: AnalysisKind) -> Option<&'static str> {
        self.analyzers
            .iter()
            .find(|a| a.kind() == kind)
            .map(|a| a.name())
    }
}
