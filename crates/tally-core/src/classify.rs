//! Transaction classifier
//!
//! Labels each transaction's payment mechanism from its description using an
//! ordered rule list. Rules are evaluated top to bottom and the first match
//! wins; a description no rule matches is [`TransactionType::Other`].
//!
//! Matching is case-insensitive for every pattern type.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::{Transaction, TransactionType};

/// How a rule pattern is matched against a description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    /// Case-insensitive substring match (supports | for OR)
    Contains,
    /// Regular expression match
    Regex,
    /// Exact string match (case-insensitive)
    Exact,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Regex => "regex",
            Self::Exact => "exact",
        }
    }
}

impl std::str::FromStr for PatternType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contains" => Ok(Self::Contains),
            "regex" => Ok(Self::Regex),
            "exact" => Ok(Self::Exact),
            _ => Err(format!("Unknown pattern type: {}", s)),
        }
    }
}

/// One classification rule as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierRule {
    /// The pattern to match against transaction descriptions
    pub pattern: String,
    #[serde(default = "default_pattern_type")]
    pub pattern_type: PatternType,
    pub transaction_type: TransactionType,
}

fn default_pattern_type() -> PatternType {
    PatternType::Contains
}

impl ClassifierRule {
    pub fn contains(pattern: &str, transaction_type: TransactionType) -> Self {
        Self {
            pattern: pattern.to_string(),
            pattern_type: PatternType::Contains,
            transaction_type,
        }
    }

    /// Built-in rules: direct-debit markers first, then card markers
    pub fn defaults() -> Vec<ClassifierRule> {
        vec![
            Self::contains("prlv|prelevement", TransactionType::RecurringDebit),
            Self::contains("cb|carte", TransactionType::PointOfSale),
        ]
    }
}

enum Matcher {
    Contains(Vec<String>),
    Regex(Regex),
    Exact(String),
}

impl Matcher {
    fn compile(rule: &ClassifierRule) -> Result<Self> {
        Ok(match rule.pattern_type {
            PatternType::Contains => Matcher::Contains(
                rule.pattern
                    .split('|')
                    .map(|p| p.trim().to_lowercase())
                    .filter(|p| !p.is_empty())
                    .collect(),
            ),
            PatternType::Regex => Matcher::Regex(
                RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()?,
            ),
            PatternType::Exact => Matcher::Exact(rule.pattern.trim().to_lowercase()),
        })
    }

    /// `desc_lower` is the already lower-cased description
    fn is_match(&self, desc_lower: &str) -> bool {
        match self {
            Matcher::Contains(needles) => needles.iter().any(|n| desc_lower.contains(n.as_str())),
            Matcher::Regex(re) => re.is_match(desc_lower),
            Matcher::Exact(expected) => desc_lower.trim() == expected,
        }
    }
}

/// Ordered, first-match-wins description classifier
pub struct TransactionClassifier {
    rules: Vec<(Matcher, TransactionType)>,
}

impl TransactionClassifier {
    /// Compile a rule list; fails only on an invalid regex pattern
    pub fn new(rules: &[ClassifierRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| Ok((Matcher::compile(rule)?, rule.transaction_type)))
            .collect::<Result<Vec<_>>>()?;
        debug!(rules = rules.len(), "Compiled transaction classifier");
        Ok(Self { rules })
    }

    /// Classify a description; total over all inputs
    pub fn classify(&self, description: &str) -> TransactionType {
        let desc_lower = description.to_lowercase();
        self.rules
            .iter()
            .find(|(matcher, _)| matcher.is_match(&desc_lower))
            .map(|(_, transaction_type)| *transaction_type)
            .unwrap_or(TransactionType::Other)
    }

    pub fn classify_transaction(&self, tx: &Transaction) -> TransactionType {
        self.classify(&tx.description)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for TransactionClassifier {
    fn default() -> Self {
        // Built-in rules are plain substrings and always compile
        Self {
            rules: ClassifierRule::defaults()
                .iter()
                .filter_map(|rule| Matcher::compile(rule).ok().map(|m| (m, rule.transaction_type)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let classifier = TransactionClassifier::default();
        assert_eq!(classifier.rule_count(), 2);

        assert_eq!(
            classifier.classify("PRLV SEPA EDF"),
            TransactionType::RecurringDebit
        );
        assert_eq!(
            classifier.classify("Prelevement assurance"),
            TransactionType::RecurringDebit
        );
        assert_eq!(
            classifier.classify("CB CARREFOUR 12/03"),
            TransactionType::PointOfSale
        );
        assert_eq!(
            classifier.classify("paiement carte boulangerie"),
            TransactionType::PointOfSale
        );
        assert_eq!(classifier.classify("VIR SALAIRE"), TransactionType::Other);
    }

    #[test]
    fn test_recurring_marker_wins_over_card_marker() {
        let classifier = TransactionClassifier::default();
        // Contains both "prlv" and "cb": earlier rule takes priority
        assert_eq!(
            classifier.classify("PRLV CB ASSURANCE"),
            TransactionType::RecurringDebit
        );
    }

    #[test]
    fn test_classifier_is_total() {
        let classifier = TransactionClassifier::default();
        for desc in ["", "   ", "😀", "nan", "12345"] {
            let t = classifier.classify(desc);
            assert!(TransactionType::all().contains(&t));
        }
        assert_eq!(classifier.classify(""), TransactionType::Other);
    }

    #[test]
    fn test_regex_and_exact_rules() {
        let rules = vec![
            ClassifierRule {
                pattern: r"^dd\s+\d+".to_string(),
                pattern_type: PatternType::Regex,
                transaction_type: TransactionType::RecurringDebit,
            },
            ClassifierRule {
                pattern: "Card Payment".to_string(),
                pattern_type: PatternType::Exact,
                transaction_type: TransactionType::PointOfSale,
            },
        ];
        let classifier = TransactionClassifier::new(&rules).unwrap();

        assert_eq!(
            classifier.classify("DD 4411 GYM"),
            TransactionType::RecurringDebit
        );
        assert_eq!(
            classifier.classify("card payment"),
            TransactionType::PointOfSale
        );
        assert_eq!(
            classifier.classify("card payment at shop"),
            TransactionType::Other
        );
    }

    #[test]
    fn test_invalid_regex_is_error() {
        let rules = vec![ClassifierRule {
            pattern: "([unclosed".to_string(),
            pattern_type: PatternType::Regex,
            transaction_type: TransactionType::Other,
        }];
        assert!(TransactionClassifier::new(&rules).is_err());
    }

    #[test]
    fn test_empty_rule_list_classifies_everything_as_other() {
        let classifier = TransactionClassifier::new(&[]).unwrap();
        assert_eq!(classifier.classify("PRLV EDF"), TransactionType::Other);
    }
}
