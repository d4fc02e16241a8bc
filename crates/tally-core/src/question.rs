//! Question routing
//!
//! Maps free-form user questions onto an [`AnalysisKind`]. Two entry points:
//! - [`route_question`] classifies locally with ordered keyword rules
//! - [`normalize_label`] interprets the label a text-generation backend
//!   returned when asked to classify the question

use crate::analysis::AnalysisKind;

/// Ordered keyword rules, first match wins.
///
/// Loan comes first so "can I borrow if I cut spending" is not read as a
/// savings question; anomalies before categories since "unusual expenses"
/// also mentions expenses.
const QUESTION_RULES: &[(AnalysisKind, &[&str])] = &[
    (
        AnalysisKind::Loan,
        &["borrow", "loan", "mortgage", "credit", "emprunt", "crédit"],
    ),
    (
        AnalysisKind::PaymentMix,
        &[
            "direct debit",
            "recurring",
            "automatic",
            "one-off",
            "subscription",
            "card payment",
            "prélèvement",
            "prelevement",
        ],
    ),
    (
        AnalysisKind::Anomalies,
        &[
            "unusual",
            "anomal",
            "abnormal",
            "outlier",
            "suspicious",
            "strange",
            "inhabituel",
        ],
    ),
    (
        AnalysisKind::Savings,
        &["save", "saving", "economi", "économi", "cut back", "reduce"],
    ),
    (
        AnalysisKind::Categories,
        &["categor", "spend", "expense", "budget", "dépense", "where does my money"],
    ),
];

/// Classify a question by keyword, `None` when nothing matches
pub fn route_question(question: &str) -> Option<AnalysisKind> {
    let question = question.to_lowercase();
    let kind = QUESTION_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| question.contains(k)))
        .map(|(kind, _)| *kind);

    tracing::debug!(
        kind = kind.map(|k| k.as_str()).unwrap_or("unknown"),
        "Routed question"
    );
    kind
}

/// Map a backend's free-form classification label onto a kind
///
/// Accepts the canonical names (`payment_mix`, `categories`, ...) as well as
/// looser replies such as "2. categories - spending by category".
pub fn normalize_label(label: &str) -> Option<AnalysisKind> {
    let label = label.trim().to_lowercase();

    if label.contains("payment_mix") || label.contains("payment mix") || label.contains("recurring")
    {
        Some(AnalysisKind::PaymentMix)
    } else if label.contains("anomal") || label.contains("unusual") {
        Some(AnalysisKind::Anomalies)
    } else if label.contains("categor") || label.contains("spending") {
        Some(AnalysisKind::Categories)
    } else if label.contains("saving") {
        Some(AnalysisKind::Savings)
    } else if label.contains("loan") || label.contains("borrow") || label.contains("mortgage") {
        Some(AnalysisKind::Loan)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_question() {
        let cases = [
            (
                "What share of my spending goes to direct debits?",
                Some(AnalysisKind::PaymentMix),
            ),
            (
                "What are my main spending categories?",
                Some(AnalysisKind::Categories),
            ),
            (
                "Did I have any unusual expenses recently?",
                Some(AnalysisKind::Anomalies),
            ),
            (
                "Can I save 200 a month?",
                Some(AnalysisKind::Savings),
            ),
            (
                "How much could I borrow for a house?",
                Some(AnalysisKind::Loan),
            ),
            ("What's the weather like?", None),
        ];
        for (question, expected) in cases {
            assert_eq!(route_question(question), expected, "{}", question);
        }
    }

    #[test]
    fn test_route_question_priority() {
        // Mentions saving, but is about borrowing
        assert_eq!(
            route_question("If I save more, how big a mortgage can I get?"),
            Some(AnalysisKind::Loan)
        );
        // Mentions expenses, but is about outliers
        assert_eq!(
            route_question("Any strange expenses this quarter?"),
            Some(AnalysisKind::Anomalies)
        );
    }

    #[test]
    fn test_route_question_is_case_insensitive() {
        assert_eq!(route_question("MORTGAGE"), Some(AnalysisKind::Loan));
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("payment_mix"), Some(AnalysisKind::PaymentMix));
        assert_eq!(
            normalize_label("  2. Categories - spending by category\n"),
            Some(AnalysisKind::Categories)
        );
        assert_eq!(normalize_label("ANOMALIES"), Some(AnalysisKind::Anomalies));
        assert_eq!(normalize_label("savings"), Some(AnalysisKind::Savings));
        assert_eq!(normalize_label("loan"), Some(AnalysisKind::Loan));
        assert_eq!(normalize_label("unknown"), None);
        assert_eq!(normalize_label(""), None);
    }

    #[test]
    fn test_normalize_label_accepts_every_canonical_name() {
        for kind in AnalysisKind::question_kinds() {
            assert_eq!(normalize_label(kind.as_str()), Some(*kind));
        }
    }
}
