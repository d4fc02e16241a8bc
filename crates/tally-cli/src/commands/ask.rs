//! Question answering commands
//!
//! A question is routed to an analysis (by the narrator when one is
//! configured, by keyword otherwise), the analysis runs, and the narrator
//! explains the result. Without a narrator the detailed report is shown.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use tally_core::narrative::classify_with_fallback;
use tally_core::{AnalysisKind, AnalysisReport, AnalyticsEngine, Narrator, NarratorClient, Transaction};

use super::analyze::{print_json, write_report};

/// The result of answering one question
#[derive(Debug)]
pub struct Answer {
    pub report: AnalysisReport,
    /// Narrator prose; `None` when no narrator is available or it failed
    pub narrative: Option<String>,
}

/// Route a question, run the matching analysis and narrate it
///
/// Returns `None` when the question matches no analysis.
pub async fn answer_question(
    engine: &AnalyticsEngine,
    transactions: &[Transaction],
    narrator: Option<&NarratorClient>,
    question: &str,
) -> Option<Answer> {
    let kind = classify_with_fallback(narrator, question).await?;
    let report = engine.run(kind, transactions)?;

    let narrative = match narrator {
        Some(narrator) => match narrator.narrate(&report).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(
                    analysis = %kind,
                    error = %e,
                    "Narration failed, showing detailed report"
                );
                None
            }
        },
        None => None,
    };

    Some(Answer { report, narrative })
}

/// Print an answer: narrative first, detailed report when asked for or
/// when there is no narrative
pub fn write_answer<W: Write>(out: &mut W, answer: &Answer, details: bool) -> io::Result<()> {
    if let Some(ref narrative) = answer.narrative {
        writeln!(out)?;
        writeln!(out, "🤖 {}", answer.report.kind().label())?;
        writeln!(out)?;
        writeln!(out, "{}", narrative)?;
    }
    if details || answer.narrative.is_none() {
        write_report(out, &answer.report)?;
    }
    Ok(())
}

fn write_unrouted<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "🤔 Sorry, I can't answer that question. Try asking about:")?;
    for kind in AnalysisKind::question_kinds() {
        writeln!(out, "   • {}", kind.label())?;
    }
    Ok(())
}

pub async fn cmd_ask(
    engine: &AnalyticsEngine,
    transactions: &[Transaction],
    narrator: Option<&NarratorClient>,
    question: &str,
    details: bool,
    json: bool,
) -> Result<()> {
    let answer = answer_question(engine, transactions, narrator, question).await;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match answer {
        Some(answer) if json => {
            let value = serde_json::json!({
                "question": question,
                "narrative": answer.narrative,
                "report": answer.report.to_json()?,
            });
            print_json(&mut out, &value)?;
        }
        Some(answer) => write_answer(&mut out, &answer, details)?,
        None if json => {
            print_json(&mut out, &serde_json::json!({ "question": question, "report": null }))?
        }
        None => write_unrouted(&mut out)?,
    }
    Ok(())
}

/// Read questions from `input` until end of input or quit/exit/q
pub async fn run_interactive<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    engine: &AnalyticsEngine,
    transactions: &[Transaction],
    narrator: Option<&NarratorClient>,
    details: bool,
) -> Result<usize> {
    let mut answered = 0;

    writeln!(out, "💬 Ask a question about your finances (quit to leave)")?;
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let question = line.trim();

        if matches!(question.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }
        if !question.is_empty() {
            match answer_question(engine, transactions, narrator, question).await {
                Some(answer) => {
                    write_answer(out, &answer, details)?;
                    answered += 1;
                }
                None => write_unrouted(out)?,
            }
            writeln!(out)?;
        }

        write!(out, "> ")?;
        out.flush()?;
    }

    writeln!(out, "👋 Goodbye!")?;
    Ok(answered)
}

pub async fn cmd_interactive(
    engine: &AnalyticsEngine,
    transactions: &[Transaction],
    narrator: Option<NarratorClient>,
    details: bool,
) -> Result<()> {
    let narrator = match narrator {
        Some(n) => {
            if n.health_check().await {
                Some(n)
            } else {
                println!(
                    "⚠️  Narrator {} is not reachable, showing detailed reports",
                    n.model()
                );
                None
            }
        }
        None => {
            println!("💡 Tip: Set OPENAI_COMPATIBLE_HOST for narrated answers");
            None
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let answered = run_interactive(
        stdin.lock(),
        &mut out,
        engine,
        transactions,
        narrator.as_ref(),
        details,
    )
    .await?;

    tracing::debug!(answered, "Interactive session ended");
    Ok(())
}
