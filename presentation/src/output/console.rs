//! Console output formatter for planning results

use colored::{ColoredString, Colorize};
use planner_domain::util::{ellipsize, first_line};
use planner_domain::{IterationRecord, OutputFormat, PlanResult, PlanStatus, Verdict};

const REASON_WIDTH: usize = 100;

/// Formats planning results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render `result` in the requested format
    pub fn render(result: &PlanResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(result),
            OutputFormat::Plan => Self::format_plan_only(result),
            OutputFormat::Json => Self::format_json(result),
        }
    }

    /// Format the complete result with the per-iteration vote breakdown
    pub fn format(result: &PlanResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Self-Critique Planning Result"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Status:".cyan().bold(),
            Self::status_label(result.status)
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Iterations:".cyan().bold(),
            result.iterations
        ));
        if let Some(verdict) = result.final_verdict {
            output.push_str(&format!(
                "{} {}\n",
                "Final verdict:".cyan().bold(),
                Self::verdict_label(verdict)
            ));
        }
        if result.usage.total() > 0 {
            output.push_str(&format!(
                "{} {} in / {} out\n",
                "Tokens:".cyan().bold(),
                result.usage.input_tokens,
                result.usage.output_tokens
            ));
        }
        if let Some(error) = &result.error {
            output.push_str(&format!("{} {}\n", "Error:".red().bold(), error));
        }

        if !result.iteration_history.is_empty() {
            output.push_str(&Self::section_header("Iterations"));
            for record in &result.iteration_history {
                output.push_str(&Self::format_iteration(record));
            }
        }

        output.push_str(&Self::section_header("Plan"));
        if result.plan.is_empty() {
            output.push_str(&format!("{}\n", "(no plan generated)".dimmed()));
        } else {
            output.push_str(&Self::indent(&result.plan, "  "));
            output.push('\n');
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &PlanResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the plan only (for piping into another tool)
    pub fn format_plan_only(result: &PlanResult) -> String {
        result.plan.clone()
    }

    fn format_iteration(record: &IterationRecord) -> String {
        let vote = &record.vote_result;
        let mut output = format!(
            "\n{} {} {}\n",
            format!("── Iteration {} ──", record.iteration).yellow().bold(),
            Self::verdict_label(vote.majority_verdict),
            vote.vote_summary()
        );

        let confidence = format!("{:.0}%", vote.confidence * 100.0);
        output.push_str(&format!(
            "  confidence {} ({} of {} votes){}\n",
            if vote.is_low_confidence {
                confidence.yellow()
            } else {
                confidence.green()
            },
            vote.majority_count(),
            vote.total_votes,
            if vote.is_low_confidence {
                format!(" {}", "low confidence".yellow())
            } else {
                String::new()
            }
        ));

        output.push_str(&format!(
            "  correct {}  wrong {}  goal not reached {}\n",
            vote.breakdown.correct, vote.breakdown.wrong, vote.breakdown.goal_not_reached
        ));

        if record.failed_samples > 0 {
            output.push_str(&format!(
                "  {}\n",
                format!(
                    "{} of {} samples failed",
                    record.failed_samples,
                    record.requested_samples()
                )
                .red()
            ));
        }

        if let Some(reason) = vote.error_reason() {
            output.push_str(&format!(
                "  {} {}\n",
                "reason:".dimmed(),
                ellipsize(first_line(reason), REASON_WIDTH)
            ));
        }

        output
    }

    fn status_label(status: PlanStatus) -> ColoredString {
        let label = status.as_str().to_uppercase();
        match status {
            PlanStatus::Valid => label.green().bold(),
            PlanStatus::MaxIterations => label.yellow().bold(),
            PlanStatus::Failed => label.red().bold(),
            PlanStatus::Cancelled => label.dimmed(),
        }
    }

    fn verdict_label(verdict: Verdict) -> ColoredString {
        match verdict {
            Verdict::Correct => verdict.display_name().green(),
            Verdict::Wrong => verdict.display_name().red(),
            Verdict::GoalNotReached => verdict.display_name().yellow(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
