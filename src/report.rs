//! Human-readable summary of an [`Execution`] for the terminal.

use crate::consts::{REPORT_OUTPUT_CHARS, preview};
use crate::orchestrator::Execution;

pub fn render_report(execution: &Execution) -> String {
    let plan = execution
        .execution_plan
        .iter()
        .map(|u| u.as_str())
        .collect::<Vec<_>>()
        .join(" -> ");

    let mut out = format!(
        "\n=== Execution Results ===\n\
         Request: {}\n\
         Execution plan: {}\n\
         Execution time: {:.2} seconds\n\
         Parallel execution: {}\n",
        execution.request,
        plan,
        execution.execution_time,
        if execution.parallel { "Yes" } else { "No" },
    );

    if let Some(n) = execution.parameters.sentences {
        out.push_str(&format!("\nParameters:\n  sentences: {}\n", n));
    }

    out.push_str("\nUnit Results:\n");
    for step in &execution.results {
        let mark = if step.is_success() { "✓" } else { "✗" };
        out.push_str(&format!("{} {}\n", mark, step.unit));
    }

    out.push_str("\nOutput:\n");
    out.push_str(&preview(&execution.output, REPORT_OUTPUT_CHARS));
    out.push('\n');
    out
}

pub fn print_report(execution: &Execution) {
    print!("{}", render_report(execution));
}
