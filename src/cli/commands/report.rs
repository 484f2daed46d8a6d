use crate::cli::core::{CommandError, CommandResult};
use crate::cli::formatting;
use crate::cli::io;
use crate::cli::output::{section as output_section, separator};
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::core::services::SummaryService;
use crate::domain::StatsPeriod;

const NO_DATA_MESSAGE: &str = "No expense data available for the selected period";
const NO_EXPENSES_MESSAGE: &str = "No expenses yet. Add your first expense!";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "stats",
            "Show totals and a category breakdown",
            "stats [week|month|year|all]",
            cmd_stats,
        ),
        CommandEntry::new(
            "home",
            "Show the overall total and recent expenses",
            "home",
            cmd_home,
        ),
    ]
}

fn cmd_stats(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let period = match args.first() {
        Some(raw) => raw
            .parse::<StatsPeriod>()
            .map_err(|err| CommandError::InvalidArguments(err.to_string()))?,
        None => context.config.default_period,
    };

    let state = context.expenses().snapshot();
    let now = context.expenses().clock().now();
    let summary = SummaryService::summarize(&state.expenses, period, now);

    output_section(format!("Total Expenses ({})", period));
    if summary.is_empty() {
        io::print_info(NO_DATA_MESSAGE);
        return Ok(());
    }

    io::print_info(format!(
        "  {} across {} expense(s)",
        context.format_amount(summary.total),
        summary.count
    ));
    separator();
    for row in &summary.categories {
        io::print_info(format!(
            "  {:<14} {:>12}  {:>3}x  {:>6}",
            row.category,
            context.format_amount(row.total),
            row.count,
            formatting::share_percent(row.share),
        ));
    }
    Ok(())
}

fn cmd_home(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let state = context.expenses().snapshot();

    output_section("Total Expenses");
    io::print_info(format!(
        "  {}",
        context.format_amount(SummaryService::total(&state.expenses))
    ));

    output_section("Recent Expenses");
    if state.is_empty() {
        io::print_info(NO_EXPENSES_MESSAGE);
        return Ok(());
    }
    for expense in SummaryService::recent(&state.expenses, context.config.recent_limit) {
        let position = state
            .expenses
            .iter()
            .position(|candidate| candidate.id == expense.id)
            .map_or(0, |index| index + 1);
        io::print_info(formatting::expense_row(&context.config, position, expense));
    }
    Ok(())
}
