use crate::cli::commands::take_option;
use crate::cli::core::{CommandError, CommandResult};
use crate::cli::formatting;
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::core::services::SummaryService;
use crate::domain::{Expense, ExpenseDraft, StatsPeriod};

const ADD_USAGE: &str = "add <amount> <category> <description...> [--date YYYY-MM-DD]";
const EMPTY_LIST_MESSAGE: &str = "No expenses yet. Add some with `add`!";
const DELETE_PROMPT: &str = "Are you sure you want to delete this expense?";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("add", "Record a new expense", ADD_USAGE, cmd_add),
        CommandEntry::new(
            "list",
            "List expenses, optionally filtered",
            "list [week|month|year|all] [--category <name>]",
            cmd_list,
        ),
        CommandEntry::new(
            "delete",
            "Remove an expense by id or list position",
            "delete <id|#index> [--yes]",
            cmd_delete,
        ),
        CommandEntry::new(
            "reload",
            "Reload expenses from storage",
            "reload",
            cmd_reload,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let draft = if args.is_empty() {
        if !context.is_interactive() {
            return Err(CommandError::InvalidArguments(format!("usage: {}", ADD_USAGE)));
        }
        prompt_draft(context)?
    } else {
        draft_from_args(args)?
    };

    let data = draft.validate(context.expenses().clock().now())?;
    let expense = context.block_on(context.expenses().add(data))?;
    io::print_success(format!("Expense added successfully ({})", expense.id));
    Ok(())
}

fn draft_from_args(args: &[&str]) -> Result<ExpenseDraft, CommandError> {
    let (date, positional) = take_option(args, &["--date", "-d"])?;
    let amount = positional.first().copied().unwrap_or_default();
    let category = positional.get(1).copied().unwrap_or_default();
    let description = positional.iter().skip(2).copied().collect::<Vec<_>>().join(" ");

    let draft = ExpenseDraft::new(amount, description, category);
    Ok(match date {
        Some(date) => draft.with_date(date),
        None => draft,
    })
}

fn prompt_draft(context: &ShellContext) -> Result<ExpenseDraft, CommandError> {
    let amount = io::prompt_text(&context.theme, "Amount")?;
    let description = io::prompt_text(&context.theme, "Description")?;
    let category = if context.config.categories.is_empty() {
        io::prompt_text(&context.theme, "Category")?
    } else {
        let index = io::select_item(&context.theme, "Category", &context.config.categories)?;
        context.config.categories[index].clone()
    };
    let date = io::prompt_text(&context.theme, "Date (YYYY-MM-DD, blank for now)")?;

    Ok(ExpenseDraft::new(amount, description, category).with_date(date))
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (category, positional) = take_option(args, &["--category", "-c"])?;
    let period = match positional.first() {
        Some(raw) => raw
            .parse::<StatsPeriod>()
            .map_err(|err| CommandError::InvalidArguments(err.to_string()))?,
        None => StatsPeriod::All,
    };

    let state = context.expenses().snapshot();
    if state.is_empty() {
        io::print_info(EMPTY_LIST_MESSAGE);
        return Ok(());
    }

    let now = context.expenses().clock().now();
    // Positions refer to the full list so `delete #n` stays stable under filters.
    let rows: Vec<(usize, &Expense)> = state
        .expenses
        .iter()
        .enumerate()
        .filter(|(_, expense)| SummaryService::period_contains(period, expense.date, now))
        .filter(|(_, expense)| {
            category.map_or(true, |name| {
                expense.category.trim().eq_ignore_ascii_case(name.trim())
            })
        })
        .map(|(index, expense)| (index + 1, expense))
        .collect();

    output_section(format!("Expenses ({})", period));
    if rows.is_empty() {
        io::print_info("No expenses match the selected filters.");
        return Ok(());
    }
    for (position, expense) in &rows {
        io::print_info(formatting::expense_row(&context.config, *position, expense));
    }
    let total = SummaryService::total(rows.iter().map(|(_, expense)| *expense));
    io::print_info(format!(
        "Total: {} ({} expense(s))",
        context.format_amount(total),
        rows.len()
    ));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let skip_confirm = args
        .iter()
        .any(|arg| matches!(*arg, "--yes" | "-y"));
    let target = args
        .iter()
        .copied()
        .find(|arg| !matches!(*arg, "--yes" | "-y"))
        .ok_or_else(|| CommandError::InvalidArguments("usage: delete <id|#index> [--yes]".into()))?;

    let state = context.expenses().snapshot();
    let Some(expense) = resolve_target(&state.expenses, target)? else {
        io::print_warning(format!("No expense found for `{}`", target));
        return Ok(());
    };

    if !skip_confirm {
        io::print_info(formatting::expense_row(
            &context.config,
            position_of(&state.expenses, &expense.id),
            expense,
        ));
        if !context.confirm(DELETE_PROMPT)? {
            io::print_info("Deletion cancelled.");
            return Ok(());
        }
    }

    match context.block_on(context.expenses().delete(&expense.id))? {
        Some(_) => io::print_success("Expense deleted"),
        None => io::print_warning(format!("No expense found for `{}`", target)),
    }
    Ok(())
}

/// Accepts a raw id or a 1-based `#position` from `list`.
fn resolve_target<'a>(
    expenses: &'a [Expense],
    target: &str,
) -> Result<Option<&'a Expense>, CommandError> {
    if let Some(position) = target.strip_prefix('#') {
        let position: usize = position.parse().map_err(|_| {
            CommandError::InvalidArguments(format!("invalid list position `{}`", target))
        })?;
        return Ok(position
            .checked_sub(1)
            .and_then(|index| expenses.get(index)));
    }
    Ok(expenses.iter().find(|expense| expense.id == target))
}

fn position_of(expenses: &[Expense], id: &str) -> usize {
    expenses
        .iter()
        .position(|expense| expense.id == id)
        .map_or(0, |index| index + 1)
}

fn cmd_reload(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let count = context.block_on(context.expenses().load())?;
    io::print_success(format!("Reloaded {} expense(s)", count));
    Ok(())
}
