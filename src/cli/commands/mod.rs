pub mod expense;
pub mod report;
pub mod system;

use crate::cli::core::CommandError;
use crate::cli::registry::{CommandEntry, CommandRegistry};

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(expense::definitions());
    commands.extend(report::definitions());
    commands.extend(system::definitions());
    commands
}

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in all_definitions() {
        registry.register(entry);
    }
}

/// Splits `--flag value` / `--flag=value` pairs from positional arguments.
pub(crate) fn take_option<'a>(
    args: &[&'a str],
    names: &[&str],
) -> Result<(Option<&'a str>, Vec<&'a str>), CommandError> {
    let mut value = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.iter().copied();
    while let Some(arg) = iter.next() {
        if let Some((flag, inline)) = arg.split_once('=') {
            if names.contains(&flag) {
                value = Some(inline);
                continue;
            }
        }
        if names.contains(&arg) {
            let next = iter.next().ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "`{}` requires a value",
                    arg
                ))
            })?;
            value = Some(next);
            continue;
        }
        rest.push(arg);
    }
    Ok((value, rest))
}
