use crate::cli::core::{CommandError, CommandResult};
use crate::cli::help;
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::config::CONFIG_KEYS;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "categories",
            "Show suggested expense categories",
            "categories",
            cmd_categories,
        ),
        CommandEntry::new(
            "config",
            "View and change shell preferences",
            "config [show|set <key> <value>]",
            cmd_config,
        ),
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
        CommandEntry::new("quit", "Exit the shell", "quit", cmd_exit),
    ]
}

fn cmd_categories(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output_section("Categories");
    for category in &context.config.categories {
        io::print_info(format!("  {}", category));
    }
    Ok(())
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        output_section("Configuration");
        for (key, value) in context.config.entries() {
            io::print_info(format!("  {:<18} {}", key, value));
        }
        io::print_info(format!(
            "  Stored at {}",
            context.config_manager.config_path().display()
        ));
        return Ok(());
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    CONFIG_KEYS.join("|")
                )));
            }
            let key = args[1].to_ascii_lowercase();
            let value = args[2..].join(" ");

            let mut updated = context.config.clone();
            updated.set(&key, value.trim())?;
            context.config_manager.save(&updated)?;
            context.config = updated;
            context.apply_output_preferences();
            io::print_success(format!("Updated {} to {}", key, value.trim()));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{}` (expected show or set)",
            other
        ))),
    }
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(command) = args.first().map(|name| name.to_lowercase()) {
        if let Some(command) = context.command(&command) {
            help::print_command(command);
        } else {
            context.suggest_command(args[0]);
        }
        return Ok(());
    }

    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
