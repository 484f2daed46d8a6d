use std::{future::Future, io::ErrorKind, sync::Arc};

use dialoguer::theme::ColorfulTheme;
use tokio::runtime::{Builder, Runtime};

use crate::{
    cli::{
        commands,
        core::{CliError, CommandError, LoopControl},
        io as cli_io,
        output::{self, OutputPreferences},
        registry::{CommandEntry, CommandRegistry},
    },
    config::{Config, ConfigManager},
    core::{ExpenseHandle, ExpenseManager, SystemClock},
    storage::JsonFileStore,
    utils::paths,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// State shared by every command of one shell session.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub running: bool,
    expenses: ExpenseHandle,
    runtime: Runtime,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base = paths::app_data_dir();
        let config_manager = ConfigManager::with_base_dir(&base)?;
        let config = config_manager.load()?;
        let store = JsonFileStore::new(paths::store_dir_in(&base))?;
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let expenses = ExpenseManager::new(Arc::new(store), Arc::new(SystemClock)).into_handle();

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let context = Self {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            running: true,
            expenses,
            runtime,
        };
        context.apply_output_preferences();
        context.activate();
        Ok(context)
    }

    fn activate(&self) {
        let state = self.block_on(self.expenses.activate());
        if let Some(message) = state.error {
            cli_io::print_error(message);
        } else if self.mode == CliMode::Interactive {
            cli_io::print_info(format!(
                "Loaded {} expense(s). Type `help` to see available commands.",
                state.expenses.len()
            ));
        }
    }

    pub fn expenses(&self) -> &ExpenseHandle {
        &self.expenses
    }

    /// Drives a manager future to completion on the session runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn is_interactive(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    pub fn apply_output_preferences(&self) {
        output::set_preferences(OutputPreferences {
            color_enabled: self.config.ui_color_enabled && self.is_interactive(),
            quiet_mode: !self.is_interactive(),
        });
    }

    pub fn prompt(&self) -> String {
        format!("expenses ({})> ", self.expenses.snapshot().expenses.len())
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub fn format_amount(&self, amount: f64) -> String {
        self.config.format_amount(amount)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = self.registry.suggest(&input.to_ascii_lowercase(), 3) {
            cli_io::print_info(format!("Suggestion: `{}`?", best));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).map_err(|err| match err {
            CommandError::Dialoguer(err) => CliError::Dialoguer(err),
            CommandError::Io(err) => CliError::Io(err),
            other => CliError::Io(std::io::Error::new(ErrorKind::Other, other.to_string())),
        })
    }

    /// Asks for confirmation in interactive mode; scripts always proceed.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_info("Use `help <command>` for usage details.");
            }
            other => cli_io::print_error(other),
        }
    }
}
