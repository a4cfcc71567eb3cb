//! Command dispatch: turns parsed arguments into service calls.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::build_and_serve;
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{
    global_config_dir, global_config_path, Settings, CONFIG_FILE_NAME, CONFIG_TEMPLATE,
};
use crate::domain::{TemplateEntry, TemplateSet, WriteOutcome};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{AssumeYes, ConfirmationPrompt, TerminalPrompt};
use crate::infrastructure::InfraError;
use crate::util::path::{display_relative, resolve_root};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Commands::Completion { shell } = &cli.command {
        _completion(*shell);
        return Ok(());
    }

    let settings = Settings::load()?;
    let container = ServiceContainer::new(settings);
    let cwd = std::env::current_dir()
        .map_err(|e| InfraError::io("read current directory", e))?;

    dispatch(&cli.command, &container, &cwd)
}

/// Run one command against `container`, resolving paths against `cwd`.
pub fn dispatch(command: &Commands, container: &ServiceContainer, cwd: &Path) -> CliResult<()> {
    match command {
        Commands::Init { dir, yes } => _init(container, cwd, dir.as_deref(), *yes),
        Commands::Serve { dir, port } => _serve(container, cwd, dir.as_deref(), *port),
        Commands::Config { command } => match command {
            ConfigCommands::Show => _config_show(container),
            ConfigCommands::Path => _config_path(),
            ConfigCommands::Init { yes } => _config_init(container, *yes),
        },
        Commands::Completion { shell } => {
            _completion(*shell);
            Ok(())
        }
    }
}

fn project_root(container: &ServiceContainer, cwd: &Path, dir: Option<&Path>) -> PathBuf {
    let dir = dir.unwrap_or(container.settings.dir.as_path());
    resolve_root(dir, cwd)
}

fn prompt_for(yes: bool) -> Arc<dyn ConfirmationPrompt> {
    if yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(TerminalPrompt)
    }
}

#[instrument(skip(container))]
fn _init(container: &ServiceContainer, cwd: &Path, dir: Option<&Path>, yes: bool) -> CliResult<()> {
    let root = project_root(container, cwd, dir);
    debug!("root: {}", root.display());

    let report = container
        .init_service(TemplateSet::emaki(), prompt_for(yes))
        .with_display_base(cwd)
        .initialize_with(&root, output::entry_status)?;

    if report.count(WriteOutcome::Skipped) == report.entries.len() {
        output::info(&format!(
            "{} is up to date",
            display_relative(&root, cwd).display()
        ));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _serve(
    container: &ServiceContainer,
    cwd: &Path,
    dir: Option<&Path>,
    port: Option<u16>,
) -> CliResult<()> {
    let root = project_root(container, cwd, dir);
    let shown = display_relative(&root, cwd);
    if !root.is_dir() {
        return Err(CliError::Usage(format!(
            "{} does not exist, run `elm-emaki init` first",
            shown.display()
        )));
    }
    let port = port.unwrap_or(container.settings.port);
    debug!("root: {}, port: {}", root.display(), port);

    output::action("build", &shown.display());
    let handle = build_and_serve(
        &container.build_service(),
        &container.serve_service(),
        &root,
        port,
    )?;
    output::action("serve", &format!("{} at http://localhost:{}", shown.display(), port));

    let command = handle.command().to_string();
    let canceller = handle.canceller();
    if let Err(e) = ctrlc::set_handler(move || canceller.cancel()) {
        handle.cancel();
        handle.wait()?;
        return Err(InfraError::Signal {
            message: e.to_string(),
        }
        .into());
    }

    let exit = handle.wait()?;
    if !exit.is_clean() {
        return Err(ApplicationError::CommandFailed {
            command,
            exit_code: exit.status.code(),
            stderr: String::new(),
        }
        .into());
    }
    debug!("server stopped (cancelled: {})", exit.cancelled);
    Ok(())
}

#[instrument(skip(container))]
fn _config_show(container: &ServiceContainer) -> CliResult<()> {
    output::info(&container.settings.to_toml()?);
    Ok(())
}

#[instrument]
fn _config_path() -> CliResult<()> {
    let path = global_config_path()
        .ok_or_else(|| CliError::Usage("no config directory for this platform".into()))?;
    output::info(&path.display());
    if !path.exists() {
        output::warning("file does not exist, create it with `elm-emaki config init`");
    }
    Ok(())
}

#[instrument(skip(container))]
fn _config_init(container: &ServiceContainer, yes: bool) -> CliResult<()> {
    let dir = global_config_dir()
        .ok_or_else(|| CliError::Usage("no config directory for this platform".into()))?;
    let templates = TemplateSet::new([TemplateEntry::new(CONFIG_FILE_NAME, CONFIG_TEMPLATE)])
        .map_err(ApplicationError::from)?;

    container
        .init_service(templates, prompt_for(yes))
        .initialize_with(&dir, output::entry_status)?;
    Ok(())
}

fn _completion(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    eprintln!("Generating completion file for {shell:?}...");
    clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
}
