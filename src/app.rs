use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use crate::core::{
    actions::{facility::Facilities, native},
    config::{ConfigManager, Settings},
    event::Event,
    hook_install,
    notifier::{Notifier, NotifierConfig},
};

#[derive(Parser)]
#[command(name = "hook-notifier")]
#[command(version, about = "Play a sound and show a desktop notification when a tool finishes")]
struct Cli {
    /// Settings file (default: per-user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log suppressed failures to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Drain stdin and fire the configured actions (the default)
    Notify,
    /// Write the default settings file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the settings file location and the effective settings
    ShowConfig,
    /// Register this binary as a command hook in the tool's settings.json
    InstallHook {
        /// Settings file to edit (default: ~/.claude/settings.json)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Hook event to register under
        #[arg(long, default_value = hook_install::DEFAULT_EVENT)]
        event: String,
        /// Command to run (default: this executable)
        #[arg(long)]
        command: Option<String>,
    },
    /// Internal: play one file in process (native sound backend)
    #[command(name = native::PLAY_SOUND_SUBCOMMAND, hide = true)]
    PlaySound { path: PathBuf },
}

/// Subcommands a person types by hand. A bad argument to one of these is
/// reported; anything else is treated as a hook invocation.
const ADMIN_COMMANDS: &[&str] = &[
    "init-config",
    "show-config",
    "install-hook",
    native::PLAY_SOUND_SUBCOMMAND,
];

pub fn run() {
    let args: Vec<OsString> = std::env::args_os().collect();
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
            _ if names_admin_command(&args) => e.exit(),
            _ => {
                // The calling tool may append arguments of its own; the hook
                // still has to fire and exit 0.
                init_logging(0);
                log::debug!("ignoring unrecognized arguments: {e}");
                notify(config_from_raw_args(&args));
                return;
            }
        },
    };
    init_logging(cli.verbose);

    match cli.command.unwrap_or(Commands::Notify) {
        Commands::Notify => notify(cli.config),
        Commands::InitConfig { force } => cmd_init_config(cli.config, force),
        Commands::ShowConfig => cmd_show_config(cli.config),
        Commands::InstallHook {
            settings,
            event,
            command,
        } => cmd_install_hook(settings, &event, command),
        Commands::PlaySound { path } => {
            if let Err(e) = native::play_blocking(&path) {
                log::debug!("playback of {} failed: {e}", path.display());
            }
        }
    }
}

fn names_admin_command(args: &[OsString]) -> bool {
    args.iter()
        .skip(1)
        .any(|arg| ADMIN_COMMANDS.iter().any(|name| arg == *name))
}

/// Recover `--config <file>` / `--config=<file>` from arguments clap rejected.
fn config_from_raw_args(args: &[OsString]) -> Option<PathBuf> {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            return iter.next().map(PathBuf::from);
        }
        if let Some(value) = arg.to_str().and_then(|a| a.strip_prefix("--config=")) {
            return Some(PathBuf::from(value));
        }
    }
    None
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.as_str()),
    )
    .format_timestamp(None)
    .try_init();
}

/// The hook itself. Exits 0 whatever happens to the actions.
fn notify(config: Option<PathBuf>) {
    // Facility panics are contained per action; keep their reports off stderr.
    std::panic::set_hook(Box::new(|info| log::debug!("action panicked: {info}")));

    let settings = match config_manager(config) {
        Ok(manager) => manager.load(),
        Err(e) => {
            log::warn!("{e}, using default settings");
            Settings::default()
        }
    };

    let event = Event::from_stdin();

    // Only the blocking pool does any work, so no async worker threads.
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .thread_name("hook-notifier")
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::debug!("could not start runtime, no actions fired: {e}");
            return;
        }
    };

    let notifier = Notifier::new(
        NotifierConfig::from(&settings),
        Facilities::for_backends(settings.sound_backend, settings.notification_backend),
        runtime.handle().clone(),
    );
    let fired = notifier.trigger(event);
    log::debug!("fired {fired} action(s)");

    // Bounded: only waits for launches still in progress, never for playback.
    runtime.shutdown_timeout(settings.launch_grace());
}

// ---------------------------------------------------------------------------
// Admin commands
// ---------------------------------------------------------------------------

fn config_manager(config: Option<PathBuf>) -> crate::core::error::Result<ConfigManager> {
    match config {
        Some(path) => Ok(ConfigManager::at(path)),
        None => ConfigManager::default_location(),
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    process::exit(1);
}

fn cmd_init_config(config: Option<PathBuf>, force: bool) {
    let manager = config_manager(config).unwrap_or_else(|e| fail(e));
    if manager.path().exists() && !force {
        fail(format!(
            "{} already exists (use --force to overwrite)",
            manager.path().display()
        ));
    }
    manager
        .save(&Settings::default())
        .unwrap_or_else(|e| fail(e));
    println!("Wrote {}", manager.path().display());
}

fn cmd_show_config(config: Option<PathBuf>) {
    let manager = config_manager(config).unwrap_or_else(|e| fail(e));
    let settings = manager.load_strict().unwrap_or_else(|e| fail(e));
    let pretty = serde_json::to_string_pretty(&settings).unwrap_or_else(|e| fail(e));
    println!("# {}", manager.path().display());
    println!("{pretty}");
}

fn cmd_install_hook(settings: Option<PathBuf>, event: &str, command: Option<String>) {
    let settings_path = settings
        .map(Ok)
        .unwrap_or_else(hook_install::default_settings_path)
        .unwrap_or_else(|e| fail(e));
    let command = command.unwrap_or_else(|| {
        std::env::current_exe()
            .map(|exe| exe.to_string_lossy().into_owned())
            .unwrap_or_else(|e| fail(format!("cannot locate own executable: {e}")))
    });

    match hook_install::install_hook(&settings_path, event, &command) {
        Ok(true) => println!("Registered {event} hook in {}", settings_path.display()),
        Ok(false) => println!("{event} hook already present in {}", settings_path.display()),
        Err(e) => fail(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_notify() {
        let cli = Cli::try_parse_from(["hook-notifier"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["hook-notifier", "notify", "-vv", "--config", "/tmp/s.json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Notify)));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.json")));
    }

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_config_recovered_from_rejected_args() {
        let args = os_args(&["hook-notifier", "--session", "x", "--config", "/tmp/s.json", "Stop"]);
        assert!(Cli::try_parse_from(&args).is_err());
        assert_eq!(config_from_raw_args(&args), Some(PathBuf::from("/tmp/s.json")));

        let args = os_args(&["hook-notifier", "Stop", "--config=/tmp/t.json"]);
        assert_eq!(config_from_raw_args(&args), Some(PathBuf::from("/tmp/t.json")));

        assert_eq!(config_from_raw_args(&os_args(&["hook-notifier", "Stop"])), None);
    }

    #[test]
    fn test_admin_commands_detected() {
        assert!(names_admin_command(&os_args(&["hook-notifier", "install-hook", "--bogus"])));
        assert!(!names_admin_command(&os_args(&["hook-notifier", "--session", "x"])));
        // The program name itself never counts.
        assert!(!names_admin_command(&os_args(&["show-config"])));
    }

    #[test]
    fn test_hidden_play_sound() {
        let cli = Cli::try_parse_from(["hook-notifier", "play-sound", "/tmp/a.ogg"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::PlaySound { path }) if path == PathBuf::from("/tmp/a.ogg")));
    }
}
