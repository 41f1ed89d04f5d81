//! # tasksync
//!
//! A terminal task tracker backed by a live-updating document store. Every
//! change, whether made here or by another client of the same store, is
//! pushed to the task list as a fresh snapshot.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! tasksync
//! # or explicitly
//! tasksync ui
//! ```
//!
//! #### TUI Key Bindings
//!
//! **List**
//! *   `q`: Quit
//! *   `j`/`k`: Move selection
//! *   `Space`: Toggle completion
//! *   `e`/`Enter`: Edit selected task in the form
//! *   `d`: Delete selected task (asks for confirmation)
//! *   `a`/`Tab`: Focus the form to add a task
//!
//! **Form**
//! *   `Tab`/`Shift-Tab`: Next/previous field
//! *   `Enter`: Save
//! *   `Esc`: Cancel and return to create mode
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! tasksync add "Buy milk" -d "2%" --due "2026-10-20 18:00"
//! tasksync list --all
//! tasksync done <ID>
//! tasksync edit <ID> --title "Buy oat milk" --clear-due
//! tasksync remove <ID>
//! ```
//!
//! ## Identity
//!
//! On first start an anonymous identity is created and remembered. Pass
//! `--token` (or set `TASKSYNC_TOKEN`) to sign in with a custom token instead;
//! `tasksync token <uid>` mints one for the configured secret.
//!
//! ## Data Storage
//!
//! Tasks live under the data directory (`~/.local/share/tasksync` on Linux),
//! in collections named `artifacts/{appId}/users/{uid}/todos`. Override with
//! `--data-dir` or `TASKSYNC_DATA_DIR`.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

use tasksync::backend::Backend;
use tasksync::commands::*;
use tasksync::config::Config;
use tasksync::logging::{self, LogTarget};
use tasksync::tui::run_tui;
use tracing::warn;

#[derive(Parser)]
#[command(name = "tasksync", version)]
#[command(about = "Terminal task tracker with live-updating storage", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Custom token to sign in with when no identity is stored
    #[arg(long, global = true)]
    token: Option<String>,
    /// Application id used in collection paths
    #[arg(long, global = true)]
    app_id: Option<String>,
    /// Directory for the store, auth state and logs
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
        /// Deadline: YYYY-MM-DD, "YYYY-MM-DD HH:MM" or RFC 3339
        #[arg(long)]
        due: Option<String>,
    },
    /// List tasks, newest first
    List {
        /// Show completed tasks
        #[arg(short, long)]
        all: bool,
    },
    /// Mark a task as complete
    Done {
        /// Task id or unique id prefix
        id: String,
        /// Mark the task as open again
        #[arg(long)]
        undo: bool,
    },
    /// Edit a task
    Edit {
        /// Task id or unique id prefix
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New deadline
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the deadline
        #[arg(long)]
        clear_due: bool,
    },
    /// Remove a task
    Remove {
        /// Task id or unique id prefix
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Show the signed-in identity
    Whoami,
    /// Mint a custom sign-in token
    Token {
        /// User id the token signs in as
        uid: String,
        /// Validity in hours
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(token) = cli.token {
        config.custom_token = Some(token);
    }
    if let Some(app_id) = cli.app_id {
        config.app_id = app_id;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let command = cli.command.unwrap_or(Commands::Ui);
    let target = match command {
        Commands::Ui => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    let _guard = logging::init(&config, target)?;
    if config.uses_development_secret() {
        warn!("Custom tokens are verified with the built-in development secret");
    }

    match command {
        Commands::Token { uid, hours } => return cmd_token(&config, uid, hours),
        Commands::Completions { shell } => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => anyhow::bail!("Unsupported shell: {}", shell),
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "tasksync", &mut io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let backend = Backend::open_local(&config)?;
    let ctx = Context { backend, config };
    match command {
        Commands::Add { title, description, due } => cmd_add(&ctx, title, description, due).await,
        Commands::List { all } => cmd_list(&ctx, all).await,
        Commands::Done { id, undo } => cmd_done(&ctx, id, undo).await,
        Commands::Edit { id, title, description, due, clear_due } => {
            cmd_edit(&ctx, id, title, description, due, clear_due).await
        }
        Commands::Remove { id, force } => cmd_remove(&ctx, id, force).await,
        Commands::Whoami => cmd_whoami(&ctx).await,
        Commands::Ui => run_tui(ctx.backend, &ctx.config).await,
        Commands::Token { .. } | Commands::Completions { .. } => Ok(()),
    }
}
