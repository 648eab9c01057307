//! SplitMacha CLI - split expenses from your terminal

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{auth, expenses, friends, groups, logs, mock, settlements, status, users};
use expenses::ExpenseCommands;
use groups::GroupCommands;
use settlements::SettlementCommands;

/// SplitMacha - split expenses from your terminal
#[derive(Parser)]
#[command(name = "sm", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        /// Email address (prompted when omitted)
        email: Option<String>,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new account and sign in
    Register {
        /// Display name
        name: String,
        /// Email address (prompted when omitted)
        email: Option<String>,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Phone number
        #[arg(long)]
        phone: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign out and clear the stored session
    Logout,

    /// Show the logged-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show backend health and session state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List or search users
    Users {
        /// Search by name or email instead of listing everyone
        #[arg(long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage groups
    Groups {
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Manage expenses
    Expenses {
        #[command(subcommand)]
        command: ExpenseCommands,
    },

    /// List friends and balances
    Friends {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage settlements
    Settlements {
        #[command(subcommand)]
        command: SettlementCommands,
    },

    /// Toggle the local mock backend
    Mock {
        #[command(subcommand)]
        command: MockCommands,
    },

    /// Show recent log events
    Logs {
        /// Number of entries to show
        #[arg(long, default_value_t = 50)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MockCommands {
    /// Enable mock mode (all commands run against a local seeded backend)
    On {
        /// Simulated latency in milliseconds
        #[arg(long)]
        latency_ms: Option<u64>,
    },
    /// Disable mock mode
    Off,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login {
            email,
            password,
            json,
        } => auth::login(email, password, json).await,
        Commands::Register {
            name,
            email,
            password,
            phone,
            json,
        } => auth::register(name, email, password, phone, json).await,
        Commands::Logout => auth::logout().await,
        Commands::Whoami { json } => auth::whoami(json).await,
        Commands::Status { json } => status::run(json).await,
        Commands::Users { search, json } => match search {
            Some(query) => users::search(query, json).await,
            None => users::list(json).await,
        },
        Commands::Groups { command } => groups::run(command).await,
        Commands::Expenses { command } => expenses::run(command).await,
        Commands::Friends { json } => friends::list(json).await,
        Commands::Settlements { command } => settlements::run(command).await,
        Commands::Mock { command } => match command {
            MockCommands::On { latency_ms } => mock::enable(latency_ms),
            MockCommands::Off => mock::disable(),
        },
        Commands::Logs { limit, json } => logs::run(limit, json),
    }
}
