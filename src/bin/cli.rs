//! scopedkv CLI
//!
//! Command-line interface for inspecting and editing scoped storage.

use clap::{Parser, Subcommand, ValueEnum};
use scopedkv::{BackendKind, Config, Scope, StorageService, Target, WorkspaceIdentity};
use tracing_subscriber::{fmt, EnvFilter};

/// scopedkv CLI
#[derive(Parser, Debug)]
#[command(name = "scopedkv-cli")]
#[command(about = "CLI for scoped key-value state storage")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./scopedkv_data")]
    data_dir: String,

    /// Workspace identity whose partition is opened
    #[arg(short, long)]
    workspace: Option<String>,

    /// Use a throwaway in-memory backend instead of files
    #[arg(long)]
    in_memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,

        #[arg(short, long, value_enum, default_value_t = ScopeArg::Global)]
        scope: ScopeArg,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,

        #[arg(short, long, value_enum, default_value_t = ScopeArg::Global)]
        scope: ScopeArg,

        #[arg(short, long, value_enum, default_value_t = TargetArg::Machine)]
        target: TargetArg,
    },

    /// Remove a key
    Remove {
        /// The key to remove
        key: String,

        #[arg(short, long, value_enum, default_value_t = ScopeArg::Global)]
        scope: ScopeArg,
    },

    /// List keys recorded with a target
    Keys {
        #[arg(short, long, value_enum, default_value_t = ScopeArg::Global)]
        scope: ScopeArg,

        #[arg(short, long, value_enum, default_value_t = TargetArg::Machine)]
        target: TargetArg,
    },

    /// Print both partitions
    Dump,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ScopeArg {
    Global,
    Workspace,
}

impl From<ScopeArg> for Scope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Global => Scope::Global,
            ScopeArg::Workspace => Scope::Workspace,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TargetArg {
    User,
    Machine,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::User => Target::User,
            TargetArg::Machine => Target::Machine,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,scopedkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = Config::builder().data_dir(&args.data_dir).backend(if args.in_memory {
        BackendKind::InMemory
    } else {
        BackendKind::File
    });
    if let Some(id) = &args.workspace {
        builder = builder.workspace(WorkspaceIdentity::new(id.as_str()));
    }

    let service = match StorageService::open(builder.build()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to open storage: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&service, args.command) {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = service.close() {
        tracing::error!("Failed to flush storage: {}", e);
        std::process::exit(1);
    }
}

fn run(service: &StorageService, command: Commands) -> scopedkv::Result<()> {
    match command {
        Commands::Get { key, scope } => match service.get(&key, scope.into()) {
            Some(value) => println!("{}", value),
            None => println!("(not found)"),
        },
        Commands::Set { key, value, scope, target } => {
            service.store2(&key, value, scope.into(), target.into())?;
        }
        Commands::Remove { key, scope } => {
            service.remove(&key, scope.into())?;
        }
        Commands::Keys { scope, target } => {
            for key in service.keys(scope.into(), target.into()) {
                println!("{}", key);
            }
        }
        Commands::Dump => {
            print!("{}", service.log_storage());
        }
    }
    Ok(())
}
