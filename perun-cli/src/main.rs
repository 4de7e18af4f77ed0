use std::sync::Arc;

use clap::{Parser, Subcommand};
use fs::directory_manager::DirectoryManagerFs;
use fs::file::LocalFile;
use perun_core::coordinator::Coordinator;
use perun_core::engine::BollardEngine;
use perun_core::persistence::WorkspaceStore;
use thiserror::Error;
use tracing::{debug, error};

mod commands;

/// Command-line control plane for local development environments.
#[derive(Debug, Parser)]
#[command(name = "perun", author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging (equivalent to `H_DEBUG=TRUE`).
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an empty workspace.
    Init {
        #[arg(long)]
        workspace: String,
    },

    /// Import a local environment document, optionally append a DB seed
    /// service, and activate unless `--dry-run` is passed.
    Apply {
        #[arg(long)]
        workspace: String,
        #[arg(long = "env-name")]
        env_name: String,
        #[arg(long = "env-path")]
        env_path: String,
        #[arg(long = "dry-run")]
        dry_run: bool,
        #[arg(long = "db-type")]
        db_type: Option<String>,
        #[arg(long = "db-url")]
        db_url: Option<String>,
    },

    /// Destroy a workspace, or a single environment within it.
    Destroy {
        #[arg(long)]
        workspace: String,
        #[arg(long = "env-name")]
        env_name: Option<String>,
    },

    /// List every known workspace.
    List,

    /// Bring up an already-imported environment.
    Activate {
        #[arg(long)]
        workspace: String,
        #[arg(long = "env-name")]
        env_name: String,
    },

    /// Tear down an environment without removing it from the manifest.
    Deactivate {
        #[arg(long)]
        workspace: String,
        #[arg(long = "env-name")]
        env_name: String,
    },

    /// Alias for `activate`, matching the original tool's vocabulary.
    Synchronize {
        #[arg(long)]
        workspace: String,
        #[arg(long = "env-name")]
        env_name: String,
    },

    /// Import an environment from a local document or a live cluster.
    Import {
        #[arg(long)]
        workspace: String,
        #[arg(long = "type")]
        import_type: ImportType,
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        cluster: Option<String>,
        /// Kubernetes namespace to import from; defaults to `--cluster` when omitted.
        #[arg(long)]
        namespace: Option<String>,
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        ca: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,
        #[arg(long = "db-type")]
        db_type: Option<String>,
        #[arg(long = "db-url")]
        db_url: Option<String>,
    },

    /// Describe the debug-launch contract for an IDE's external generator.
    Generate {
        #[arg(long)]
        workspace: String,
        #[arg(long = "env-name")]
        env_name: String,
        #[arg(long = "service-name")]
        service_name: String,
        #[arg(long)]
        ide: String,
        #[arg(long = "source-location")]
        source_location: String,
        #[arg(long = "source-type")]
        source_type: String,
        #[arg(long)]
        command: String,
        /// Which target the debug container's original replica runs under;
        /// must match the environment's own target so the Reactor's
        /// `perun-env-target` check (spec §3) matches.
        #[arg(long = "env-target", default_value = "docker")]
        env_target: String,
    },

    /// Stream logs for a single container.
    Logs {
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum ImportType {
    Local,
    K8s,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Coordinator(#[from] perun_core::coordinator::CoordinatorError),

    #[error(transparent)]
    Engine(#[from] perun_core::engine::EngineError),

    #[error(transparent)]
    Manifest(#[from] perun_core::persistence::ManifestError),

    #[error("{0}")]
    Usage(String),
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    // `PerunLog=verbose` forces trace-level logging to stdout, strictly more
    // verbose than `H_DEBUG=TRUE`/`-v`'s debug level (spec §1/§6).
    let filter = if std::env::var("PerunLog").as_deref() == Ok("verbose") {
        "trace"
    } else if cli.verbose || std::env::var("H_DEBUG").as_deref() == Ok("TRUE") {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(command = ?cli.command, "parsed command");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("tokio runtime should build");

    let result = runtime.block_on(run(cli.command));
    if let Err(err) = &result {
        error!(error = %err, "command failed");
    }
    result
}

async fn run(command: Command) -> Result<(), CliError> {
    let store = WorkspaceStore::new().map_err(CliError::Manifest)?;
    let engine = Arc::new(BollardEngine::connect()?);
    let coordinator = Coordinator::new(store, engine, DirectoryManagerFs, LocalFile);

    match command {
        Command::Init { workspace } => commands::init(&coordinator, &workspace),
        Command::Apply {
            workspace,
            env_name,
            env_path,
            dry_run,
            db_type,
            db_url,
        } => {
            commands::apply(
                &coordinator,
                &workspace,
                &env_name,
                &env_path,
                dry_run,
                db_type.zip(db_url),
            )
            .await
        }
        Command::Destroy { workspace, env_name } => {
            commands::destroy(&coordinator, &workspace, env_name.as_deref()).await
        }
        Command::List => commands::list(&coordinator),
        Command::Activate { workspace, env_name } | Command::Synchronize { workspace, env_name } => {
            commands::activate(&coordinator, &workspace, &env_name).await
        }
        Command::Deactivate { workspace, env_name } => {
            commands::deactivate(&coordinator, &workspace, &env_name).await
        }
        Command::Import {
            workspace,
            import_type,
            path,
            cluster,
            namespace,
            server,
            token,
            ca,
            name,
            exclude,
            db_type,
            db_url,
        } => {
            commands::import(
                &coordinator,
                &workspace,
                import_type,
                path,
                cluster,
                namespace,
                server,
                token,
                ca,
                name,
                exclude,
                db_type.zip(db_url),
            )
            .await
        }
        Command::Generate {
            workspace,
            env_name,
            service_name,
            ide,
            source_location,
            source_type,
            command,
            env_target,
        } => commands::generate(
            &workspace,
            &env_name,
            &service_name,
            &ide,
            &source_location,
            &source_type,
            &command,
            &env_target,
        ),
        Command::Logs { id } => commands::logs(&id).await,
    }
}
