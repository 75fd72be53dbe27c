use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use core_logic::{ClientConfig, ConfigManager, RunSummary, setup_logger};
use dialoguer::{MultiSelect, Password};
use dotenv::dotenv;
use sky_cr::runs::{self, RunHandle};
use sky_cr::{
    Credential, DataPaths, LogObserver, SessionClient, Target, TargetRegistry, UserRegistry,
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

const SESSION_ENV: &str = "SKY_SESSION";

#[derive(Parser, Debug)]
#[command(author, version, about = "Candle run, world quest and gift automation", long_about = None)]
struct Args {
    /// Directory holding users.json, targets.json, config.json and the work lists
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage saved accounts
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage gift targets
    Targets {
        #[command(subcommand)]
        action: TargetAction,
    },
    /// Show or edit client settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Claim every pickup batch in pickup_data.json
    Pickup(RunArgs),
    /// World-quest preflight, then quest and collectible claims
    Quests(RunArgs),
    /// Send light and heart to targets
    Gifts {
        #[command(flatten)]
        run: RunArgs,

        /// Target user id (repeatable). Prompts for a selection when omitted.
        #[arg(long = "target")]
        targets: Vec<String>,
    },
}

#[derive(ClapArgs, Debug)]
struct RunArgs {
    /// Saved user nickname or list index
    #[arg(short, long)]
    user: String,

    /// Session ID (falls back to $SKY_SESSION, then a prompt)
    #[arg(short, long)]
    session: Option<String>,
}

#[derive(Subcommand, Debug)]
enum UserAction {
    List,
    Add { nickname: String, user_id: String },
    Remove { user: String },
}

#[derive(Subcommand, Debug)]
enum TargetAction {
    List,
    Add { name: String, user_id: String },
    Remove {
        #[arg(required = true)]
        user_ids: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    Show,
    Set {
        #[arg(long)]
        user_agent: Option<String>,
        #[arg(long)]
        max_workers: Option<usize>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        #[arg(long)]
        retries: Option<u32>,
        #[arg(long)]
        base_url: Option<String>,
    },
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let _guard = setup_logger("sky-cr");
    let args = Args::parse();
    let paths = DataPaths::new(&args.data_dir);

    match args.command {
        Command::Users { action } => users(&paths, action),
        Command::Targets { action } => targets(&paths, action),
        Command::Settings { action } => settings(&paths, action),
        Command::Pickup(run) => {
            let (client, config) = open_session(&paths, &run)?;
            let source = paths.pickup();
            let max_workers = config.max_workers;
            let handle = runs::spawn_run(move |token| async move {
                runs::run_pickup(client, &source, max_workers, token, Arc::new(LogObserver)).await
            });
            finish(handle).await
        }
        Command::Quests(run) => {
            let quests = sky_cr::source::read_name_list(&paths.quest_names());
            let collectibles = sky_cr::source::read_name_list(&paths.collectibles());
            let (client, _config) = open_session(&paths, &run)?;
            let handle = runs::spawn_run(move |token| async move {
                runs::run_quests(client, &quests, &collectibles, token, Arc::new(LogObserver)).await
            });
            finish(handle).await
        }
        Command::Gifts { run, targets } => {
            let selected = select_targets(&paths, &targets)?;
            let (client, _config) = open_session(&paths, &run)?;
            let handle = runs::spawn_run(move |token| async move {
                runs::run_gifts(client, &selected, token, Arc::new(LogObserver)).await
            });
            finish(handle).await
        }
    }
}

fn open_session(paths: &DataPaths, run: &RunArgs) -> Result<(Arc<SessionClient>, ClientConfig)> {
    let registry = UserRegistry::load(paths.users());
    let user = registry.find(&run.user)?;
    info!(target: "task_result", "Selected: {}", user.nickname);

    let session = match &run.session {
        Some(s) => s.clone(),
        None => match env::var(SESSION_ENV) {
            Ok(s) if !s.trim().is_empty() => s,
            _ => Password::new()
                .with_prompt("Session ID")
                .interact()
                .context("Failed to read session ID")?,
        },
    };

    let credential = Credential::new(session, user.user_id.clone())?;
    let config = ConfigManager::new(paths.config()).load();
    let client = SessionClient::connect(credential, &config).context("Failed to open session")?;
    Ok((Arc::new(client), config))
}

async fn finish(handle: RunHandle<Result<RunSummary>>) -> Result<()> {
    let token = handle.token().clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!(target: "task_result", "🛑 Received Ctrl+C. Finishing in-flight requests...");
                token.cancel();
            }
            Err(err) => {
                error!("Unable to listen for shutdown signal: {}", err);
            }
        }
    });

    let summary = handle.join().await.context("Run task failed to join")??;
    info!(
        target: "task_result",
        "Total Time: {:.1}s | Total Success: {} | Total Fail: {} | Success Rate: {:.2}%",
        summary.elapsed_ms as f64 / 1000.0,
        summary.success,
        summary.failed,
        summary.success_rate
    );
    Ok(())
}

fn select_targets(paths: &DataPaths, ids: &[String]) -> Result<Vec<Target>> {
    let registry = TargetRegistry::load(paths.targets());
    if !ids.is_empty() {
        let selected = registry.select_ids(ids);
        if selected.len() < ids.len() {
            let unknown: Vec<_> = ids
                .iter()
                .filter(|id| !selected.iter().any(|t| &t.user_id == *id))
                .collect();
            anyhow::bail!("Unknown target id(s): {:?}", unknown);
        }
        return Ok(selected);
    }

    if registry.is_empty() {
        anyhow::bail!("No targets selected");
    }
    let labels: Vec<String> = registry.entries().iter().map(Target::to_string).collect();
    let picked = MultiSelect::new()
        .with_prompt("Select targets (space to toggle, enter to confirm)")
        .items(&labels[..])
        .interact()
        .context("Failed to read target selection")?;
    if picked.is_empty() {
        anyhow::bail!("No targets selected");
    }
    Ok(picked
        .into_iter()
        .map(|i| registry.entries()[i].clone())
        .collect())
}

fn users(paths: &DataPaths, action: UserAction) -> Result<()> {
    let mut registry = UserRegistry::load(paths.users());
    match action {
        UserAction::List => {
            if registry.is_empty() {
                println!("No users saved");
            }
            for (i, user) in registry.entries().iter().enumerate() {
                println!("{:>3}  {}", i, user);
            }
        }
        UserAction::Add { nickname, user_id } => {
            let user = registry.add(&nickname, &user_id)?;
            info!(target: "task_result", "SUCCESS | User '{}' added", user.nickname);
        }
        UserAction::Remove { user } => {
            let user = registry.remove(&user)?;
            info!(target: "task_result", "SUCCESS | User '{}' deleted", user.nickname);
        }
    }
    Ok(())
}

fn targets(paths: &DataPaths, action: TargetAction) -> Result<()> {
    let mut registry = TargetRegistry::load(paths.targets());
    match action {
        TargetAction::List => {
            if registry.is_empty() {
                println!("No targets saved");
            }
            for target in registry.entries() {
                println!("{}", target);
            }
        }
        TargetAction::Add { name, user_id } => {
            let target = registry.add(&name, &user_id)?;
            info!(target: "task_result", "SUCCESS | Target '{}' added", target.name);
        }
        TargetAction::Remove { user_ids } => {
            let removed = registry.remove_ids(&user_ids)?;
            if removed.is_empty() {
                anyhow::bail!("No targets selected");
            }
            info!(target: "task_result", "SUCCESS | Deleted {} target(s)", removed.len());
        }
    }
    Ok(())
}

fn settings(paths: &DataPaths, action: SettingsAction) -> Result<()> {
    let manager = ConfigManager::new(paths.config());
    match action {
        SettingsAction::Show => {
            let config = manager.load();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        SettingsAction::Set {
            user_agent,
            max_workers,
            timeout,
            retries,
            base_url,
        } => {
            let mut config = manager.load();
            if let Some(ua) = user_agent {
                config.user_agent = ua.trim().to_string();
            }
            if let Some(workers) = max_workers {
                config.max_workers = workers;
            }
            if let Some(timeout) = timeout {
                config.request_timeout = timeout;
            }
            if let Some(retries) = retries {
                config.max_retries = retries;
            }
            if let Some(url) = base_url {
                config.base_url = url;
            }
            manager.save(&config)?;
            info!(target: "task_result", "SUCCESS | Settings saved");
        }
        SettingsAction::Reset => {
            manager.reset()?;
            info!(target: "task_result", "SUCCESS | Settings reset to defaults");
        }
    }
    Ok(())
}
