use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::TryStreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use taskue_client::{ClientConfig, Namespace, Taskue, WaitOptions};
use taskue_config::SubmissionDef;
use taskue_store::SqliteStore;

/// Taskue - submit and track staged workflows in a shared store
#[derive(Parser)]
#[command(name = "taskue")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.taskue)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Delay between status checks while waiting, in milliseconds
  #[arg(long, global = true, default_value_t = 1000)]
  poll_interval_ms: u64,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Submit a workflow from a JSON file
  Submit {
    /// Path to the submission file (object with stages, or a bare array of stages)
    file: PathBuf,

    /// Workflow title, overriding the one in the file
    #[arg(long)]
    title: Option<String>,
  },

  /// Inspect, wait for and delete workflows
  Workflow {
    #[command(subcommand)]
    command: WorkflowCommand,
  },

  /// Inspect and wait for tasks
  Task {
    #[command(subcommand)]
    command: TaskCommand,
  },

  /// Inspect registered runners
  Runner {
    #[command(subcommand)]
    command: RunnerCommand,
  },

  /// Inspect and remove namespaces
  Namespace {
    #[command(subcommand)]
    command: NamespaceCommand,
  },
}

#[derive(Subcommand)]
enum WorkflowCommand {
  /// List workflow ids, oldest first
  List {
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Page size (default: 25)
    #[arg(long)]
    limit: Option<usize>,

    /// Only list finished workflows
    #[arg(long)]
    done: bool,
  },

  /// Show a workflow with current task statuses
  Get { uid: String },

  /// Block until a workflow finishes
  Wait {
    uid: String,

    #[arg(long)]
    timeout_secs: Option<u64>,
  },

  /// Delete a finished workflow and its tasks
  Delete { uid: String },
}

#[derive(Subcommand)]
enum TaskCommand {
  Get {
    uid: String,
  },

  /// Block until a task finishes
  Wait {
    uid: String,

    #[arg(long)]
    timeout_secs: Option<u64>,
  },
}

#[derive(Subcommand)]
enum RunnerCommand {
  List,
  Get { name: String },
}

#[derive(Subcommand)]
enum NamespaceCommand {
  /// List namespaces with their last activity timestamp
  List,
  Delete { name: String },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  let Some(command) = cli.command else {
    println!("taskue - use --help to see available commands");
    return Ok(());
  };

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".taskue"),
  };

  let config = ClientConfig {
    poll_interval: Duration::from_millis(cli.poll_interval_ms),
    ..ClientConfig::default()
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run(command, data_dir, config).await })
}

async fn run(command: Commands, data_dir: PathBuf, config: ClientConfig) -> Result<()> {
  tokio::fs::create_dir_all(&data_dir)
    .await
    .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

  let db_path = data_dir.join("taskue.db");
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store: {}", db_path.display()))?;
  let client = Taskue::with_config(store, config);

  match command {
    Commands::Submit { file, title } => {
      let content = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("failed to read submission file: {}", file.display()))?;

      let mut def = SubmissionDef::from_json(&content)
        .with_context(|| format!("failed to parse submission file: {}", file.display()))?;
      if title.is_some() {
        def.title = title;
      }

      eprintln!("Submitting {} tasks in {} stages", def.task_count(), def.stages.len());
      let uid = client.submit_def(def).await.context("submit failed")?;
      print_json(&uid)
    }

    Commands::Workflow { command } => match command {
      WorkflowCommand::List { page, limit, done } => {
        let limit = limit.unwrap_or(client.config().default_page_size);
        let uids = if done {
          client.list_done_workflows(page, limit).await?
        } else {
          client.list_workflows(page, limit).await?
        };
        print_json(&uids)
      }
      WorkflowCommand::Get { uid } => print_json(&client.get_workflow(&uid).await?),
      WorkflowCommand::Wait { uid, timeout_secs } => {
        let options = wait_options(&client, timeout_secs);
        let workflow = client
          .wait_workflow_with(&uid, &options)
          .await
          .with_context(|| format!("waiting for workflow '{}' failed", uid))?;
        print_json(&workflow)
      }
      WorkflowCommand::Delete { uid } => {
        client.delete_workflow(&uid).await?;
        eprintln!("Deleted workflow: {}", uid);
        Ok(())
      }
    },

    Commands::Task { command } => match command {
      TaskCommand::Get { uid } => print_json(&client.get_task(&uid).await?),
      TaskCommand::Wait { uid, timeout_secs } => {
        let options = wait_options(&client, timeout_secs);
        let task = client
          .wait_task_with(&uid, &options)
          .await
          .with_context(|| format!("waiting for task '{}' failed", uid))?;
        print_json(&task)
      }
    },

    Commands::Runner { command } => match command {
      RunnerCommand::List => print_json(&client.list_runners().await?),
      RunnerCommand::Get { name } => print_json(&client.get_runner(&name).await?),
    },

    Commands::Namespace { command } => match command {
      NamespaceCommand::List => {
        let namespaces: Vec<Namespace> = client.list_namespaces().try_collect().await?;
        print_json(&namespaces)
      }
      NamespaceCommand::Delete { name } => {
        client.delete_namespace(&name).await?;
        eprintln!("Deleted namespace: {}", name);
        Ok(())
      }
    },
  }
}

/// Poll at the configured interval, give up after `timeout_secs`, and stop
/// on Ctrl-C.
fn wait_options(client: &Taskue<SqliteStore>, timeout_secs: Option<u64>) -> WaitOptions {
  let cancel = CancellationToken::new();
  let on_interrupt = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      on_interrupt.cancel();
    }
  });

  let mut options = WaitOptions::new(client.config().poll_interval).with_cancel(cancel);
  if let Some(secs) = timeout_secs {
    options = options.with_timeout(Duration::from_secs(secs));
  }
  options
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
