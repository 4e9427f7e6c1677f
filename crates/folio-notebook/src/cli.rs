//! folio CLI tool
//!
//! Reads and writes notebooks directly against storage, sharing the session
//! (active address, open notebook) with the node through the data directory.

use clap::{Parser, Subcommand};
use folio_notebook::node::FolioState;
use folio_notebook::{
    append_version, list_all_notebooks, load_version_content, notebook_by_id,
    notebooks_by_author, Error, FolioConfig, NewVersion, NotebookMetadata, NotebookVersion,
    Result,
};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Versioned research notebooks on IPFS")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List notebooks, newest first
    List {
        /// Only notebooks by this address
        #[arg(long, conflicts_with = "mine")]
        author: Option<String>,
        /// Only notebooks by the logged-in address
        #[arg(long)]
        mine: bool,
    },
    /// Show a notebook's metadata
    Show { notebook_id: String },
    /// List a notebook's versions
    History { notebook_id: String },
    /// Print the content of a version (latest by default)
    Read {
        notebook_id: String,
        #[arg(long)]
        version: Option<u32>,
    },
    /// Print a citation for a version (latest by default)
    Cite {
        notebook_id: String,
        #[arg(long)]
        version: Option<u32>,
    },
    /// Save a new version from a file or stdin
    Save {
        #[arg(long)]
        title: String,
        /// Read content from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        /// Append to this notebook (defaults to the open notebook)
        #[arg(long, conflicts_with = "new")]
        notebook: Option<String>,
        /// Start a new notebook even if one is open
        #[arg(long)]
        new: bool,
        /// Save as this address instead of the logged-in one
        #[arg(long)]
        author: Option<String>,
    },
    /// Set the active address
    Login { address: String },
    /// Clear the active address
    Logout,
    /// Print the active address
    Whoami,
    /// Mark a notebook as open
    Open { notebook_id: String },
    /// Clear the open notebook
    Close,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=warn,folio_notebook=warn,folio_storage=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    let config = FolioConfig::from_env()?;
    let store = config.build_store_strict()?;
    let state = FolioState::open(&config, store)?;

    match command {
        Command::List { author, mine } => {
            let author = if mine { Some(require_address(&state)?) } else { author };
            let notebooks = match author {
                Some(address) => notebooks_by_author(state.store.as_ref(), &address).await,
                None => list_all_notebooks(state.store.as_ref()).await,
            };
            if notebooks.is_empty() {
                println!("(none)");
            }
            for nb in &notebooks {
                println!(
                    "{}  v{}  {}  {}  {}",
                    nb.notebook_id,
                    nb.versions.len(),
                    nb.updated_at,
                    nb.author,
                    nb.title
                );
            }
        }
        Command::Show { notebook_id } => {
            let nb = find(&state, &notebook_id).await?;
            println!("{}", nb.to_wire()?);
        }
        Command::History { notebook_id } => {
            let nb = find(&state, &notebook_id).await?;
            println!("{} ({})", nb.title, nb.notebook_id);
            for v in nb.versions.iter().rev() {
                println!("  v{}  {}  {}", v.version, v.timestamp, v.content_id);
                println!("      {}", v.preview.replace('\n', " "));
            }
        }
        Command::Read { notebook_id, version } => {
            let nb = find(&state, &notebook_id).await?;
            let number = pick_version(&nb, version)?.version;
            let content = load_version_content(state.store.as_ref(), &nb, number).await?;
            print!("{}", content);
        }
        Command::Cite { notebook_id, version } => {
            let nb = find(&state, &notebook_id).await?;
            println!("{}", pick_version(&nb, version)?.citation());
        }
        Command::Save {
            title,
            file,
            notebook,
            new,
            author,
        } => {
            let author = match author {
                Some(a) => a,
                None => require_address(&state)?,
            };
            let content = match file {
                Some(path) => tokio::fs::read_to_string(path).await?,
                None => {
                    let mut buf = String::new();
                    tokio::io::stdin().read_to_string(&mut buf).await?;
                    buf
                }
            };

            let draft = NewVersion::new(content, author, title);
            draft.validate()?;

            let target = if new {
                None
            } else {
                notebook.or(state.session.current_notebook()?)
            };
            let existing = match target {
                Some(id) => {
                    let nb = find(&state, &id).await?;
                    draft.check_author(&nb)?;
                    Some(nb)
                }
                None => None,
            };

            let saved = append_version(state.store.as_ref(), &draft, existing.as_ref()).await?;
            state.remember_notebook(&saved.metadata.notebook_id)?;

            let latest = saved.metadata.versions.len();
            println!("Saved {} v{}", saved.metadata.notebook_id, latest);
            println!("  content:  {}", saved.content_cid);
            println!("  metadata: {}", saved.metadata_cid);
        }
        Command::Login { address } => {
            if address.trim().is_empty() {
                return Err(Error::InvalidInput("address is empty".into()));
            }
            state.identity.set_active_address(Some(address))?;
            if let Some(active) = state.identity.active_address() {
                println!("Logged in as {}", active);
            }
        }
        Command::Logout => {
            if state.identity.disconnect()? {
                println!("Logged out");
            } else {
                println!("Not logged in");
            }
        }
        Command::Whoami => match state.identity.active_address() {
            Some(address) => println!("{}", address),
            None => println!("(not logged in)"),
        },
        Command::Open { notebook_id } => {
            let nb = find(&state, &notebook_id).await?;
            state.session.set_current_notebook(&nb.notebook_id)?;
            println!("Opened {} ({})", nb.title, nb.notebook_id);
        }
        Command::Close => {
            state.session.clear_current_notebook()?;
            println!("Closed");
        }
    }

    Ok(())
}

fn require_address(state: &FolioState) -> Result<String> {
    state
        .identity
        .active_address()
        .ok_or_else(|| Error::InvalidInput("not logged in (run `folio login <address>`)".into()))
}

async fn find(state: &FolioState, notebook_id: &str) -> Result<NotebookMetadata> {
    notebook_by_id(state.store.as_ref(), notebook_id)
        .await
        .ok_or_else(|| Error::NotFound(notebook_id.to_string()))
}

fn pick_version(nb: &NotebookMetadata, version: Option<u32>) -> Result<&NotebookVersion> {
    let picked = match version {
        Some(n) => nb.version(n),
        None => nb.latest(),
    };
    picked.ok_or_else(|| {
        Error::NotFound(format!("{} v{}", nb.notebook_id, version.unwrap_or(0)))
    })
}
