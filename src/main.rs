mod api;
mod app;
mod error;
mod persistence;
mod render;
mod session;
mod storage;
mod store;
mod ui;
mod utils;

use crate::api::client::ApiClient;
use crate::api::models::{Contact, Theme};
use crate::app::AppConfig;
use crate::error::{ChatError, Result};
use crate::session::{ChatSession, SessionOptions};
use crate::storage::Storage;
use crate::ui::chat_view::ChatView;
use crate::ui::profile::avatar_source;
use crate::ui::sidebar::{contact_rows, format_contacts};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mona-chat")]
#[command(about = "Chat with a fixed set of contacts from the terminal", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/mona-chat.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite file holding the chats
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Reply service base URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Skip the artificial reply delay
    #[arg(long, global = true)]
    no_delay: bool,

    /// Log more (repeat for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat
    Chat {
        #[arg(default_value = "alex")]
        contact: Contact,
    },

    /// Print a chat transcript
    Show { contact: Contact },

    /// Send one message and wait for the reply
    Send {
        contact: Contact,
        text: String,
        /// Attach a picture
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Delete every message with a contact
    Clear { contact: Contact },

    /// Rename a contact
    Rename { contact: Contact, name: String },

    /// Change a contact's picture (file path or URL)
    Avatar { contact: Contact, src: String },

    /// Show or set the theme
    Theme { name: Option<Theme> },

    /// List contacts with their latest message
    Contacts,

    /// Write the effective config to the config file
    InitConfig,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref());
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(db) = cli.db {
        config.database = Some(db);
    }
    if cli.no_delay {
        config.simulate_latency = false;
    }

    let command = cli.command.unwrap_or(Commands::Chat { contact: Contact::Alex });
    if let Commands::InitConfig = command {
        let path = config.save(cli.config.as_deref())?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let db_path = config
        .database_path()
        .ok_or_else(|| ChatError::Config("no data dir for the chat database".into()))?;
    info!("using database {}", db_path.display());
    let storage = Storage::open(&db_path)?;
    let client = ApiClient::new(&config.endpoint)?;
    let mut session = ChatSession::open(storage, client, ChatView::stdout(), SessionOptions::from(&config))?;

    match command {
        Commands::Chat { contact } => ui::shell::run(&mut session, contact).await?,
        Commands::Show { contact } => session.switch_to(contact),
        Commands::Send { contact, text, image } => {
            let image = image.map(|path| utils::image_data_url(&path)).transpose()?;
            session.switch_to(contact);
            session.send(contact, &text, image)?;
            session.settle().await?;
        }
        Commands::Clear { contact } => {
            session.switch_to(contact);
            session.clear_chat(contact)?;
        }
        Commands::Rename { contact, name } => session.rename(contact, &name)?,
        Commands::Avatar { contact, src } => session.set_avatar(contact, avatar_source(&src)?)?,
        Commands::Theme { name: None } => println!("{}", session.theme().name()),
        Commands::Theme { name: Some(theme) } => session.set_theme(theme)?,
        Commands::Contacts => {
            for line in format_contacts(&contact_rows(session.state(), session.current())) {
                println!("{line}");
            }
        }
        Commands::InitConfig => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
