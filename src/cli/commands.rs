use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use crate::card::{CARD_QR_SURFACE_ID, build_mecard};
use crate::export::{MountedSurfaces, Surface, load_surface_file};
use crate::history::{FileStore, HistoryStore, KeyValueStore, RecoveryPolicy, StoreOptions};
use crate::models::{CardData, DEFAULT_SIZE, QrConfig, RenderFormat};
use crate::session::Session;
use crate::utils::{DEFAULT_FILE_NAME, Settings, format_saved_at};

#[derive(Parser)]
#[command(name = "qr-keeper")]
#[command(version = "0.1.0")]
#[command(about = "Save, list and export generated QR codes", long_about = None)]
pub struct Cli {
    /// Directory holding the history store (overrides QR_KEEPER_HOME)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Storage quota in bytes (overrides QR_KEEPER_QUOTA_BYTES)
    #[arg(long, global = true)]
    pub quota_bytes: Option<u64>,

    /// Share of history kept on the first quota failure (overrides QR_KEEPER_TRIM_RATIO)
    #[arg(long, global = true)]
    pub trim_ratio: Option<f64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save a rendered QR code to history
    Save(SaveArgs),
    /// List saved QR codes, newest first
    List,
    /// Delete a saved QR code
    Remove { id: String },
    /// Write a saved QR code's image to disk
    Export {
        id: String,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Print the MECARD payload for a set of contact details
    Card(CardArgs),
}

#[derive(Args)]
pub struct SaveArgs {
    /// Content encoded in the QR code (in card mode, empty means use the contact details)
    #[arg(long, default_value = "")]
    pub text: String,

    /// Rendered QR image (.png for canvas, .svg for svg)
    #[arg(long)]
    pub surface: PathBuf,

    /// Render format; inferred from the surface file when omitted
    #[arg(long)]
    pub format: Option<RenderFormat>,

    /// Edge length of the rendered symbol in px (120-512)
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    pub size: u32,

    /// Base name used for downloads
    #[arg(long, default_value = DEFAULT_FILE_NAME)]
    pub file_name: String,

    #[command(flatten)]
    pub card: CardArgs,
}

#[derive(Args, Default)]
pub struct CardArgs {
    #[arg(long = "card-name")]
    pub name: Option<String>,
    #[arg(long = "card-role")]
    pub role: Option<String>,
    #[arg(long = "card-email")]
    pub email: Option<String>,
    #[arg(long = "card-phone")]
    pub phone: Option<String>,
    #[arg(long = "card-website")]
    pub website: Option<String>,
}

impl CardArgs {
    /// Contact details, or `None` when no card flag was given
    pub fn to_card_data(&self) -> Option<CardData> {
        let fields = [&self.name, &self.role, &self.email, &self.phone, &self.website];
        if fields.iter().all(|f| f.is_none()) {
            return None;
        }

        Some(CardData {
            name: self.name.clone().unwrap_or_default(),
            role: self.role.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            website: self.website.clone().unwrap_or_default(),
        })
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = &cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };

    if let Commands::Card(args) = command {
        return print_mecard(args);
    }

    let settings =
        Settings::from_env()?.with_overrides(cli.data_dir.clone(), cli.quota_bytes, cli.trim_ratio);
    let mut session = open_session(&settings)?;

    let result = match command {
        Commands::Save(args) => save(&mut session, args),
        Commands::List => {
            list(&session);
            Ok(())
        }
        Commands::Remove { id } => remove(&mut session, id),
        Commands::Export { id, out } => export(&session, id, out),
        Commands::Card(_) => Ok(()),
    };

    report_notification(&session);
    result
}

fn open_session(settings: &Settings) -> Result<Session<FileStore>> {
    let backend = FileStore::open(&settings.data_dir)
        .with_context(|| format!("Failed to open history store at {}", settings.data_dir.display()))?
        .with_quota(settings.quota_bytes);

    let options = StoreOptions { recovery: RecoveryPolicy::new(settings.trim_ratio), ..StoreOptions::default() };
    Ok(Session::new(HistoryStore::open_with(backend, options)))
}

fn save(session: &mut Session<FileStore>, args: &SaveArgs) -> Result<()> {
    let surface = load_surface_file(&args.surface)?;
    let format = args.format.unwrap_or_else(|| surface.format());
    let card = args.card.to_card_data();

    // Card saves read the card's own QR canvas; anything else is the regular preview
    let mut surfaces = MountedSurfaces::new();
    if card.is_some() && matches!(surface, Surface::Bitmap(_)) {
        surfaces.mount(CARD_QR_SURFACE_ID, surface);
    } else {
        surfaces.mount_preview(surface);
    }

    let mut config = QrConfig::new(args.text.clone(), format, args.size)?.with_file_name(args.file_name.clone());
    if let Some(card) = card {
        config = config.with_card(card);
    }

    match session.save_to_history(&config, &surfaces)? {
        Some(report) => println!("{}", report.id),
        None => println!("Nothing to save: QR text is empty"),
    }
    Ok(())
}

fn list<B: KeyValueStore>(session: &Session<B>) {
    let records = session.store().records();
    if records.is_empty() {
        println!("No saved items yet.");
        return;
    }

    println!("{:<36}  {:<4}  {:<6}  {:>5}  {:<24}  SAVED", "ID", "MODE", "FORMAT", "SIZE", "FILE");
    for record in records {
        println!(
            "{:<36}  {:<4}  {:<6}  {:>5}  {:<24}  {}",
            record.id,
            record.mode().to_string(),
            record.format.as_str(),
            format!("{}px", record.size),
            record.file_name,
            format_saved_at(&record.saved_at)
        );
    }
}

fn remove(session: &mut Session<FileStore>, id: &str) -> Result<()> {
    if session.delete(id).is_none() {
        bail!("No history record with id {}", id);
    }
    println!("Removed {}", id);
    Ok(())
}

fn export(session: &Session<FileStore>, id: &str, out: &Path) -> Result<()> {
    let path = session.redownload(id)?.write_to(out)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn print_mecard(args: &CardArgs) -> Result<()> {
    let payload = args.to_card_data().map(|card| build_mecard(&card)).unwrap_or_default();
    if payload.is_empty() {
        bail!("No contact details given (use --card-name, --card-phone, --card-email or --card-website)");
    }
    println!("{}", payload);
    Ok(())
}

fn report_notification<B: KeyValueStore>(session: &Session<B>) {
    if let Some(notification) = session.store().notifier().current() {
        eprintln!("[{}] {}", notification.level, notification.message);
    }
}
