mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use lotus_core::{
    EnergyLevel, JournalDraft, MeditationType, Mood, PHASE_THRESHOLDS, RitualDraft, SessionDraft,
    Soundscape, UserProfile, compute_growth_state, now_unix_secs, unix_to_iso8601,
};
use lotus_store::project;
use lotus_sync::{HttpCloudActor, Identity, SyncClient, SyncError};

#[derive(Parser)]
#[command(name = "lotus", about = "Meditation companion: journal, sessions, rituals, lotus growth")]
struct Cli {
    /// Override the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Cloud backend base URL (cloud mode needs --principal too)
    #[arg(long, global = true)]
    remote_url: Option<String>,

    /// Bearer principal for cloud mode
    #[arg(long, global = true)]
    principal: Option<String>,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Journal entries
    #[command(subcommand)]
    Journal(JournalCmd),

    /// Meditation sessions
    #[command(subcommand)]
    Session(SessionCmd),

    /// Saved ritual presets
    #[command(subcommand)]
    Ritual(RitualCmd),

    /// Show practice statistics
    Stats,

    /// Print the lotus growth state for a minute total
    Growth {
        /// Lifetime practice minutes
        #[arg(allow_negative_numbers = true)]
        minutes: f64,
    },

    /// Export all data to a JSON file
    Export {
        /// Output file path
        path: PathBuf,
    },

    /// Import data from a JSON file, replacing what is there
    Import {
        /// Input file path
        path: PathBuf,
    },

    /// Account profile (cloud mode only)
    #[command(subcommand)]
    Profile(ProfileCmd),
}

#[derive(Subcommand)]
enum JournalCmd {
    /// Add an entry
    Add {
        /// Free-form reflection text
        reflection: String,

        /// calm | grateful | anxious | tired | joyful
        #[arg(long, value_parser = parse_mood)]
        mood: Option<Mood>,

        /// low | balanced | high
        #[arg(long, value_parser = parse_energy, default_value = "balanced")]
        energy: EnergyLevel,

        /// Something you are grateful for (repeatable)
        #[arg(long = "grateful")]
        gratitude: Vec<String>,
    },
    /// List entries
    List,
    /// Delete an entry by id
    Delete { id: u64 },
}

#[derive(Subcommand)]
enum SessionCmd {
    /// Record a completed session
    Record {
        /// mindfulness | breathing | body-scan | loving-kindness | visualization
        #[arg(value_parser = parse_meditation_type)]
        meditation_type: MeditationType,

        /// Duration in minutes
        minutes: u32,

        /// silence | rain | ocean | forest | temple | bells
        #[arg(long, value_parser = parse_soundscape, default_value = "silence")]
        soundscape: Soundscape,
    },
}

#[derive(Subcommand)]
enum RitualCmd {
    /// Save a ritual preset
    Save {
        /// Display name
        name: String,

        /// mindfulness | breathing | body-scan | loving-kindness | visualization
        #[arg(value_parser = parse_meditation_type)]
        meditation_type: MeditationType,

        /// Duration in minutes
        minutes: u32,

        /// silence | rain | ocean | forest | temple | bells
        #[arg(long, value_parser = parse_soundscape, default_value = "silence")]
        soundscape: Soundscape,

        /// Playback volume, 0-100
        #[arg(long, default_value_t = 70)]
        volume: u8,
    },
    /// List saved rituals
    List,
    /// Delete a ritual by id
    Delete { id: u64 },
}

#[derive(Subcommand)]
enum ProfileCmd {
    /// Show the cloud profile
    Show,
    /// Set the display name
    Set {
        /// New display name
        name: String,
    },
}

fn parse_mood(s: &str) -> std::result::Result<Mood, String> {
    Mood::from_str_opt(s)
        .ok_or_else(|| format!("unknown mood {s:?} (calm, grateful, anxious, tired, joyful)"))
}

fn parse_energy(s: &str) -> std::result::Result<EnergyLevel, String> {
    EnergyLevel::from_str_opt(s).ok_or_else(|| format!("unknown energy {s:?} (low, balanced, high)"))
}

fn parse_meditation_type(s: &str) -> std::result::Result<MeditationType, String> {
    MeditationType::from_str_opt(s).ok_or_else(|| {
        format!(
            "unknown meditation type {s:?} \
             (mindfulness, breathing, body-scan, loving-kindness, visualization)"
        )
    })
}

fn parse_soundscape(s: &str) -> std::result::Result<Soundscape, String> {
    Soundscape::from_str_opt(s)
        .ok_or_else(|| format!("unknown soundscape {s:?} (silence, rain, ocean, forest, temple, bells)"))
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        // Sync failures carry their own user-facing wording; everything
        // else goes through anyhow's chain.
        match e.downcast_ref::<SyncError>() {
            Some(sync) => {
                eprintln!("error: {}", sync.user_message());
                std::process::exit(1);
            }
            None => return Err(e),
        }
    }
    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    let client = build_client(cli).await?;

    match &cli.command {
        Commands::Journal(cmd) => cmd_journal(&client, cmd).await,
        Commands::Session(cmd) => cmd_session(&client, cmd).await,
        Commands::Ritual(cmd) => cmd_ritual(&client, cmd).await,
        Commands::Stats => cmd_stats(&client, cli.verbose).await,
        Commands::Growth { minutes } => cmd_growth(*minutes),
        Commands::Export { path } => cmd_export(&client, path).await,
        Commands::Import { path } => cmd_import(&client, path).await,
        Commands::Profile(cmd) => cmd_profile(&client, cmd).await,
    }
}

async fn build_client(cli: &Cli) -> Result<SyncClient> {
    let data_dir = project::resolve_data_dir(cli.data_dir.as_deref());
    let vault = project::open_vault(&data_dir).context("failed to open guest vault")?;

    let file = config::FileConfig::load(&project::config_path(&data_dir))?;
    let settings = config::resolve(cli.remote_url.clone(), cli.principal.clone(), &file);

    let client = SyncClient::with_policy(vault, settings.policy);

    if let (Some(url), Some(principal)) = (&settings.remote_url, &settings.principal) {
        let actor = HttpCloudActor::new(url, principal)?;
        client
            .sign_in(Identity::new(principal.clone()), Arc::new(actor))
            .await;
        tracing::info!("cloud mode against {url}");
    } else if settings.remote_url.is_some() {
        tracing::warn!("--remote-url set without a principal; staying in guest mode");
    }

    // ctrl-c aborts readiness waits and retry pauses
    let cancel = client.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    Ok(client)
}

async fn cmd_journal(client: &SyncClient, cmd: &JournalCmd) -> Result<()> {
    match cmd {
        JournalCmd::Add {
            reflection,
            mood,
            energy,
            gratitude,
        } => {
            let entry = client
                .add_journal_entry(JournalDraft {
                    created_at: now_unix_secs(),
                    mood: *mood,
                    energy: *energy,
                    gratitude: gratitude.clone(),
                    reflection: reflection.clone(),
                })
                .await?;
            println!("added entry {}", entry.id);
        }
        JournalCmd::List => {
            let entries = client.journal_entries().await?;
            if entries.is_empty() {
                println!("(no journal entries)");
            }
            for e in entries {
                let mood = e.mood.map(|m| m.as_str()).unwrap_or("-");
                println!(
                    "#{:<4} {}  mood={:<8} energy={:<8} {}",
                    e.id,
                    unix_to_iso8601(e.created_at),
                    mood,
                    e.energy.as_str(),
                    e.reflection
                );
            }
        }
        JournalCmd::Delete { id } => {
            client.delete_journal_entry(*id).await?;
            println!("deleted entry {id}");
        }
    }
    Ok(())
}

async fn cmd_session(client: &SyncClient, cmd: &SessionCmd) -> Result<()> {
    match cmd {
        SessionCmd::Record {
            meditation_type,
            minutes,
            soundscape,
        } => {
            let record = client
                .record_session(SessionDraft {
                    meditation_type: *meditation_type,
                    duration_minutes: *minutes,
                    soundscape: *soundscape,
                    completed_at: now_unix_secs(),
                })
                .await?;
            let progress = client.progress().await?;
            println!(
                "recorded {} min of {}",
                record.duration_minutes,
                record.meditation_type.as_str()
            );
            println!(
                "streak: {} days, total: {} min",
                progress.current_streak, progress.total_minutes
            );
        }
    }
    Ok(())
}

async fn cmd_ritual(client: &SyncClient, cmd: &RitualCmd) -> Result<()> {
    match cmd {
        RitualCmd::Save {
            name,
            meditation_type,
            minutes,
            soundscape,
            volume,
        } => {
            let ritual = client
                .save_ritual(RitualDraft {
                    name: name.clone(),
                    meditation_type: *meditation_type,
                    duration_minutes: *minutes,
                    soundscape: *soundscape,
                    volume: *volume,
                    created_at: now_unix_secs(),
                })
                .await?;
            println!("saved ritual {} ({})", ritual.id, ritual.name);
        }
        RitualCmd::List => {
            let rituals = client.rituals().await?;
            if rituals.is_empty() {
                println!("(no rituals)");
            }
            for r in rituals {
                println!(
                    "#{:<4} {:<20} {} {} min  {} vol={}",
                    r.id,
                    r.name,
                    r.meditation_type.as_str(),
                    r.duration_minutes,
                    r.soundscape.as_str(),
                    r.volume
                );
            }
        }
        RitualCmd::Delete { id } => {
            client.delete_ritual(*id).await?;
            println!("deleted ritual {id}");
        }
    }
    Ok(())
}

async fn cmd_stats(client: &SyncClient, verbose: bool) -> Result<()> {
    let progress = client.progress().await?;
    let state = compute_growth_state(progress.total_minutes as f64);

    println!("total:     {} min", progress.total_minutes);
    println!("month:     {} min", progress.monthly_minutes);
    println!("streak:    {} days", progress.current_streak);
    println!("sessions:  {}", progress.sessions.len());
    match progress.last_session_at {
        Some(at) => println!("last:      {}", unix_to_iso8601(at)),
        None => println!("last:      never"),
    }
    println!("phase:     {}/{}", state.phase, PHASE_THRESHOLDS.len() - 1);
    println!("growth:    {:.1}%", state.overall_growth * 100.0);
    if state.cap_reached {
        println!("presence:  reached");
    }

    if verbose {
        eprintln!(
            "--- layers: [{:.2}, {:.2}, {:.2}, {:.2}], vividness={:.2} ---",
            state.layer_openness[0],
            state.layer_openness[1],
            state.layer_openness[2],
            state.layer_openness[3],
            state.vividness
        );
    }
    Ok(())
}

fn cmd_growth(minutes: f64) -> Result<()> {
    let state = compute_growth_state(minutes);
    println!(
        "{}",
        serde_json::to_string_pretty(&state).context("failed to serialize growth state")?
    );
    Ok(())
}

async fn cmd_export(client: &SyncClient, path: &Path) -> Result<()> {
    client.export_to_file(path).await?;
    println!("exported to {}", path.display());
    Ok(())
}

async fn cmd_import(client: &SyncClient, path: &Path) -> Result<()> {
    let summary = client.import_from_file(path).await?;
    println!(
        "imported {} journal entries, {} sessions, {} rituals from {}",
        summary.journal_entries,
        summary.sessions,
        summary.rituals,
        path.display()
    );
    Ok(())
}

async fn cmd_profile(client: &SyncClient, cmd: &ProfileCmd) -> Result<()> {
    match cmd {
        ProfileCmd::Show => match client.profile().await? {
            Some(p) => {
                println!("name:    {}", p.name);
                println!("joined:  {}", unix_to_iso8601(p.joined_at));
            }
            None => println!("(no profile)"),
        },
        ProfileCmd::Set { name } => {
            let existing = client.profile().await?;
            let joined_at = existing
                .as_ref()
                .map(|p| p.joined_at)
                .unwrap_or_else(now_unix_secs);
            let avatar = existing.and_then(|p| p.avatar);
            client
                .save_profile(UserProfile {
                    name: name.clone(),
                    joined_at,
                    avatar,
                })
                .await?;
            println!("profile saved");
        }
    }
    Ok(())
}
