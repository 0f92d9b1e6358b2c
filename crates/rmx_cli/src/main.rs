use std::sync::Arc;

use clap::Parser;
use tracing::info;

use rmx_core::url::{is_valid_url, normalize_url};
use rmx_core::{Error, Result, StaticSessions, Style};
use rmx_flow::{FlowOutput, ProcessRunner, ProcessState};
use rmx_generation::{payments::PaymentClient, uploads::ObjectStorage};
use rmx_web::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Storage backend: memory or sqlite
    #[arg(long, default_value = "memory", env = "RMX_STORAGE")]
    storage: String,
    /// SQLite database path (sqlite storage only)
    #[arg(long, env = "RMX_DATABASE_PATH")]
    database_path: Option<String>,
    /// Generation backend: mock or http
    #[arg(long, default_value = "mock", env = "RMX_BACKEND")]
    backend: String,
    /// Base URL of the generation service (http backend only)
    #[arg(long, env = "RMX_BACKEND_URL")]
    backend_url: Option<String>,
    /// Identity used for CLI data access
    #[arg(long, default_value_t = 1)]
    user: i64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the web application
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000", env = "RMX_BIND")]
        bind: String,
    },
    /// Run the staged pipeline for a URL and print each step
    Generate {
        url: String,
        /// One of: meme, comic, simplify
        #[arg(long, default_value = "meme")]
        style: String,
    },
    /// Inspect or prune generated media
    Media {
        #[command(subcommand)]
        command: MediaCommands,
    },
    /// Manage personas
    Persona {
        #[command(subcommand)]
        command: PersonaCommands,
    },
}

#[derive(clap::Subcommand, Debug)]
enum MediaCommands {
    /// List media, newest first
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Delete one media item by id
    Delete { id: String },
}

#[derive(clap::Subcommand, Debug)]
enum PersonaCommands {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        image_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let backend = rmx_generation::create_backend(&rmx_generation::Config {
        backend: cli.backend.clone(),
        backend_url: cli.backend_url.clone(),
    })?;
    info!("🧠 Generation backend initialized (using {})", backend.name());

    let store = rmx_storage::create_store(&cli.storage, cli.database_path.as_deref()).await?;
    info!("💾 Storage initialized (using {})", cli.storage);

    match cli.command {
        Commands::Serve { bind } => {
            let tokens = std::env::var("RMX_SESSION_TOKENS").unwrap_or_default();
            let sessions = Arc::new(StaticSessions::from_env_spec(&tokens));

            let uploads = match (
                std::env::var("RMX_UPLOAD_ENDPOINT"),
                std::env::var("RMX_UPLOAD_BUCKET"),
            ) {
                (Ok(endpoint), Ok(bucket)) => Some(ObjectStorage::new(endpoint, bucket)),
                _ => None,
            };
            let payments = std::env::var("RMX_PAYMENT_API_KEY")
                .ok()
                .map(PaymentClient::new);

            let app = rmx_web::create_app(AppState {
                backend,
                store,
                sessions,
                uploads,
                payments,
            });
            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!("🌐 Listening on {}", bind);
            axum::serve(listener, app).await?;
        }
        Commands::Generate { url, style } => {
            let style: Style = style.parse()?;
            if !is_valid_url(&url) {
                return Err(Error::InvalidUrl(url));
            }
            let target = normalize_url(&url);
            info!("🎨 Generating {} for {}", style, target);

            let mut runner = ProcessRunner::new(backend);
            let state = runner.run_staged(&target, style).await;
            for line in runner.log() {
                println!("  {}", line);
            }
            match state {
                ProcessState::Complete(FlowOutput::Staged { scraped, concepts }) => {
                    println!(
                        "✨ {} ({} words, ~{} min read)",
                        scraped.title, scraped.word_count, scraped.estimated_read_time
                    );
                    for concept in concepts {
                        println!("  - {} [{}] {}", concept.title, concept.tone, concept.visual);
                    }
                }
                ProcessState::Error(message) => {
                    return Err(Error::Generation(message));
                }
                other => {
                    return Err(Error::Generation(format!(
                        "Pipeline ended in unexpected state: {}",
                        other.label()
                    )));
                }
            }
        }
        Commands::Media { command } => match command {
            MediaCommands::List { search } => {
                let media = backend.list_media(cli.user, search.as_deref()).await?;
                println!("Found {} media items", media.len());
                for item in media {
                    println!(
                        "  #{} [{}] {} ({})",
                        item.id,
                        item.style,
                        item.media_url,
                        item.date_created.format("%Y-%m-%d %H:%M")
                    );
                }
            }
            MediaCommands::Delete { id } => {
                backend.delete_media(cli.user, &id).await?;
                println!("🗑️  Deleted media {}", id);
            }
        },
        Commands::Persona { command } => match command {
            PersonaCommands::List => {
                for persona in store.list_personas(cli.user).await? {
                    println!(
                        "  #{} {} - {} ({})",
                        persona.id, persona.name, persona.description, persona.image_url
                    );
                }
            }
            PersonaCommands::Create {
                name,
                description,
                image_url,
            } => {
                let persona = store
                    .create_persona(cli.user, &name, &description, &image_url)
                    .await?;
                println!("✨ Created persona #{} {}", persona.id, persona.name);
            }
        },
    }

    Ok(())
}
