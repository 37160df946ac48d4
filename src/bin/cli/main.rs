use alcoparty_server::{
    app::{config_from_env, AppBuilder, RepositoryBackend, StorageBackend},
    domain::{
        models::{CreateEventRequest, EventType, PageRequest, PhotoPayload},
        value_objects::{AlcoholicId, EventId, InvitationLink, PhotoId},
    },
    ports::services::EventService,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "alcoparty-cli")]
#[command(about = "Administrative CLI for events and their photos", long_about = None)]
struct Cli {
    /// Acting user
    #[arg(long = "as", env = "ALCOPARTY_USER", global = true)]
    acting_user: Option<AlcoholicId>,

    /// Override the metadata backend from the environment
    #[arg(long, value_enum, global = true)]
    repository: Option<RepositoryKind>,

    /// PostgreSQL connection string, used with `--repository database`
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum RepositoryKind {
    Memory,
    Database,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an event; the first image becomes the main photo
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        info: String,
        #[arg(long, default_value = "")]
        location: String,
        /// PUBLIC or PRIVATE
        #[arg(long = "type", default_value = "PUBLIC")]
        event_type: EventType,
        /// RFC 3339 start time
        #[arg(long)]
        start: DateTime<Utc>,
        /// RFC 3339 end time
        #[arg(long)]
        end: DateTime<Utc>,
        /// Users to add as participants
        #[arg(long = "invite")]
        invited: Vec<AlcoholicId>,
        /// Image files to attach
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },

    /// Join an event by id
    Join { event_id: EventId },

    /// Join an event through its invitation link
    JoinLink { link: InvitationLink },

    /// Leave an event
    Leave { event_id: EventId },

    /// Delete an event you created
    Disband { event_id: EventId },

    /// Show event details
    Show {
        event_id: Option<EventId>,
        /// Resolve an invitation link instead of an id
        #[arg(long, conflicts_with = "event_id")]
        link: Option<InvitationLink>,
    },

    /// List events
    List {
        /// Only events the acting user takes part in
        #[arg(long)]
        joined: bool,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = PageRequest::DEFAULT_PAGE_SIZE)]
        page_size: u32,
    },

    /// Attach images to an event
    AddPhoto {
        event_id: EventId,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Make a photo the main photo of an event
    SetMain { event_id: EventId, photo_id: PhotoId },

    /// Delete a photo from an event
    DeletePhoto { event_id: EventId, photo_id: PhotoId },

    /// Download a photo
    GetPhoto {
        photo_id: PhotoId,
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Guess the content type of an image from its file extension
fn content_type_for(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

async fn read_payloads(files: &[PathBuf]) -> Result<Vec<PhotoPayload>> {
    let mut payloads = Vec::with_capacity(files.len());
    for file in files {
        let data = tokio::fs::read(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;
        payloads.push(PhotoPayload {
            content_type: content_type_for(file).map(str::to_string),
            data: data.into(),
        });
    }
    Ok(payloads)
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = config_from_env().context("Invalid configuration")?;
    match cli.repository {
        Some(RepositoryKind::Memory) => config.repository_backend = RepositoryBackend::InMemory,
        Some(RepositoryKind::Database) => {
            config.repository_backend = RepositoryBackend::Database {
                connection_string: cli
                    .database_url
                    .clone()
                    .context("--database-url is required for the database backend")?,
                max_connections: 2,
            }
        }
        None => {}
    }
    if matches!(config.repository_backend, RepositoryBackend::InMemory)
        || matches!(config.storage_backend, StorageBackend::InMemory)
    {
        tracing::warn!("Running with in-memory storage, nothing will be persisted");
    }

    let app = AppBuilder::new()
        .with_config(config)
        .build()
        .await
        .context("Failed to build application")?;
    let service = &app.event_service;
    let user = || cli.acting_user.context("--as <user id> is required");

    match cli.command {
        Commands::Create {
            title,
            info,
            location,
            event_type,
            start,
            end,
            invited,
            images,
        } => {
            let request = CreateEventRequest {
                title,
                info,
                event_type,
                location,
                start_time: start,
                end_time: end,
                invited: invited.into_iter().collect::<BTreeSet<_>>(),
            };
            let payloads = read_payloads(&images).await?;
            let event_id = service.create(request, user()?, payloads).await?;
            print_json(&json!({ "event_id": event_id }))?;
        }
        Commands::Join { event_id } => {
            let membership = service.join(event_id, user()?).await?;
            print_json(&membership)?;
        }
        Commands::JoinLink { link } => {
            let membership = service.join_by_invitation(link, user()?).await?;
            print_json(&membership)?;
        }
        Commands::Leave { event_id } => {
            service.leave(event_id, user()?).await?;
            print_json(&json!({ "left": event_id }))?;
        }
        Commands::Disband { event_id } => {
            service.disband(event_id, user()?).await?;
            print_json(&json!({ "disbanded": event_id }))?;
        }
        Commands::Show { event_id, link } => {
            let details = match (event_id, link) {
                (_, Some(link)) => service.get_event_by_invitation(link).await?,
                (Some(event_id), None) => service.get_event(event_id, user()?).await?,
                (None, None) => anyhow::bail!("either an event id or --link is required"),
            };
            print_json(&details)?;
        }
        Commands::List {
            joined,
            page,
            page_size,
        } => {
            let request = PageRequest::new(page, page_size);
            let events = if joined {
                service.list_events_joined_by(user()?, request).await?
            } else {
                service.list_events(user()?, request).await?
            };
            print_json(&events)?;
        }
        Commands::AddPhoto { event_id, files } => {
            let payloads = read_payloads(&files).await?;
            let photo_ids = service.add_photos(event_id, user()?, payloads).await?;
            print_json(&json!({ "photo_ids": photo_ids }))?;
        }
        Commands::SetMain { event_id, photo_id } => {
            let event = service.set_main_photo(event_id, photo_id, user()?).await?;
            print_json(&event)?;
        }
        Commands::DeletePhoto { event_id, photo_id } => {
            service.delete_photo(event_id, photo_id, user()?).await?;
            print_json(&json!({ "deleted": photo_id }))?;
        }
        Commands::GetPhoto { photo_id, output } => {
            let content = service.get_photo(photo_id).await?;
            tokio::fs::write(&output, &content.data)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            print_json(&json!({
                "photo_id": content.photo_id,
                "content_type": content.content_type,
                "size": content.data.len(),
                "output": output,
            }))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_command() {
        let cli = Cli::try_parse_from([
            "alcoparty-cli",
            "--as",
            "550e8400-e29b-41d4-a716-446655440000",
            "create",
            "--title",
            "Rooftop",
            "--type",
            "private",
            "--start",
            "2030-01-01T18:00:00Z",
            "--end",
            "2030-01-02T02:00:00Z",
            "--image",
            "cover.jpg",
        ])
        .unwrap();

        assert!(cli.acting_user.is_some());
        match cli.command {
            Commands::Create {
                event_type, images, ..
            } => {
                assert_eq!(event_type, EventType::Private);
                assert_eq!(images, vec![PathBuf::from("cover.jpg")]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(content_type_for(Path::new("a.png")), Some("image/png"));
        assert_eq!(content_type_for(Path::new("noext")), None);
    }
}
