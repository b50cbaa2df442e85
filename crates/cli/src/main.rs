//! `sonique` -- terminal client for the Sonique marketplace.
//!
//! Drives the same view-models a graphical shell would: catalog lists,
//! likes, downloads, the edit form, moderation and admin dashboards.
//!
//! # Environment variables
//!
//! | Variable                      | Required | Default                 | Description                     |
//! |-------------------------------|----------|-------------------------|---------------------------------|
//! | `SONIQUE_API_URL`             | no       | `http://localhost:8000` | Backend base URL                |
//! | `SONIQUE_API_TOKEN`           | no       | --                      | Bearer token; anonymous if unset |
//! | `SONIQUE_DOWNLOAD_DIR`        | no       | `.`                     | Where downloads are written     |
//! | `SONIQUE_SEARCH_DEBOUNCE_MS`  | no       | `400`                   | Search debounce window          |
//! | `SONIQUE_DOWNLOAD_RESET_SECS` | no       | `3`                     | Completed download display time |
//! | `SONIQUE_TOAST_HISTORY`       | no       | `50`                    | Toasts kept in memory           |
//!
//! `RUST_LOG` controls log output (default `sonique=info`).

mod commands;
mod prompt;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sonique_app::confirm::{AutoConfirm, Confirmer};
use sonique_app::{AppConfig, AppContext};
use sonique_client::{ClientConfig, MarketplaceApi};
use sonique_core::moderation::BatchAction;
use sonique_core::types::DbId;

use crate::commands::Runner;
use crate::prompt::StdinConfirmer;

#[derive(Parser)]
#[command(name = "sonique", version)]
#[command(about = "Browse and administer a Sonique marketplace from the terminal")]
struct Cli {
    /// Backend base URL, overrides SONIQUE_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token, overrides SONIQUE_API_TOKEN
    #[arg(long, global = true)]
    token: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List catalog sounds
    Sounds(ListArgs),
    /// List the sounds of one category
    Category {
        id: DbId,
        #[command(flatten)]
        list: ListArgs,
    },
    /// List active categories
    Categories,
    /// Toggle a like on a sound or clip
    Like {
        id: DbId,
        #[arg(long)]
        clip: bool,
    },
    /// Download a sound
    Download {
        id: DbId,
        /// File name to save under (default: the sound title)
        #[arg(long)]
        title: Option<String>,
        /// Directory to write into, overrides SONIQUE_DOWNLOAD_DIR
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Edit one of your sounds
    Edit(EditArgs),
    /// List events, or competitions with --competitions
    Events {
        #[arg(long)]
        competitions: bool,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Register for an event
    Register { id: DbId },
    /// Sound and clip moderation
    Moderation {
        #[command(subcommand)]
        command: ModerationCommand,
    },
    /// Categories, payments, analytics and certifications
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Args)]
pub(crate) struct ListArgs {
    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,
    /// Sort key: latest, popular, price_asc, price_desc, title
    #[arg(long)]
    pub sort: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// Number of pages to fetch
    #[arg(long, default_value_t = 1)]
    pub pages: u32,
}

#[derive(Args)]
pub(crate) struct EditArgs {
    pub id: DbId,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub category_id: Option<DbId>,
    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
    /// Price in XAF; an empty value clears it
    #[arg(long)]
    pub price: Option<String>,
    /// Mark the sound free
    #[arg(long, conflicts_with = "paid")]
    pub free: bool,
    /// Mark the sound paid
    #[arg(long)]
    pub paid: bool,
}

#[derive(Subcommand)]
enum ModerationCommand {
    /// Sounds awaiting moderation (or --status all)
    Sounds {
        #[arg(long, default_value = "pending")]
        status: String,
    },
    Approve { id: DbId },
    Reject {
        id: DbId,
        #[arg(long)]
        reason: String,
    },
    Delete { id: DbId },
    /// Clips awaiting moderation (or --status all)
    Clips {
        #[arg(long, default_value = "pending")]
        status: String,
    },
    ApproveClip { id: DbId },
    RejectClip {
        id: DbId,
        #[arg(long)]
        reason: String,
    },
    /// Toggle the featured flag of a clip
    Feature { id: DbId },
    /// Apply one action to several clips
    Batch {
        #[arg(value_enum)]
        action: BatchArg,
        #[arg(required = true)]
        ids: Vec<DbId>,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BatchArg {
    Approve,
    Reject,
    Delete,
    Feature,
    Unfeature,
}

impl From<BatchArg> for BatchAction {
    fn from(arg: BatchArg) -> Self {
        match arg {
            BatchArg::Approve => BatchAction::Approve,
            BatchArg::Reject => BatchAction::Reject,
            BatchArg::Delete => BatchAction::Delete,
            BatchArg::Feature => BatchAction::Feature,
            BatchArg::Unfeature => BatchAction::Unfeature,
        }
    }
}

#[derive(Args)]
pub(crate) struct CategoryArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "#1DB954")]
    pub color: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub icon: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub sort_order: i32,
    #[arg(long)]
    pub inactive: bool,
    /// Cover image (png, jpg or webp)
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// All categories, including inactive ones
    Categories,
    CreateCategory(CategoryArgs),
    UpdateCategory {
        id: DbId,
        #[command(flatten)]
        fields: CategoryArgs,
    },
    DeleteCategory { id: DbId },
    ToggleCategory { id: DbId },
    /// Payment stats, transactions and artist revenues
    Payments {
        #[arg(long)]
        status: Option<String>,
    },
    ApprovePayment { id: DbId },
    RejectPayment {
        id: DbId,
        #[arg(long)]
        reason: String,
    },
    Refund { id: DbId },
    /// Platform analytics
    Analytics,
    /// Certification statistics
    Certifications,
    /// Show a sound's certificate, or save it as PDF with --pdf
    Certificate {
        sound_id: DbId,
        #[arg(long)]
        pdf: bool,
        #[arg(long)]
        title: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sonique=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(token) = cli.token {
        config.api_token = Some(token);
    }
    if let Command::Download {
        output: Some(dir), ..
    } = &cli.command
    {
        config.download_dir = dir.clone();
    }

    let api = Arc::new(MarketplaceApi::new(&ClientConfig::new(&config.api_url)?)?);
    tracing::debug!(api_url = %api.base_url(), authenticated = config.api_token.is_some(), "Starting sonique");

    let confirmer: Arc<dyn Confirmer> = if cli.yes {
        Arc::new(AutoConfirm(true))
    } else {
        Arc::new(StdinConfirmer)
    };
    let ctx = AppContext::new(config).with_confirmer(confirmer);
    let runner = Runner::new(ctx, api, cli.json);

    let result = match cli.command {
        Command::Sounds(list) => runner.sounds(None, list).await,
        Command::Category { id, list } => runner.sounds(Some(id), list).await,
        Command::Categories => runner.categories().await,
        Command::Like { id, clip } => runner.like(id, clip).await,
        Command::Download { id, title, .. } => runner.download(id, title).await,
        Command::Edit(args) => runner.edit(args).await,
        Command::Events {
            competitions,
            pages,
        } => runner.events(competitions, pages).await,
        Command::Register { id } => runner.register(id).await,
        Command::Moderation { command } => match command {
            ModerationCommand::Sounds { status } => runner.moderation_sounds(status).await,
            ModerationCommand::Approve { id } => runner.approve_sound(id).await,
            ModerationCommand::Reject { id, reason } => runner.reject_sound(id, reason).await,
            ModerationCommand::Delete { id } => runner.delete_sound(id).await,
            ModerationCommand::Clips { status } => runner.moderation_clips(status).await,
            ModerationCommand::ApproveClip { id } => runner.approve_clip(id).await,
            ModerationCommand::RejectClip { id, reason } => runner.reject_clip(id, reason).await,
            ModerationCommand::Feature { id } => runner.feature_clip(id).await,
            ModerationCommand::Batch {
                action,
                ids,
                reason,
            } => runner.clip_batch(action.into(), ids, reason).await,
        },
        Command::Admin { command } => match command {
            AdminCommand::Categories => runner.admin_categories().await,
            AdminCommand::CreateCategory(fields) => runner.save_category(None, fields).await,
            AdminCommand::UpdateCategory { id, fields } => runner.save_category(Some(id), fields).await,
            AdminCommand::DeleteCategory { id } => runner.delete_category(id).await,
            AdminCommand::ToggleCategory { id } => runner.toggle_category(id).await,
            AdminCommand::Payments { status } => runner.payments(status).await,
            AdminCommand::ApprovePayment { id } => runner.approve_payment(id).await,
            AdminCommand::RejectPayment { id, reason } => runner.reject_payment(id, reason).await,
            AdminCommand::Refund { id } => runner.refund(id).await,
            AdminCommand::Analytics => runner.analytics().await,
            AdminCommand::Certifications => runner.certifications().await,
            AdminCommand::Certificate {
                sound_id,
                pdf,
                title,
            } => runner.certificate(sound_id, pdf, title).await,
        },
    };

    runner.flush_toasts().await;
    result
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn batch_parses_ids_and_reason() {
        let cli = Cli::try_parse_from([
            "sonique", "moderation", "batch", "reject", "3", "4", "--reason", "Doublon", "--yes",
        ])
        .unwrap();
        assert!(cli.yes);
        match cli.command {
            Command::Moderation {
                command:
                    ModerationCommand::Batch {
                        action: BatchArg::Reject,
                        ids,
                        reason,
                    },
            } => {
                assert_eq!(ids, vec![3, 4]);
                assert_eq!(reason.as_deref(), Some("Doublon"));
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn free_and_paid_conflict() {
        assert!(Cli::try_parse_from(["sonique", "edit", "1", "--free", "--paid"]).is_err());
        assert!(Cli::try_parse_from(["sonique", "edit", "1", "--paid", "--price", "500"]).is_ok());
    }
}
