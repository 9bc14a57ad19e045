use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use eddy::app::AppContext;
use eddy::cli::{commands, Cli, Commands, FeedAction, FilterAction, ItemAction};
use eddy::config::Config;
use eddy::domain::FeedEdit;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Feed { action } => match action {
            FeedAction::Add { name, url, folder } => {
                commands::add_feed(&ctx, &name, &url, &folder).await?;
            }
            FeedAction::Edit {
                name,
                rename,
                url,
                folder,
            } => {
                let edit = FeedEdit {
                    name: rename,
                    url,
                    folder,
                };
                commands::edit_feed(&ctx, &name, edit).await?;
            }
            FeedAction::Remove { name } => {
                commands::remove_feed(&ctx, &name).await?;
            }
            FeedAction::List => {
                commands::list_feeds(&ctx).await?;
            }
        },
        Commands::Filter { action } => match action {
            FilterAction::Add { name, args } => {
                commands::add_filter(&ctx, &name, args).await?;
            }
            FilterAction::Edit { name, rename, args } => {
                commands::edit_filter(&ctx, &name, rename, args).await?;
            }
            FilterAction::Remove { name } => {
                commands::remove_filter(&ctx, &name).await?;
            }
            FilterAction::List => {
                commands::list_filters(&ctx).await?;
            }
            FilterAction::Show { name } => {
                commands::show_filter(&ctx, &name).await?;
            }
        },
        Commands::Item { action } => match action {
            ItemAction::Read { id } => commands::set_read(&ctx, &id, true).await?,
            ItemAction::Unread { id } => commands::set_read(&ctx, &id, false).await?,
            ItemAction::Favorite { id } => commands::set_favorite(&ctx, &id, true).await?,
            ItemAction::Unfavorite { id } => commands::set_favorite(&ctx, &id, false).await?,
            ItemAction::Tags { id, tags } => commands::set_tags(&ctx, &id, tags).await?,
            ItemAction::Open { id } => commands::open_item(&ctx, &id).await?,
        },
        Commands::Items { unread } => {
            commands::list_items(&ctx, unread).await?;
        }
        Commands::Refresh => {
            commands::refresh(&ctx).await?;
        }
        Commands::Interval { minutes } => {
            commands::interval(&ctx, minutes).await?;
        }
        Commands::Watch { no_initial_refresh } => {
            let refresh_on_start = ctx.config.scheduler.refresh_on_start && !no_initial_refresh;
            commands::watch(&ctx, refresh_on_start).await?;
        }
    }

    Ok(())
}
