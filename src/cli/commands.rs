use crate::app::{AppContext, EddyError, Result};
use crate::cli::FilterArgs;
use crate::domain::{FeedDefinition, FeedEdit, FeedItem, FilterDefinition};
use crate::scheduler::Scheduler;

const ID_WIDTH: usize = 10;

pub async fn add_feed(ctx: &AppContext, name: &str, url: &str, folder: &str) -> Result<()> {
    ctx.reader
        .add_feed(FeedDefinition::new(name, url, folder))
        .await?;
    println!("Added feed: {} ({})", name, url);
    Ok(())
}

pub async fn edit_feed(ctx: &AppContext, name: &str, edit: FeedEdit) -> Result<()> {
    let def = ctx.reader.edit_feed(name, edit).await?;
    println!("Updated feed: {} ({})", def.name, def.url);
    Ok(())
}

pub async fn remove_feed(ctx: &AppContext, name: &str) -> Result<()> {
    ctx.reader.remove_feed(name).await?;
    println!("Removed feed: {}", name);
    Ok(())
}

pub async fn list_feeds(ctx: &AppContext) -> Result<()> {
    let feeds = ctx.reader.feeds().await;

    if feeds.is_empty() {
        println!("No feeds");
        return Ok(());
    }

    for feed in feeds {
        let content = ctx.reader.content(&feed.name).await;
        let unread = content.as_ref().map(|c| c.unread_count()).unwrap_or(0);
        let folder = if feed.folder.is_empty() {
            String::new()
        } else {
            format!(" [{}]", feed.folder)
        };
        println!("{}{} ({} unread)\n  {}", feed.name, folder, unread, feed.url);
    }

    Ok(())
}

pub async fn add_filter(ctx: &AppContext, name: &str, args: FilterArgs) -> Result<()> {
    let def = FilterDefinition::new(name, args.filter_type, args.content, args.sort);
    ctx.reader.add_filter(def).await?;
    println!("Added filtered folder: {}", name);
    Ok(())
}

pub async fn edit_filter(
    ctx: &AppContext,
    name: &str,
    rename: Option<String>,
    args: FilterArgs,
) -> Result<()> {
    let new_name = rename.unwrap_or_else(|| name.to_string());
    let def = FilterDefinition::new(&new_name, args.filter_type, args.content, args.sort);
    ctx.reader.edit_filter(name, def).await?;
    println!("Updated filtered folder: {}", new_name);
    Ok(())
}

pub async fn remove_filter(ctx: &AppContext, name: &str) -> Result<()> {
    ctx.reader.remove_filter(name).await?;
    println!("Removed filtered folder: {}", name);
    Ok(())
}

pub async fn list_filters(ctx: &AppContext) -> Result<()> {
    let views = ctx.reader.views().await;

    if views.is_empty() {
        println!("No filtered folders");
        return Ok(());
    }

    for view in views.iter() {
        let filter = &view.filter;
        println!(
            "{} ({} items)\n  {} {:?} {}",
            filter.name,
            view.items.len(),
            filter.filter_type,
            filter.filter_content,
            filter.sort_order
        );
    }

    Ok(())
}

pub async fn show_filter(ctx: &AppContext, name: &str) -> Result<()> {
    let view = ctx.reader.view(name).await?;

    if view.items.is_empty() {
        println!("No items");
        return Ok(());
    }

    for item in &view.items {
        print_item(item);
    }
    Ok(())
}

pub async fn list_items(ctx: &AppContext, unread_only: bool) -> Result<()> {
    let grouped = ctx.reader.grouped().await;

    if grouped.is_empty() {
        println!("No items");
        return Ok(());
    }

    for (folder, feeds) in grouped {
        if !folder.is_empty() {
            println!("{}/", folder);
        }
        for feed in feeds {
            println!("{} ({} unread)", feed.display_title(), feed.unread_count());
            for item in feed.items.iter().filter(|item| !unread_only || !item.read) {
                print_item(item);
            }
        }
    }

    Ok(())
}

pub async fn set_read(ctx: &AppContext, id: &str, read: bool) -> Result<()> {
    let item = ctx.reader.set_read(id, read).await?;
    print_item(&item);
    Ok(())
}

pub async fn set_favorite(ctx: &AppContext, id: &str, favorite: bool) -> Result<()> {
    let item = ctx.reader.set_favorite(id, favorite).await?;
    print_item(&item);
    Ok(())
}

pub async fn set_tags(ctx: &AppContext, id: &str, tags: Vec<String>) -> Result<()> {
    let item = ctx.reader.set_tags(id, tags).await?;
    print_item(&item);
    Ok(())
}

pub async fn open_item(ctx: &AppContext, id: &str) -> Result<()> {
    let item = ctx.reader.find_item(id).await?;
    if item.link.is_empty() {
        return Err(EddyError::Other(format!("{} has no link", item.display_title())));
    }

    open::that(&item.link)?;
    ctx.reader.set_read(id, true).await?;
    println!("Opened: {}", item.link);
    Ok(())
}

pub async fn refresh(ctx: &AppContext) -> Result<()> {
    let feeds = ctx.reader.feeds().await.len();
    if feeds == 0 {
        println!("No feeds to update");
        return Ok(());
    }

    println!("Updating {} feeds...", feeds);
    let report = ctx.reader.refresh().await?;

    for (name, error) in &report.failed {
        eprintln!("  Error updating {}: {}", name, error);
    }
    println!(
        "Update complete: {} new items, {} errors",
        report.new_items,
        report.failed.len()
    );
    Ok(())
}

pub async fn interval(ctx: &AppContext, minutes: Option<u64>) -> Result<()> {
    match minutes {
        Some(minutes) => {
            ctx.reader.set_update_interval(minutes).await?;
            println!("Refresh interval set to {}", describe_interval(minutes));
        }
        None => {
            let minutes = ctx.reader.update_time().await;
            println!("Refresh interval: {}", describe_interval(minutes));
        }
    }
    Ok(())
}

pub async fn watch(ctx: &AppContext, refresh_on_start: bool) -> Result<()> {
    println!("Watching feeds, press Ctrl-C to stop");
    let scheduler = Scheduler::new(ctx.reader.clone(), refresh_on_start);
    scheduler
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    Ok(())
}

fn describe_interval(minutes: u64) -> String {
    match minutes {
        0 => "disabled".to_string(),
        1 => "1 minute".to_string(),
        m => format!("{} minutes", m),
    }
}

fn print_item(item: &FeedItem) {
    let id = item.id();
    let marker = match (item.read, item.favorite) {
        (_, true) => "*",
        (false, false) => "●",
        (true, false) => " ",
    };
    let date = item
        .pub_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "          ".to_string());
    let tags = if item.tags.is_empty() {
        String::new()
    } else {
        let tags: Vec<_> = item.tags.iter().map(|t| format!("#{}", t)).collect();
        format!("  {}", tags.join(" "))
    };

    println!(
        "  {} {} {} {}{}",
        marker,
        &id[..ID_WIDTH],
        date,
        item.display_title(),
        tags
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_interval() {
        assert_eq!(describe_interval(0), "disabled");
        assert_eq!(describe_interval(1), "1 minute");
        assert_eq!(describe_interval(90), "90 minutes");
    }
}
