//! Dashboard counts for the seller.
//!
//! ```bash
//! ximy-cli stats
//! ```

use ximy_storefront::db::{CatalogStats, StatsRepository};

use super::{CommandError, connect};

/// Print catalog, view and click counts.
pub async fn show() -> Result<(), CommandError> {
    let pool = connect().await?;
    let stats = StatsRepository::new(&pool).catalog().await?;

    #[allow(clippy::print_stdout)]
    {
        print!("{}", render(&stats));
    }
    Ok(())
}

fn render(stats: &CatalogStats) -> String {
    [
        ("Total items", stats.total_items),
        ("Available", stats.available_items),
        ("Sold", stats.sold_items),
        ("Total views", stats.item_views),
        ("WhatsApp clicks", stats.whatsapp_clicks),
    ]
    .iter()
    .map(|(label, count)| format!("{label:<16} {count:>6}\n"))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_every_count() {
        let stats = CatalogStats {
            total_items: 12,
            available_items: 7,
            sold_items: 5,
            item_views: 340,
            whatsapp_clicks: 41,
        };

        let text = render(&stats);

        assert_eq!(text.lines().count(), 5);
        assert!(text.starts_with("Total items          12\n"));
        assert!(text.contains("Sold                  5\n"));
        assert!(text.ends_with("WhatsApp clicks      41\n"));
    }
}
