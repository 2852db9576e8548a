//! Announcement message rendering
//!
//! Produces the plain formatted text posted through webhooks. Fixed section
//! layout: heading line, next-reset timestamp pair (absolute + relative),
//! optional bulleted item list capped with an overflow note, a database link
//! line, and a subtext disclaimer footer.

use crate::model::{AnnouncementItem, Watermark};
use serde::{Deserialize, Serialize};

/// Layout and deep-link settings for the rendered announcement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageStyle {
    /// Heading line, rendered bold
    pub heading: String,

    /// Base URL of the companion database site
    pub base_url: String,

    /// Language segment of database links
    pub lang: String,

    /// Path of the database overview page linked in the footer
    pub overview_path: String,

    /// Maximum number of items listed before the overflow note
    pub item_cap: usize,
}

impl Default for MessageStyle {
    fn default() -> Self {
        Self {
            heading: "This Week's Deep Desert items".to_string(),
            base_url: "https://database.example.com".to_string(),
            lang: "en".to_string(),
            overview_path: "deep-desert".to_string(),
            item_cap: 10,
        }
    }
}

impl MessageStyle {
    /// Deep link for one announced item
    fn item_url(&self, item: &AnnouncementItem) -> String {
        match &item.category_id {
            Some(category) => format!("{}/{}/{}/{}", self.base_url, self.lang, category, item.id),
            None => format!("{}/{}/{}", self.base_url, self.lang, item.id),
        }
    }

    /// Link to the database overview page for this rotation
    fn overview_url(&self) -> String {
        format!("{}/{}/{}", self.base_url, self.lang, self.overview_path)
    }
}

/// Markdown hyperlink with link-embed suppression
fn hyperlink(label: &str, url: &str) -> String {
    format!("[{label}](<{url}>)")
}

/// Render the full announcement message
///
/// `next_reset` feeds the platform timestamp markup, which displays in each
/// reader's local timezone; hence the footer disclaimer.
pub fn render(style: &MessageStyle, next_reset: Watermark, items: &[AnnouncementItem]) -> String {
    let mut lines: Vec<String> = vec![
        format!("**{}**", style.heading),
        String::new(),
        format!(
            "Next Reset: <t:{ts}:F> (<t:{ts}:R>)",
            ts = next_reset.as_secs()
        ),
    ];

    // Items without a name or id have no usable link; leave them out
    let linkable: Vec<&AnnouncementItem> = items
        .iter()
        .filter(|item| !item.name.is_empty() && !item.id.is_empty())
        .collect();

    if linkable.is_empty() {
        lines.push(String::new());
        lines.push("No unique items available this week.".to_string());
    } else {
        lines.push(String::new());
        for item in linkable.iter().take(style.item_cap) {
            lines.push(format!("- {}", hyperlink(&item.name, &style.item_url(item))));
        }
        if linkable.len() > style.item_cap {
            lines.push(format!("- …and {} more", linkable.len() - style.item_cap));
        }
        lines.push(String::new());
        lines.push(format!(
            "To see their locations, drop counts and probabilities, you should consider \
             navigating to the {}.",
            hyperlink("full database", &style.overview_url())
        ));
    }

    lines.push(String::new());
    lines.push("-# The times are in your local timezone.".to_string());

    lines.join("\n")
}
