//! Plain-text rendering of entries, views and facets.

use crate::seed::to_datetime;
use std::fmt::Write;
use tooldir_model::Entry;
use tooldir_query::{Facets, View};
use tooldir_types::ServerTimestamp;

/// `YYYY-MM-DD`, or `pending` for writes the store has not stamped.
pub fn format_date(created_at: Option<ServerTimestamp>) -> String {
    match created_at {
        None => "pending".to_string(),
        Some(ts) => to_datetime(ts)
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| ts.to_string()),
    }
}

fn format_rating(entry: &Entry) -> String {
    match entry.average_rating() {
        Some(avg) => format!("★ {avg:.1} ({})", entry.rating_count),
        None => "unrated".to_string(),
    }
}

pub fn render_entry(entry: &Entry) -> String {
    let pricing = entry.pricing.map_or("unknown pricing", |p| p.as_str());
    let category = if entry.category.is_empty() {
        "uncategorised"
    } else {
        &entry.category
    };

    let mut out = format!(
        "{}  [{} · {}]  {}  {}\n",
        entry.name,
        category,
        pricing,
        format_rating(entry),
        format_date(entry.created_at)
    );
    if !entry.description.is_empty() {
        let _ = writeln!(out, "    {}", entry.description);
    }
    if let Some(url) = &entry.website_url {
        let _ = writeln!(out, "    {url}");
    }
    if !entry.tags.is_empty() {
        let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
        let _ = writeln!(out, "    tags: {}", tags.join(", "));
    }
    out
}

pub fn render_view(view: &View) -> String {
    let mut out = String::new();
    for entry in &view.entries {
        out.push_str(&render_entry(entry));
    }
    if view.entries.is_empty() {
        out.push_str("No entries match.\n");
    }
    let _ = writeln!(out, "{} entries", view.summary);
    out
}

/// Categories and tags, each cut at `limit` with a count of the rest.
pub fn render_facets(facets: &Facets, limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Categories: {}", facets.visible_categories(limit).join(", "));
    let hidden_categories = facets.categories.len().saturating_sub(limit);
    if hidden_categories > 0 {
        let _ = writeln!(out, "  ... and {hidden_categories} more categories");
    }

    if facets.tags.is_empty() {
        out.push_str("Tags: none\n");
    } else {
        let _ = writeln!(out, "Tags: {}", facets.visible_tags(limit).join(", "));
    }
    let hidden_tags = facets.hidden_tag_count(limit);
    if hidden_tags > 0 {
        let _ = writeln!(out, "  ... and {hidden_tags} more tags");
    }
    out
}
