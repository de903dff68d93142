//! Minimal HTML rendering for the dashboard view.

use std::fmt::Write as _;

use tickboard_core::BasketEntry;

use crate::config::IndexLabel;

pub fn dashboard_page(world_indices: &[IndexLabel], entries: &[BasketEntry]) -> String {
    let mut page = String::with_capacity(4096);
    page.push_str(
        "<!DOCTYPE html>\n<html lang=\"pt\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>tickboard</title>\n</head>\n<body>\n<h1>tickboard</h1>\n",
    );

    page.push_str("<h2>World indices</h2>\n<ul class=\"indices\">\n");
    for index in world_indices {
        let _ = writeln!(
            page,
            "<li>{} <span class=\"symbol\">{}</span></li>",
            escape(&index.label),
            escape(&index.symbol)
        );
    }
    page.push_str("</ul>\n");

    page.push_str(
        "<h2>Regional basket</h2>\n<table class=\"basket\">\n\
         <tr><th>Symbol</th><th>Name</th><th>Last</th><th>Prev close</th><th>Refreshed</th></tr>\n",
    );
    for entry in entries {
        match entry {
            BasketEntry::Ok { summary, .. } => {
                let _ = writeln!(
                    page,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape(&summary.symbol),
                    escape(&summary.name),
                    format_price(summary.last_price),
                    format_price(summary.previous_close),
                    summary
                        .last_refresh
                        .map(|ts| ts.format_rfc3339())
                        .unwrap_or_else(|| String::from("—")),
                );
            }
            BasketEntry::Failed { symbol, error } => {
                let _ = writeln!(
                    page,
                    "<tr class=\"failed\"><td>{}</td><td colspan=\"4\">{}</td></tr>",
                    escape(symbol),
                    escape(error),
                );
            }
        }
    }
    page.push_str("</table>\n</body>\n</html>\n");
    page
}

fn format_price(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.2}"),
        None => String::from("—"),
    }
}

fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
