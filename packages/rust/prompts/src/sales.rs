//! Markdown sales report prompt with tables and chart directives.

use std::fmt::Write;

use deckgen_shared::SalesSummary;

use crate::format::{format_count, format_currency, format_decimal, format_percent};

/// One slide per report section.
pub const SALES_SECTION_COUNT: u32 = 5;

/// Render the report prompt for one company.
pub fn sales_prompt(summary: &SalesSummary) -> String {
    let mut p = String::new();

    // `write!` into a String cannot fail.
    let _ = write!(
        p,
        "\n## Sales Report for {company}\n\
         \n\
         ### 1. Executive Summary\n\
         - Total sales: **{total}**\n\
         - Average client churn: **{churn}**\n\
         - Customer satisfaction: **{satisfaction}/10**\n\
         - Notable events: _{events}_\n\
         \n\
         ### 2. Regional Performance\n\
         **Bar Chart:** Regional Total Sales\n\
         \n\
         | Region | Sales |\n\
         |---|---|\n",
        company = summary.company,
        total = format_currency(summary.total_sales),
        churn = format_percent(summary.mean_churn),
        satisfaction = format_decimal(summary.mean_satisfaction),
        events = summary.notable_events.join("; "),
    );
    for r in &summary.regions {
        let _ = writeln!(p, "| {} | {} |", r.region, format_currency(r.total_sales));
    }

    p.push_str(
        "\n\n### 3. Product Performance\n\
         **Bar Chart:** Sales by Product per Region\n\
         \n\
         | Region | Product A | Product B | Product C |\n\
         |---|---|---|---|\n",
    );
    for r in &summary.regions {
        let _ = writeln!(
            p,
            "| {} | {} | {} | {} |",
            r.region,
            format_currency(r.product_a),
            format_currency(r.product_b),
            format_currency(r.product_c),
        );
    }

    let _ = write!(
        p,
        "\n\n### 4. Key Metrics & Trends\n\
         - Aggregate new clients this month: **{clients}**\n\
         - Mean growth vs last quarter: **{growth}**\n\
         - Total marketing spend: **{marketing}**\n\
         \n\
         ### 5. Top Performers\n\
         | Region | Top Sales Rep | New Clients |\n\
         |---|---|---|\n",
        clients = format_count(summary.total_new_clients),
        growth = format_percent(summary.mean_growth),
        marketing = format_currency(summary.marketing_spend),
    );
    for r in &summary.regions {
        let _ = writeln!(p, "| {} | {} | {} |", r.region, r.top_sales_rep, r.new_clients);
    }

    let _ = write!(
        p,
        "\n\n---\n\
         \n\
         **Instructions:**\n\
         - Create 1 slide per section ({SALES_SECTION_COUNT} total).\n\
         - Use clean, professional visuals.\n\
         - For charts, display the specified bar chart with given data.\n\
         - Use summary bullet points before every chart or table for clarity.\n\
         **Do exactly as in said here.**\n"
    );

    p
}
