//! Sales aggregation: many CSV rows per company reduced to one [`SalesSummary`].

use std::collections::BTreeMap;

use tracing::{debug, warn};

use deckgen_shared::{Record, RegionSummary, Result, SalesSummary};

pub const COMPANY: &str = "Company";
pub const REGION: &str = "Region";
pub const TOTAL_SALES: &str = "Total Sales";
pub const NEW_CLIENTS: &str = "New Clients";
pub const CHURN_RATE: &str = "Client Churn Rate";
pub const SATISFACTION: &str = "Customer Satisfaction";
pub const GROWTH: &str = "Growth vs Last Quarter";
pub const MARKETING_SPEND: &str = "Marketing Spend";
pub const NOTABLE_EVENTS: &str = "Notable Events";
pub const PRODUCT_A: &str = "Product A Sales";
pub const PRODUCT_B: &str = "Product B Sales";
pub const PRODUCT_C: &str = "Product C Sales";
pub const TOP_SALES_REP: &str = "Top Sales Rep";

/// Columns a sales file must have; every other column is optional.
pub const REQUIRED_COLUMNS: [&str; 2] = [COMPANY, REGION];

/// Running mean that ignores blank cells.
#[derive(Debug, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Group rows by company and aggregate each group.
///
/// Companies come out sorted by name; regions keep their first-appearance
/// order within the company. Rows without a company are skipped. A
/// non-numeric value in a numeric column fails the whole load.
pub fn summarize_sales(records: &[Record]) -> Result<Vec<SalesSummary>> {
    let mut groups: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        let company = record.text(COMPANY);
        if company.is_empty() {
            warn!(row = index + 1, "sales row has no company, skipping");
            continue;
        }
        groups.entry(company).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(company, rows)| summarize_company(company, &rows))
        .collect()
}

fn summarize_company(company: &str, rows: &[&Record]) -> Result<SalesSummary> {
    let mut summary = SalesSummary {
        company: company.to_string(),
        ..Default::default()
    };
    let mut churn = Mean::default();
    let mut satisfaction = Mean::default();
    let mut growth = Mean::default();

    for row in rows {
        let sales = row.number(TOTAL_SALES)?.unwrap_or(0.0);
        let a = row.number(PRODUCT_A)?.unwrap_or(0.0);
        let b = row.number(PRODUCT_B)?.unwrap_or(0.0);
        let c = row.number(PRODUCT_C)?.unwrap_or(0.0);

        summary.total_sales += sales;
        summary.total_new_clients += row.number(NEW_CLIENTS)?.unwrap_or(0.0);
        summary.marketing_spend += row.number(MARKETING_SPEND)?.unwrap_or(0.0);
        churn.push(row.number(CHURN_RATE)?);
        satisfaction.push(row.number(SATISFACTION)?);
        growth.push(row.number(GROWTH)?);

        let event = row.text(NOTABLE_EVENTS);
        if !event.is_empty() && !summary.notable_events.iter().any(|e| e == event) {
            summary.notable_events.push(event.to_string());
        }

        let region_name = row.text(REGION);
        let region = match summary
            .regions
            .iter()
            .position(|r| r.region == region_name)
        {
            Some(i) => &mut summary.regions[i],
            None => {
                summary.regions.push(RegionSummary {
                    region: region_name.to_string(),
                    top_sales_rep: row.text(TOP_SALES_REP).to_string(),
                    new_clients: row.text(NEW_CLIENTS).to_string(),
                    ..Default::default()
                });
                let last = summary.regions.len() - 1;
                &mut summary.regions[last]
            }
        };
        region.total_sales += sales;
        region.product_a += a;
        region.product_b += b;
        region.product_c += c;
    }

    summary.mean_churn = churn.value();
    summary.mean_satisfaction = satisfaction.value();
    summary.mean_growth = growth.value();

    debug!(
        company,
        rows = rows.len(),
        regions = summary.regions.len(),
        total_sales = summary.total_sales,
        "company aggregated"
    );

    Ok(summary)
}
