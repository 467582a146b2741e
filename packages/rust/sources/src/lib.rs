//! Input sources for deckgen.
//!
//! This crate provides:
//! - [`tabular`] — CSV files as [`Record`](deckgen_shared::Record)s
//! - [`sales`] — per-company aggregation of sales rows
//! - [`web`] — best-effort company profile from a landing page

pub mod sales;
pub mod tabular;
pub mod web;

pub use sales::{REQUIRED_COLUMNS as SALES_REQUIRED_COLUMNS, summarize_sales};
pub use tabular::{Table, read_table, read_table_from};
pub use web::{FetchOptions, extract_profile, fetch_company_profile, normalize_url};
