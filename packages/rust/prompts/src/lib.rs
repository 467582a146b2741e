//! Prompt builders for the presentation service and the chat model.
//!
//! Every function here is pure: the same input always renders byte-identical
//! text. Layout on the generated slides follows the text shape, so the
//! templates and number formats are fixed.

pub mod format;
pub mod pitch;
pub mod sales;
pub mod student;

pub use format::{format_count, format_currency, format_decimal, format_percent, group_thousands};
pub use pitch::{default_outline, outline_prompt, pitch_prompt, questions_prompt, render_qa};
pub use sales::{SALES_SECTION_COUNT, sales_prompt};
pub use student::{NAME_COLUMN, student_prompt};
