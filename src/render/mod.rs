//! Output surfaces: terse/verbose text, aligned tables, HTML charts.

pub mod html;
pub mod table;
pub mod text;

pub use html::{build_chart_data, render_html_report};
