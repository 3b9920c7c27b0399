// Chart configuration mini-language

pub mod ast;
pub mod chart;
pub mod labels;
pub mod lexer;
pub mod pipeline;

// Public API re-exports
pub use ast::{ChartCommand, ChartSpec, Labels};
pub use pipeline::parse_chart_spec;
