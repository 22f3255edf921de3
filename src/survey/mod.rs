//! Per-run survey results and their tabular output form.

pub mod table;
