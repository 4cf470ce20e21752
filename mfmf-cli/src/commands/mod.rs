//! Command handlers -- one module per run mode

pub mod rules;
pub mod scan;
