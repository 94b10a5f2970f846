pub mod analyzers;
pub mod config;
pub mod fetch;
pub mod housing;
pub mod output;
pub mod parser;
pub mod stations;
pub mod timeseries;
pub mod viz;
