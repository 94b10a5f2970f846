mod client;

pub use client::CoOpsClient;
