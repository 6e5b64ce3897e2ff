pub mod client;
pub mod eastmoney;
pub mod error;
pub mod jsonp;
pub mod sina;
pub mod symbols;
pub mod valuation;

pub use client::MarketClient;
pub use error::ConnectorError;
