//! Administrative core for a military training unit: conduct scoring,
//! concept evaluation, FAIA tracking, transport allowance, schedule
//! upkeep, and document generation over a loosely typed record store.

pub mod avaliacao;
pub mod config;
pub mod domain;
pub mod error;
pub mod faia;
pub mod params;
pub mod pdf;
pub mod permissoes;
pub mod programacao;
pub mod reports;
pub mod scoring;
pub mod store;
pub mod telemetry;
pub mod transporte;
