//! Looks up vehicle data by registration number or VIN through country specific services.

pub mod biluppgifter;
pub mod config;
pub mod dispatch;
pub mod nrplade;
pub mod registry;
pub mod service;

pub use dispatch::{build_services, lookup, Identifier};
pub use registry::ServiceManager;
pub use service::{AutoService, Error};
pub use shared::data::{Country, HeaderSet, ServiceConfig, Vehicle};
