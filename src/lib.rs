//! A small client for the KoboToolbox export API.
//!
//! Three operations are supported against the `exports/` endpoint of a Kobo
//! server: create a new export of an asset, list the asset's exports, and look
//! up the download URL of the most recent one.
//!
//! ## Quick start
//! - Configure the target via environment variables (`KOBO_USER`, `KOBO_PASSW`,
//!   `KOBO_ASSET`, `KOBO_URL`). Unset variables fall back to built-in defaults.
//! - Build a [`Client`] and call one of the operations.
//!
//! ```no_run
//! use anyhow::Result;
//! use kobo_export::{Client, ExportParams, ExportType};
//!
//! fn main() -> Result<()> {
//!     let client = Client::from_env()?;
//!     let params = ExportParams {
//!         export_type: ExportType::Xls,
//!         ..ExportParams::default()
//!     };
//!     let created = client.create_export(&params)?;
//!     println!("{}", created.status);
//!     println!("{}", client.latest_export_url()?);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

mod client;
mod config;
mod error;
mod export;
mod util;

pub use client::Client;
pub use config::{Config, ConfigOverrides};
pub use export::{
    CreatedExport, ExportList, ExportParams, ExportRecord, ExportType, UnsupportedExportType,
};
