//! Certificates of appreciation for GitHub users.
//!
//! A [`CertificateGenerator`] looks a profile up through a
//! [`ProfileSource`], lays the certificate out as a [`CertificateView`] and,
//! on request, draws it with a [`Rasterizer`] and saves it as
//! `{username}_certificate.png`.

pub mod config;
mod errors;
pub mod export;
pub mod github;
pub mod loader;
pub mod profile;
pub mod raster;
pub mod render;
pub mod widget;

pub use config::Config;
pub use errors::{CertError, ExportError, FetchError, Result};
pub use github::{GithubClient, ImageSource, ProfileSource};
pub use loader::{LoadOutcome, LoadState, ProfileLoader, ProfileState};
pub use profile::ProfileRecord;
pub use raster::{ImageBlob, Rasterizer, SvgRasterizer};
pub use render::{CertificateView, ProfileBlock, Template};
pub use widget::{CertificateGenerator, GithubCertificateGenerator};
