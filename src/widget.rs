use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{Local, NaiveDate};
use log::{debug, warn};

use crate::config::Config;
use crate::errors::ExportError;
use crate::export::{certificate_filename, save_blob};
use crate::github::{GithubClient, ProfileSource};
use crate::loader::{LoadOutcome, ProfileLoader, ProfileState};
use crate::raster::{Rasterizer, SvgRasterizer};
use crate::render::{CertificateView, Template};
use crate::Result;

/// A certificate for one username: looks the profile up, lays the
/// certificate out and exports it as a PNG on request.
///
/// Every method takes `&self`, so the certificate can be rendered while a
/// lookup is still pending.
pub struct CertificateGenerator<S, R> {
    loader: ProfileLoader<S>,
    rasterizer: R,
    template: Template,
    mounted: Mutex<Option<CertificateView>>,
}

/// The generator wired to the GitHub API and the `resvg` rasterizer.
pub type GithubCertificateGenerator =
    CertificateGenerator<GithubClient, SvgRasterizer<GithubClient>>;

impl GithubCertificateGenerator {
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let client = GithubClient::new(config)?;
        let rasterizer =
            SvgRasterizer::new(client.clone(), config.pixel_ratio);
        Ok(Self::new(client, rasterizer, config.template.clone()))
    }
}

impl<S: ProfileSource, R: Rasterizer> CertificateGenerator<S, R> {
    pub fn new(source: S, rasterizer: R, template: Template) -> Self {
        Self {
            loader: ProfileLoader::new(source),
            rasterizer,
            template,
            mounted: Mutex::new(None),
        }
    }

    pub fn loader(&self) -> &ProfileLoader<S> {
        &self.loader
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn state(&self) -> ProfileState {
        self.loader.snapshot()
    }

    pub async fn set_username(&self, username: &str) -> LoadOutcome {
        self.loader.load(username).await
    }

    /// Lay the certificate out for the current state, dated today.
    pub fn render(&self) -> CertificateView {
        self.render_at(Local::now().date_naive())
    }

    pub fn render_at(&self, today: NaiveDate) -> CertificateView {
        let view = CertificateView::build(
            &self.loader.snapshot(),
            &self.template,
            today,
        );
        *self.lock_mounted() = Some(view.clone());
        view
    }

    pub fn mounted(&self) -> Option<CertificateView> {
        self.lock_mounted().clone()
    }

    pub fn unmount(&self) {
        *self.lock_mounted() = None;
    }

    /// Rasterize the mounted layout and save it as
    /// `{username}_certificate.png` in `dest_dir`.
    ///
    /// Returns `Ok(None)` without doing anything when nothing is mounted.
    pub async fn download_certificate(
        &self,
        dest_dir: impl AsRef<Path>,
    ) -> std::result::Result<Option<PathBuf>, ExportError> {
        let Some(view) = self.mounted() else {
            debug!("Nothing mounted, skipping download");
            return Ok(None);
        };

        let blob = self
            .rasterizer
            .render_subtree_to_image(&view)
            .await
            .map_err(|e| {
                warn!("Could not rasterize certificate: {}", e);
                e
            })?;
        let filename = certificate_filename(&view.identifier);
        save_blob(&blob, dest_dir, &filename).map(Some)
    }

    fn lock_mounted(&self) -> MutexGuard<'_, Option<CertificateView>> {
        // Only ever replaced wholesale, so a poisoned lock is still usable.
        self.mounted.lock().unwrap_or_else(|poisoned| {
            warn!("Mounted view lock was poisoned");
            poisoned.into_inner()
        })
    }
}
