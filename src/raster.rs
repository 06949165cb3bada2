use std::future::Future;
use std::io::Cursor;
use std::sync::Arc;

use image::imageops::FilterType;
use image::ImageOutputFormat;
use log::{debug, trace};
use resvg::usvg::{self, fontdb};
use resvg::tiny_skia;

use crate::errors::ExportError;
use crate::github::ImageSource;
use crate::render::{CertificateView, AVATAR_SIZE, CANVAS_HEIGHT, CANVAS_WIDTH};

/// An encoded PNG together with its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Turns a laid-out certificate into pixels.
pub trait Rasterizer {
    fn render_subtree_to_image(
        &self,
        root: &CertificateView,
    ) -> impl Future<Output = Result<ImageBlob, ExportError>> + Send;
}

/// Draws the certificate's SVG layout with `resvg`, capturing the avatar
/// through an [`ImageSource`] first.
pub struct SvgRasterizer<I> {
    images: I,
    pixel_ratio: f32,
    fontdb: Arc<fontdb::Database>,
}

impl<I: ImageSource> SvgRasterizer<I> {
    /// Loads the system fonts once; text is drawn with whatever matches
    /// the layout's font stack.
    pub fn new(images: I, pixel_ratio: f32) -> Self {
        let mut fontdb = fontdb::Database::new();
        fontdb.load_system_fonts();
        debug!("Loaded {} font faces", fontdb.len());
        Self::with_fonts(images, pixel_ratio, Arc::new(fontdb))
    }

    pub fn with_fonts(
        images: I,
        pixel_ratio: f32,
        fontdb: Arc<fontdb::Database>,
    ) -> Self {
        Self {
            images,
            pixel_ratio,
            fontdb,
        }
    }

    pub fn images(&self) -> &I {
        &self.images
    }

    fn scaled(&self, size: u32) -> u32 {
        (size as f32 * self.pixel_ratio).round().max(1.0) as u32
    }

    /// The avatar fetched, cropped to a square and re-encoded as PNG.
    async fn capture_avatar(
        &self,
        root: &CertificateView,
    ) -> Result<Option<Vec<u8>>, ExportError> {
        let Some(url) = root.avatar_url() else {
            return Ok(None);
        };
        trace!("Capturing avatar {}", url);

        let bytes = self.images.fetch_image(url).await.map_err(|e| {
            ExportError::Avatar {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;
        let decoded =
            image::load_from_memory(&bytes).map_err(|e| ExportError::Avatar {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let side = self.scaled(AVATAR_SIZE);
        let avatar = decoded.resize_to_fill(side, side, FilterType::Lanczos3);
        let mut png = Cursor::new(Vec::new());
        avatar.write_to(&mut png, ImageOutputFormat::Png)?;
        Ok(Some(png.into_inner()))
    }

    /// The layout as SVG with the avatar captured and embedded.
    pub async fn layout_svg(
        &self,
        root: &CertificateView,
    ) -> Result<String, ExportError> {
        let avatar = self.capture_avatar(root).await?;
        Ok(root.to_svg(avatar.as_deref()))
    }

    /// An SVG document drawn into a pixmap at the configured pixel ratio.
    pub fn draw(&self, svg: &str) -> Result<ImageBlob, ExportError> {
        let mut options = usvg::Options::default();
        options.fontdb = Arc::clone(&self.fontdb);
        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|e| ExportError::Layout(e.to_string()))?;

        let width = self.scaled(CANVAS_WIDTH);
        let height = self.scaled(CANVAS_HEIGHT);
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or(ExportError::Canvas { width, height })?;
        let ratio = self.pixel_ratio;
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(ratio, ratio),
            &mut pixmap.as_mut(),
        );

        let png = pixmap
            .encode_png()
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        Ok(ImageBlob { png, width, height })
    }
}

impl<I: ImageSource + Sync> Rasterizer for SvgRasterizer<I> {
    async fn render_subtree_to_image(
        &self,
        root: &CertificateView,
    ) -> Result<ImageBlob, ExportError> {
        let svg = self.layout_svg(root).await?;
        self.draw(&svg)
    }
}
