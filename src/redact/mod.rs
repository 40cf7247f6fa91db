//! The redaction engine.
//!
//! Renders the configured visual treatment over every enabled region of an
//! image. The engine never mutates its input: it clones the source into a
//! fresh output buffer and applies transforms region by region in the order
//! given, so overlapping regions resolve deterministically. A region that
//! fails to render is recorded and skipped; one bad region never aborts the
//! rest of the image.

mod gaussian;
mod glyph;
mod pixelate;

use crate::core::{BlurConfig, BlurMode, PrivacyError, PrivacyResult};
use crate::domain::Region;
use image::RgbImage;
use image::imageops;
use tracing::warn;

/// Pixels added on every side of a region before a blur transform, so the
/// treatment bleeds slightly past the detected edge.
pub const REGION_PADDING: u32 = 4;

/// A region that could not be rendered.
#[derive(Debug, Clone)]
pub struct RenderFailure {
    /// Identifier of the affected region.
    pub region_id: String,
    /// Why rendering failed.
    pub reason: String,
}

/// Output of one redaction pass.
#[derive(Debug)]
pub struct RedactionOutput {
    /// The redacted image; untouched copy of the input wherever no enabled
    /// region rendered.
    pub image: RgbImage,
    /// Regions that were skipped, in render order.
    pub failures: Vec<RenderFailure>,
}

/// Applies redaction transforms to images.
#[derive(Debug, Clone)]
pub struct RedactionEngine {
    padding: u32,
}

impl Default for RedactionEngine {
    fn default() -> Self {
        RedactionEngine {
            padding: REGION_PADDING,
        }
    }
}

impl RedactionEngine {
    /// Creates an engine with explicit blur padding.
    pub fn with_padding(padding: u32) -> Self {
        RedactionEngine { padding }
    }

    /// Renders `config`'s treatment over every enabled region.
    ///
    /// Disabled regions are left untouched. Per-region failures are
    /// collected in the output rather than propagated; only an invalid
    /// configuration fails the whole call.
    pub fn redact(
        &self,
        image: &RgbImage,
        regions: &[Region],
        config: &BlurConfig,
    ) -> PrivacyResult<RedactionOutput> {
        config.validate()?;
        let mut output = image.clone();
        let mut failures = Vec::new();
        for region in regions.iter().filter(|r| r.enabled()) {
            if let Err(err) = self.render_region(&mut output, region, config) {
                warn!(region = region.id(), error = %err, "region render failed");
                failures.push(RenderFailure {
                    region_id: region.id().to_string(),
                    reason: err.to_string(),
                });
            }
        }
        Ok(RedactionOutput {
            image: output,
            failures,
        })
    }

    fn render_region(
        &self,
        output: &mut RgbImage,
        region: &Region,
        config: &BlurConfig,
    ) -> PrivacyResult<()> {
        // Glyphs fill the detected rect exactly; blurs bleed past it.
        let pad = match config.mode {
            BlurMode::Emoji => 0,
            _ => self.padding,
        };
        let rect = region
            .rect()
            .pad(pad, output.width(), output.height());
        if rect.is_empty() {
            return Err(PrivacyError::region_render(
                region.id(),
                "region has no visible area after clipping",
            ));
        }
        let roi = imageops::crop_imm(output, rect.x, rect.y, rect.width, rect.height).to_image();
        let rendered = match config.mode {
            BlurMode::Gaussian => gaussian::apply(&roi, config.intensity),
            BlurMode::Pixelation => pixelate::apply(&roi, config.intensity),
            BlurMode::Emoji => glyph::apply(&roi, config.glyph),
        };
        imageops::replace(output, &rendered, rect.x as i64, rect.y as i64);
        Ok(())
    }
}
