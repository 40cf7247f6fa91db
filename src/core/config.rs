//! Redaction configuration types.
//!
//! `BlurConfig` is the caller-facing knob set: which visual treatment to
//! apply, how strong it should be, and which detector families to run. All
//! fields carry serde defaults so partial JSON payloads deserialize into a
//! sensible configuration.

use crate::core::errors::{PrivacyError, PrivacyResult};
use serde::{Deserialize, Serialize};

/// Default redaction strength when the caller does not specify one.
pub const DEFAULT_BLUR_INTENSITY: u8 = 80;

/// Default per-detector confidence floor.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

/// The visual treatment applied to each detected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurMode {
    /// Gaussian blur, strength scaled by intensity and region size.
    #[default]
    Gaussian,
    /// Mosaic pixelation, block size scaled by intensity and region size.
    Pixelation,
    /// An opaque glyph drawn over the region; intensity is ignored.
    Emoji,
}

/// The glyph drawn over a region in [`BlurMode::Emoji`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Glyph {
    /// A yellow smiley face.
    #[default]
    Smiley,
    /// A smiley wearing dark sunglasses.
    Sunglasses,
    /// The see-no-evil monkey, hands over eyes.
    SeeNoEvil,
    /// A gold five-pointed star.
    Star,
    /// A red heart.
    Heart,
    /// A padlock.
    Lock,
}

impl Glyph {
    /// Maps an emoji character (as sent by external callers) to a glyph.
    ///
    /// Variation selectors are stripped before matching. Returns `None` for
    /// unrecognized input.
    pub fn from_emoji(s: &str) -> Option<Glyph> {
        let stripped: String = s.chars().filter(|c| *c != '\u{fe0f}').collect();
        match stripped.as_str() {
            "\u{1f600}" => Some(Glyph::Smiley),
            "\u{1f60e}" => Some(Glyph::Sunglasses),
            "\u{1f648}" => Some(Glyph::SeeNoEvil),
            "\u{2b50}" => Some(Glyph::Star),
            "\u{2764}" => Some(Glyph::Heart),
            "\u{1f512}" => Some(Glyph::Lock),
            _ => None,
        }
    }
}

/// Configuration for one redaction invocation.
///
/// Deserializes from partial JSON; missing fields fall back to the defaults
/// (gaussian at intensity 80 with both detector families enabled).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    /// Visual treatment to apply.
    pub mode: BlurMode,
    /// Redaction strength in `0..=100`. Ignored by [`BlurMode::Emoji`].
    pub intensity: u8,
    /// Glyph used by [`BlurMode::Emoji`].
    pub glyph: Glyph,
    /// Whether to run the face detector.
    pub detect_faces: bool,
    /// Whether to run the license-plate detector.
    pub detect_plates: bool,
}

impl Default for BlurConfig {
    fn default() -> Self {
        BlurConfig {
            mode: BlurMode::Gaussian,
            intensity: DEFAULT_BLUR_INTENSITY,
            glyph: Glyph::Smiley,
            detect_faces: true,
            detect_plates: true,
        }
    }
}

impl BlurConfig {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is usable, otherwise a
    /// [`PrivacyError::ConfigError`] describing the problem.
    pub fn validate(&self) -> PrivacyResult<()> {
        if self.intensity > 100 {
            return Err(PrivacyError::config_error(format!(
                "intensity must be in 0..=100, got {}",
                self.intensity
            )));
        }
        Ok(())
    }
}
