//! End-to-end pipeline scenarios with stub detectors.

use image::{Rgb, RgbImage};
use privacy_guard::core::{BlurConfig, BlurMode, Glyph, PrivacyError};
use privacy_guard::detectors::RegionDetector;
use privacy_guard::domain::{PipelineWarning, RawRegion, Region, RegionKind};
use privacy_guard::pipeline::{Deadline, PrivacyPipeline};
use privacy_guard::processors::{Rect, RectF};
use privacy_guard::redact::REGION_PADDING;
use std::sync::Arc;
use std::time::Duration;

/// A detector that returns canned regions, optionally failing outright, for
/// narrow images only, or after a fixed delay.
struct StubDetector {
    name: &'static str,
    regions: Vec<RawRegion>,
    fail: bool,
    min_image_width: u32,
    delay: Duration,
}

impl StubDetector {
    fn returning(name: &'static str, regions: Vec<RawRegion>) -> Arc<dyn RegionDetector> {
        Arc::new(StubDetector {
            name,
            regions,
            fail: false,
            min_image_width: 0,
            delay: Duration::ZERO,
        })
    }

    fn failing(name: &'static str) -> Arc<dyn RegionDetector> {
        Arc::new(StubDetector {
            name,
            regions: Vec::new(),
            fail: true,
            min_image_width: 0,
            delay: Duration::ZERO,
        })
    }

    fn failing_for_narrow(
        name: &'static str,
        regions: Vec<RawRegion>,
        min_image_width: u32,
    ) -> Arc<dyn RegionDetector> {
        Arc::new(StubDetector {
            name,
            regions,
            fail: false,
            min_image_width,
            delay: Duration::ZERO,
        })
    }

    fn slow(
        name: &'static str,
        regions: Vec<RawRegion>,
        delay: Duration,
    ) -> Arc<dyn RegionDetector> {
        Arc::new(StubDetector {
            name,
            regions,
            fail: false,
            min_image_width: 0,
            delay,
        })
    }
}

impl RegionDetector for StubDetector {
    fn name(&self) -> &str {
        self.name
    }

    fn detect(
        &self,
        image: &RgbImage,
        min_confidence: f32,
    ) -> Result<Vec<RawRegion>, PrivacyError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if self.fail || image.width() < self.min_image_width {
            return Err(PrivacyError::detector_unavailable(self.name, "stub failure"));
        }
        Ok(self
            .regions
            .iter()
            .copied()
            .filter(|r| r.confidence >= min_confidence)
            .collect())
    }
}

fn raw(x: f32, y: f32, w: f32, h: f32, confidence: f32, kind: RegionKind) -> RawRegion {
    RawRegion {
        rect: RectF::from_xywh(x, y, w, h),
        confidence,
        kind,
    }
}

fn street_scene() -> RgbImage {
    RgbImage::from_fn(200, 150, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    })
}

fn inside_padded(rect: &Rect, pad: u32, img: (u32, u32), x: u32, y: u32) -> bool {
    let padded = rect.pad(pad, img.0, img.1);
    x >= padded.x && x < padded.right() && y >= padded.y && y < padded.bottom()
}

/// A face and a vehicle in one image: two regions, each redacted, the rest
/// of the image untouched.
#[test]
fn face_and_vehicle_yield_two_redacted_regions() {
    let face = StubDetector::returning(
        "face",
        vec![raw(20.0, 20.0, 40.0, 40.0, 0.9, RegionKind::Face)],
    );
    let plate = StubDetector::returning(
        "plate",
        vec![raw(120.0, 90.0, 50.0, 20.0, 0.8, RegionKind::LicensePlate)],
    );
    let pipeline = PrivacyPipeline::from_detectors(Some(face), Some(plate));
    let image = street_scene();

    let config = BlurConfig {
        mode: BlurMode::Pixelation,
        intensity: 80,
        ..BlurConfig::default()
    };
    let result = pipeline.process(&image, &config, None).unwrap();

    assert_eq!(result.regions.len(), 2);
    assert!(result.warnings.is_empty());
    let kinds: Vec<RegionKind> = result.regions.iter().map(|r| r.kind()).collect();
    assert!(kinds.contains(&RegionKind::Face));
    assert!(kinds.contains(&RegionKind::LicensePlate));
    assert!(result.regions.iter().all(|r| r.enabled()));

    // Every changed pixel lies inside some padded region.
    let rects: Vec<Rect> = result.regions.iter().map(|r| r.rect()).collect();
    let mut changed = 0usize;
    for (x, y, pixel) in result.image.enumerate_pixels() {
        if pixel != image.get_pixel(x, y) {
            changed += 1;
            assert!(
                rects
                    .iter()
                    .any(|r| inside_padded(r, REGION_PADDING, (200, 150), x, y)),
                "pixel ({x},{y}) changed outside any region"
            );
        }
    }
    assert!(changed > 0, "redaction changed nothing");
}

/// Disabling the face detector in the config must suppress face regions
/// even when the detector is configured.
#[test]
fn disabled_detector_family_produces_no_regions() {
    let face = StubDetector::returning(
        "face",
        vec![raw(20.0, 20.0, 40.0, 40.0, 0.9, RegionKind::Face)],
    );
    let plate = StubDetector::returning(
        "plate",
        vec![raw(120.0, 90.0, 50.0, 20.0, 0.8, RegionKind::LicensePlate)],
    );
    let pipeline = PrivacyPipeline::from_detectors(Some(face), Some(plate));

    let config = BlurConfig {
        detect_faces: false,
        ..BlurConfig::default()
    };
    let result = pipeline.process(&street_scene(), &config, None).unwrap();

    assert_eq!(result.regions.len(), 1);
    assert_eq!(result.regions[0].kind(), RegionKind::LicensePlate);
    assert!(result.warnings.is_empty());
}

/// Manual regions render like detected ones; the glyph fills the exact rect
/// and ignores intensity.
#[test]
fn manual_region_renders_glyph_independent_of_intensity() {
    let pipeline = PrivacyPipeline::from_detectors(
        Some(StubDetector::returning("face", Vec::new())),
        Some(StubDetector::returning("plate", Vec::new())),
    );
    let image = street_scene();
    let rect = Rect::new(50, 40, 40, 40);
    let regions = [Region::manual("face_extra", rect, RegionKind::Face, 200, 150)];
    assert_eq!(regions[0].id(), "manual_face_extra");

    let low = BlurConfig {
        mode: BlurMode::Emoji,
        glyph: Glyph::Heart,
        intensity: 10,
        ..BlurConfig::default()
    };
    let high = BlurConfig {
        intensity: 90,
        ..low.clone()
    };
    let out_low = pipeline.rerender(&image, &regions, &low).unwrap();
    let out_high = pipeline.rerender(&image, &regions, &high).unwrap();

    assert_eq!(out_low.image, out_high.image);
    assert_ne!(out_low.image, image);
    // Glyph mode never bleeds outside the rect.
    for (x, y, pixel) in out_low.image.enumerate_pixels() {
        if !inside_padded(&rect, 0, (200, 150), x, y) {
            assert_eq!(pixel, image.get_pixel(x, y));
        }
    }
}

/// All requested detectors failing is a per-image error; a batch containing
/// such an image still processes the others.
#[test]
fn all_detectors_failing_is_isolated_per_image() {
    let pipeline = PrivacyPipeline::from_detectors(
        Some(StubDetector::failing("face")),
        Some(StubDetector::failing("plate")),
    );
    let err = pipeline
        .process(&street_scene(), &BlurConfig::default(), None)
        .unwrap_err();
    assert!(matches!(err, PrivacyError::AllDetectorsFailed { .. }));

    let outcome = pipeline.process_batch(
        &[street_scene(), street_scene()],
        &BlurConfig::default(),
        None,
    );
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.failed(), 2);
    assert_eq!(outcome.succeeded(), 0);
}

/// A batch mixing a failing image with a healthy one returns both entries:
/// the failure stays isolated and the healthy image comes back fully
/// processed.
#[test]
fn batch_keeps_healthy_image_alongside_failing_one() {
    // Detectors fail for anything narrower than 100 px.
    let face = StubDetector::failing_for_narrow(
        "face",
        vec![raw(20.0, 20.0, 40.0, 40.0, 0.9, RegionKind::Face)],
        100,
    );
    let plate = StubDetector::failing_for_narrow(
        "plate",
        vec![raw(120.0, 90.0, 50.0, 20.0, 0.8, RegionKind::LicensePlate)],
        100,
    );
    let pipeline = PrivacyPipeline::from_detectors(Some(face), Some(plate));

    let broken = RgbImage::from_pixel(50, 50, Rgb([10, 10, 10]));
    let healthy = street_scene();
    let outcome = pipeline.process_batch(&[broken, healthy.clone()], &BlurConfig::default(), None);

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.failed(), 1);
    assert_eq!(outcome.succeeded(), 1);
    assert!(matches!(
        outcome.results[0],
        Err(PrivacyError::AllDetectorsFailed { .. })
    ));
    let ok = outcome.results[1].as_ref().unwrap();
    assert_eq!(ok.regions.len(), 2);
    assert_ne!(ok.image, healthy);
    assert_eq!(outcome.total_regions, 2);
}

/// One failing detector degrades the result with a warning instead of
/// failing the run.
#[test]
fn single_failing_detector_degrades_with_warning() {
    let pipeline = PrivacyPipeline::from_detectors(
        Some(StubDetector::failing("face")),
        Some(StubDetector::returning(
            "plate",
            vec![raw(120.0, 90.0, 50.0, 20.0, 0.8, RegionKind::LicensePlate)],
        )),
    );
    let result = pipeline
        .process(&street_scene(), &BlurConfig::default(), None)
        .unwrap();

    assert_eq!(result.regions.len(), 1);
    assert_eq!(result.warnings.len(), 1);
    assert!(matches!(
        &result.warnings[0],
        PipelineWarning::DetectorUnavailable { detector, .. } if detector == "face"
    ));
}

/// Toggling a region off and re-rendering restores its original pixels
/// exactly; re-enabling redacts it again.
#[test]
fn toggling_region_restores_original_pixels() {
    let face = StubDetector::returning(
        "face",
        vec![raw(20.0, 20.0, 40.0, 40.0, 0.9, RegionKind::Face)],
    );
    let pipeline = PrivacyPipeline::from_detectors(Some(face), None);
    let image = street_scene();
    let config = BlurConfig {
        detect_plates: false,
        ..BlurConfig::default()
    };

    let result = pipeline.process(&image, &config, None).unwrap();
    assert_eq!(result.regions.len(), 1);
    assert_ne!(result.image, image);

    let mut regions = result.regions;
    regions[0].set_enabled(false);
    let restored = pipeline.rerender(&image, &regions, &config).unwrap();
    assert_eq!(restored.image, image);

    regions[0].set_enabled(true);
    let redacted_again = pipeline.rerender(&image, &regions, &config).unwrap();
    assert_eq!(redacted_again.image, result.image);
}

/// An already-expired deadline fails the invocation with Timeout.
#[test]
fn expired_deadline_times_out() {
    let face = StubDetector::returning(
        "face",
        vec![raw(20.0, 20.0, 40.0, 40.0, 0.9, RegionKind::Face)],
    );
    let pipeline = PrivacyPipeline::from_detectors(Some(face), None);
    let config = BlurConfig {
        detect_plates: false,
        ..BlurConfig::default()
    };
    let deadline = Deadline::from_now(Duration::ZERO);

    let err = pipeline
        .process(&street_scene(), &config, Some(deadline))
        .unwrap_err();
    assert!(matches!(err, PrivacyError::Timeout { .. }));
}

/// A budget that runs out while detection is still in flight fails the
/// invocation with Timeout even though every detector succeeded.
#[test]
fn deadline_expiring_mid_run_times_out() {
    let face = StubDetector::slow(
        "face",
        vec![raw(20.0, 20.0, 40.0, 40.0, 0.9, RegionKind::Face)],
        Duration::from_millis(50),
    );
    let plate = StubDetector::returning(
        "plate",
        vec![raw(120.0, 90.0, 50.0, 20.0, 0.8, RegionKind::LicensePlate)],
    );
    let pipeline = PrivacyPipeline::from_detectors(Some(face), Some(plate));
    let deadline = Deadline::from_now(Duration::from_millis(5));

    let err = pipeline
        .process(&street_scene(), &BlurConfig::default(), Some(deadline))
        .unwrap_err();
    assert!(matches!(err, PrivacyError::Timeout { .. }));
}

/// Requesting a detector family that has no configured backend degrades
/// with a warning when the other family still works.
#[test]
fn unconfigured_family_warns_when_other_family_works() {
    let pipeline = PrivacyPipeline::from_detectors(
        None,
        Some(StubDetector::returning(
            "plate",
            vec![raw(120.0, 90.0, 50.0, 20.0, 0.8, RegionKind::LicensePlate)],
        )),
    );
    let result = pipeline
        .process(&street_scene(), &BlurConfig::default(), None)
        .unwrap();
    assert_eq!(result.regions.len(), 1);
    assert_eq!(result.warnings.len(), 1);
}

/// Region metadata serializes to the external wire schema.
#[test]
fn result_regions_serialize_for_the_api_layer() {
    let face = StubDetector::returning(
        "face",
        vec![raw(20.0, 20.0, 40.0, 40.0, 0.9, RegionKind::Face)],
    );
    let pipeline = PrivacyPipeline::from_detectors(Some(face), None);
    let config = BlurConfig {
        detect_plates: false,
        ..BlurConfig::default()
    };
    let result = pipeline.process(&street_scene(), &config, None).unwrap();

    let json: serde_json::Value = serde_json::to_value(&result.regions).unwrap();
    assert_eq!(json[0]["id"], "face_0");
    assert_eq!(json[0]["detection_type"], "face");
    assert_eq!(json[0]["enabled"], true);
    assert_eq!(json[0]["x"], 20);
}
