//! The detection capability and the reduction of raw detections to letter candidates.
//!
//! Inference itself is delegated to an external pretrained model behind the [`Detector`]
//! trait. This module only defines the contract and reduces a detector's raw output to the
//! zero-or-one best candidate the stabilizer consumes per frame.

use std::path::Path;

use anyhow::{Context, Result};
use image::RgbImage;

/// A single detection mapped to a letter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub label: char,
    /// Detection confidence in `0.0..=1.0`.
    pub confidence: f32,
}

impl Candidate {
    pub fn new(label: char, confidence: f32) -> Self {
        Self { label, confidence }
    }
}

/// Everything a detector produced for one frame.
pub struct Detections {
    /// All detections the model surfaced. No ordering is required; ranking happens in
    /// [`best_candidate`] and [`top_k`].
    pub candidates: Vec<Candidate>,
    /// The input with detection boxes drawn, for display. Detectors that found nothing pass
    /// the input through unannotated.
    pub visualization: RgbImage,
}

/// A pretrained letter-detection model.
///
/// Implementations run inference over one (cropped and preprocessed) image and report every
/// detection whose confidence clears `threshold`.
pub trait Detector {
    fn detect(&mut self, image: &RgbImage, threshold: f32) -> Result<Detections>;
}

impl Detector for Box<dyn Detector> {
    fn detect(&mut self, image: &RgbImage, threshold: f32) -> Result<Detections> {
        (**self).detect(image, threshold)
    }
}

/// Reduces a frame's detections to the single best candidate.
///
/// The best candidate is the one with maximum confidence among those clearing `threshold`;
/// confidence ties resolve to the earliest candidate in the slice.
pub fn best_candidate(candidates: &[Candidate], threshold: f32) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for &candidate in candidates {
        if candidate.confidence < threshold {
            continue;
        }
        if best.map_or(true, |b| candidate.confidence > b.confidence) {
            best = Some(candidate);
        }
    }
    best
}

/// Returns up to `k` candidates, most confident first.
///
/// Feeds the on-screen ranking overlay; ties keep their input order.
pub fn top_k(candidates: &[Candidate], k: usize) -> Vec<Candidate> {
    let mut ranked = candidates.to_vec();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked.truncate(k);
    ranked
}

/// The result of recognizing a single still image.
pub struct Recognition {
    pub candidate: Option<Candidate>,
    pub visualization: RgbImage,
}

/// Default confidence threshold for still images.
///
/// More permissive than the live default: a still has no vote window to absorb misfires, and
/// the caller sees the confidence alongside the answer.
pub const STILL_IMAGE_THRESHOLD: f32 = 0.25;

/// Runs the detector once over a still image.
pub fn recognize(
    detector: &mut dyn Detector,
    image: &RgbImage,
    threshold: f32,
) -> Result<Recognition> {
    let detections = detector.detect(image, threshold)?;
    let candidate = best_candidate(&detections.candidates, threshold);
    match candidate {
        Some(c) => log::debug!("recognized '{}' ({:.2})", c.label, c.confidence),
        None => log::debug!("no letter recognized"),
    }
    Ok(Recognition {
        candidate,
        visualization: detections.visualization,
    })
}

/// Runs the detector once over an image file.
pub fn recognize_file(
    detector: &mut dyn Detector,
    path: &Path,
    threshold: f32,
) -> Result<Recognition> {
    let image = image::open(path)
        .with_context(|| format!("failed to read image {}", path.display()))?
        .to_rgb8();
    recognize(detector, &image, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cands(raw: &[(char, f32)]) -> Vec<Candidate> {
        raw.iter().map(|&(l, c)| Candidate::new(l, c)).collect()
    }

    #[test]
    fn test_best_candidate_picks_max() {
        let candidates = cands(&[('A', 0.4), ('B', 0.9), ('C', 0.7)]);
        assert_eq!(
            best_candidate(&candidates, 0.5),
            Some(Candidate::new('B', 0.9))
        );
    }

    #[test]
    fn test_best_candidate_respects_threshold() {
        let candidates = cands(&[('A', 0.4), ('B', 0.3)]);
        assert_eq!(best_candidate(&candidates, 0.5), None);
        assert_eq!(best_candidate(&[], 0.5), None);
    }

    #[test]
    fn test_best_candidate_tie_resolves_to_first() {
        let candidates = cands(&[('A', 0.8), ('B', 0.8)]);
        assert_eq!(
            best_candidate(&candidates, 0.5),
            Some(Candidate::new('A', 0.8))
        );
    }

    #[test]
    fn test_top_k_orders_by_confidence() {
        let candidates = cands(&[('A', 0.2), ('B', 0.9), ('C', 0.5)]);
        let top = top_k(&candidates, 2);
        assert_eq!(top, cands(&[('B', 0.9), ('C', 0.5)]));

        assert_eq!(top_k(&candidates, 10).len(), 3);
    }

    /// Always reports the same detections, passing the input through as visualization.
    struct FixedDetector(Vec<Candidate>);

    impl Detector for FixedDetector {
        fn detect(&mut self, image: &RgbImage, _threshold: f32) -> Result<Detections> {
            Ok(Detections {
                candidates: self.0.clone(),
                visualization: image.clone(),
            })
        }
    }

    #[test]
    fn test_recognize_still_image() {
        let mut detector = FixedDetector(cands(&[('W', 0.8), ('V', 0.6)]));
        let image = RgbImage::new(32, 32);

        let recognition = recognize(&mut detector, &image, STILL_IMAGE_THRESHOLD).unwrap();
        assert_eq!(recognition.candidate, Some(Candidate::new('W', 0.8)));
        assert_eq!(recognition.visualization.dimensions(), (32, 32));

        let mut empty = FixedDetector(Vec::new());
        let recognition = recognize(&mut empty, &image, STILL_IMAGE_THRESHOLD).unwrap();
        assert_eq!(recognition.candidate, None);
    }

    #[test]
    fn test_recognize_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("fingerspell-still-{}.png", std::process::id()));
        RgbImage::new(16, 16).save(&path).unwrap();

        let mut detector = FixedDetector(cands(&[('L', 0.9)]));
        let recognition = recognize_file(&mut detector, &path, STILL_IMAGE_THRESHOLD).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(recognition.candidate, Some(Candidate::new('L', 0.9)));

        let missing = Path::new("/nonexistent/letter.png");
        assert!(recognize_file(&mut detector, missing, STILL_IMAGE_THRESHOLD).is_err());
    }
}
