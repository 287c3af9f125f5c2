use libraview_core::ScanCode;
use rand::seq::SliceRandom;
use rand::Rng;

/// Stand-in for the camera: a check-in code for one of `candidates`, picked at random.
pub fn mock_scan_code<R: Rng + ?Sized>(rng: &mut R, candidates: &[&str]) -> Option<String> {
    candidates
        .choose(rng)
        .map(|desk| ScanCode::check_in(*desk).to_string())
}
