//! Consumer-side conventions applied on top of the normalized record.

use crate::{Presentation, TrackingResult};

/// Unity-facing view of a result: left-handed rotation about X and
/// translation in metres instead of centimetres.
pub struct UnityConvention;

impl UnityConvention {
    pub const TRANSLATION_SCALE: f32 = 0.01;

    pub fn apply(result: &TrackingResult) -> TrackingResult {
        let mut out = result.clone();
        if let Some(rotation) = out.rotation.as_mut() {
            rotation.x = -rotation.x;
        }
        if let Some(translation) = out.translation.as_mut() {
            *translation *= Self::TRANSLATION_SCALE;
        }
        out
    }
}

impl Presentation {
    pub fn present(&self, result: &TrackingResult) -> TrackingResult {
        match self {
            Presentation::Raw => result.clone(),
            Presentation::Unity => UnityConvention::apply(result),
        }
    }

    pub fn present_all(&self, results: &[TrackingResult]) -> Vec<TrackingResult> {
        results.iter().map(|r| self.present(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn unity_negates_x_and_scales_translation() {
        let result = TrackingResult {
            rotation: Some(Vec3::new(0.2, -0.1, 0.3)),
            translation: Some(Vec3::new(10.0, -5.0, -40.0)),
            ..TrackingResult::empty(4)
        };

        let unity = UnityConvention::apply(&result);

        assert_eq!(unity.rotation, Some(Vec3::new(-0.2, -0.1, 0.3)));
        let t = unity.translation.unwrap();
        assert!((t - Vec3::new(0.1, -0.05, -0.4)).length() < 1e-6);
        // the source record is untouched
        assert_eq!(result.rotation, Some(Vec3::new(0.2, -0.1, 0.3)));
    }

    #[test]
    fn unity_keeps_missing_pose_missing() {
        let unity = UnityConvention::apply(&TrackingResult::empty(9));
        assert!(unity.rotation.is_none());
        assert!(unity.translation.is_none());
    }

    #[test]
    fn raw_is_identity() {
        let result = TrackingResult {
            translation: Some(Vec3::new(1.0, 2.0, 3.0)),
            ..TrackingResult::empty(1)
        };
        assert_eq!(Presentation::Raw.present(&result), result);
    }
}
