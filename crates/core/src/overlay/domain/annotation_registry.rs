use crate::overlay::domain::annotation::Annotation;
use crate::shared::constants::DEFAULT_FADE_STEP;

/// Fade values at or below this are treated as fully faded.
const FADE_EPSILON: f64 = 1e-9;

/// Owns the annotations currently on screen.
///
/// Decay (`tick`) and rendering (`snapshot`) are separate: reading a snapshot
/// never changes fade, and `tick` must be called exactly once per displayed
/// frame.
#[derive(Debug)]
pub struct AnnotationRegistry {
    annotations: Vec<Annotation>,
    fade_step: f64,
}

impl AnnotationRegistry {
    pub fn new(fade_step: f64) -> Result<Self, &'static str> {
        if !(fade_step > 0.0 && fade_step <= 1.0) {
            return Err("fade_step must be in (0, 1]");
        }
        Ok(Self {
            annotations: Vec::new(),
            fade_step,
        })
    }

    pub fn fade_step(&self) -> f64 {
        self.fade_step
    }

    /// Appends an annotation; insertion order is kept for rendering.
    pub fn add(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Decays every annotation by one step and drops the fully faded ones.
    pub fn tick(&mut self) {
        let step = self.fade_step;
        for a in &mut self.annotations {
            a.decay(step, FADE_EPSILON);
        }
        let before = self.annotations.len();
        self.annotations.retain(|a| !a.is_faded());
        let removed = before - self.annotations.len();
        if removed > 0 {
            log::debug!(
                "Pruned {removed} faded annotation(s), {} remaining",
                self.annotations.len()
            );
        }
    }

    /// Current annotations in insertion order. The iterator is cloneable, so
    /// it can be walked more than once.
    pub fn snapshot(&self) -> impl Iterator<Item = &Annotation> + Clone + '_ {
        self.annotations.iter()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
    }
}

impl Default for AnnotationRegistry {
    fn default() -> Self {
        Self {
            annotations: Vec::new(),
            fade_step: DEFAULT_FADE_STEP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::geometry::PixelRect;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn annotation(caption: &str) -> Annotation {
        Annotation::new(
            PixelRect {
                top: 10,
                left: 10,
                right: 50,
                bottom: 60,
            },
            vec![],
            caption,
        )
    }

    #[test]
    fn test_default_step() {
        assert_relative_eq!(AnnotationRegistry::default().fade_step(), 0.05);
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-0.5)]
    #[case::too_large(1.01)]
    #[case::nan(f64::NAN)]
    fn test_invalid_step_rejected(#[case] step: f64) {
        assert!(AnnotationRegistry::new(step).is_err());
    }

    #[test]
    fn test_add_preserves_order() {
        let mut registry = AnnotationRegistry::default();
        registry.add(annotation("a"));
        registry.add(annotation("b"));
        registry.add(annotation("c"));
        let captions: Vec<_> = registry.snapshot().map(|a| a.caption.as_str()).collect();
        assert_eq!(captions, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tick_on_empty_registry() {
        let mut registry = AnnotationRegistry::default();
        registry.tick();
        assert!(registry.is_empty());
    }

    #[rstest]
    #[case(0.05)]
    #[case(0.07)]
    #[case(0.1)]
    #[case(0.3)]
    #[case(1.0 / 3.0)]
    #[case(1.0)]
    fn test_removed_after_ceil_inverse_step_ticks(#[case] step: f64) {
        let mut registry = AnnotationRegistry::new(step).unwrap();
        registry.add(annotation("face"));
        let ticks = (1.0 / step).ceil() as usize;

        for _ in 0..ticks - 1 {
            registry.tick();
        }
        assert_eq!(registry.len(), 1, "still visible one tick early");

        registry.tick();
        assert!(registry.is_empty());
    }

    #[rstest]
    #[case(1)]
    #[case(5)]
    #[case(13)]
    fn test_n_ticks_decay_exactly_n_steps(#[case] n: usize) {
        let step = 0.05;
        let mut registry = AnnotationRegistry::new(step).unwrap();
        registry.add(annotation("face"));
        for _ in 0..n {
            registry.tick();
        }
        let fade = registry.snapshot().next().unwrap().fade();
        assert_relative_eq!(fade, 1.0 - n as f64 * step, epsilon = 1e-12);
    }

    #[test]
    fn test_snapshot_does_not_mutate_fade() {
        let mut registry = AnnotationRegistry::new(0.1).unwrap();
        registry.add(annotation("face"));
        registry.tick();

        for _ in 0..10 {
            assert_eq!(registry.snapshot().count(), 1);
        }
        assert_relative_eq!(registry.snapshot().next().unwrap().fade(), 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_snapshot_is_restartable() {
        let mut registry = AnnotationRegistry::default();
        registry.add(annotation("a"));
        registry.add(annotation("b"));
        let snap = registry.snapshot();
        let first: Vec<_> = snap.clone().map(|a| a.caption.clone()).collect();
        let second: Vec<_> = snap.map(|a| a.caption.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_staggered_annotations_expire_independently() {
        let mut registry = AnnotationRegistry::new(0.25).unwrap();
        registry.add(annotation("old"));
        registry.tick();
        registry.tick();
        registry.add(annotation("new"));

        registry.tick();
        registry.tick(); // "old" has had 4 ticks

        let captions: Vec<_> = registry.snapshot().map(|a| a.caption.clone()).collect();
        assert_eq!(captions, vec!["new"]);
        assert_relative_eq!(registry.snapshot().next().unwrap().fade(), 0.5);
    }

    #[test]
    fn test_fade_stays_in_unit_interval() {
        let mut registry = AnnotationRegistry::new(0.3).unwrap();
        registry.add(annotation("face"));
        for _ in 0..3 {
            registry.tick();
            for a in registry.snapshot() {
                assert!((0.0..=1.0).contains(&a.fade()));
            }
        }
    }

    #[test]
    fn test_clear() {
        let mut registry = AnnotationRegistry::default();
        registry.add(annotation("a"));
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
