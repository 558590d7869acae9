//! Page zoom factor.

use vmd_types::config::MIN_ZOOM;

pub const ZOOM_STEP: f32 = 0.1;
pub const DEFAULT_ZOOM: f32 = 1.0;

/// Current zoom of one window.
///
/// Values are kept on the 0.1 grid so repeated in/out steps come back to
/// exactly 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    factor: f32,
}

impl Zoom {
    /// Start at `initial`; anything non-finite or below [`MIN_ZOOM`] is
    /// replaced by the default.
    pub fn new(initial: f32) -> Self {
        let factor = if initial.is_finite() && initial >= MIN_ZOOM {
            initial
        } else {
            log::warn!("Ignoring invalid zoom {initial}, using {DEFAULT_ZOOM}");
            DEFAULT_ZOOM
        };
        Self { factor }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Rounded percentage for display.
    pub fn percent(&self) -> u32 {
        (self.factor * 100.0).round() as u32
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.set(self.factor + ZOOM_STEP)
    }

    /// Step out, stopping at [`MIN_ZOOM`].
    pub fn zoom_out(&mut self) -> f32 {
        self.set(self.factor - ZOOM_STEP)
    }

    pub fn reset(&mut self) -> f32 {
        self.set(DEFAULT_ZOOM)
    }

    fn set(&mut self, value: f32) -> f32 {
        let snapped = (value * 10.0).round() / 10.0;
        self.factor = snapped.max(MIN_ZOOM);
        self.factor
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            factor: DEFAULT_ZOOM,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_by_a_tenth() {
        let mut zoom = Zoom::default();
        assert_eq!(zoom.zoom_in(), 1.1);
        assert_eq!(zoom.zoom_in(), 1.2);
        assert_eq!(zoom.zoom_out(), 1.1);
        assert_eq!(zoom.percent(), 110);
    }

    #[test]
    fn reset_returns_to_one() {
        let mut zoom = Zoom::new(1.5);
        zoom.zoom_in();
        assert_eq!(zoom.reset(), 1.0);
    }

    #[test]
    fn zoom_out_stops_at_minimum() {
        let mut zoom = Zoom::new(0.3);
        for _ in 0..10 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.factor(), MIN_ZOOM);
    }

    #[test]
    fn invalid_initial_values_fall_back() {
        assert_eq!(Zoom::new(0.0).factor(), DEFAULT_ZOOM);
        assert_eq!(Zoom::new(f32::NAN).factor(), DEFAULT_ZOOM);
        assert_eq!(Zoom::new(-2.0).factor(), DEFAULT_ZOOM);
        assert_eq!(Zoom::new(2.0).factor(), 2.0);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn in_then_out_is_identity(steps in 0usize..30) {
                let mut zoom = Zoom::default();
                for _ in 0..steps {
                    zoom.zoom_in();
                }
                for _ in 0..steps {
                    zoom.zoom_out();
                }
                prop_assert_eq!(zoom.factor(), DEFAULT_ZOOM);
            }

            #[test]
            fn never_below_minimum(ops in proptest::collection::vec(any::<bool>(), 0..60)) {
                let mut zoom = Zoom::default();
                for zoom_in in ops {
                    if zoom_in { zoom.zoom_in(); } else { zoom.zoom_out(); }
                    prop_assert!(zoom.factor() >= MIN_ZOOM);
                }
            }
        }
    }
}
