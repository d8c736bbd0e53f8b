use std::f32::consts::TAU;

use crate::config::MotionConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    /// Pointer position normalised to [-1, 1], up is positive.
    pub pointer_offset: [f32; 2],
    pub scroll_rotation: f32,
}

#[derive(Debug, Clone)]
pub struct InputState {
    pointer_offset: [f32; 2],
    scroll_rotation: f32,
    scroll_rate: f32,
    wrap_scroll: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::with_config(&MotionConfig::default())
    }

    pub fn with_config(motion: &MotionConfig) -> Self {
        Self {
            pointer_offset: [0.0, 0.0],
            scroll_rotation: 0.0,
            scroll_rate: motion.scroll_rate,
            wrap_scroll: motion.wrap_scroll_rotation,
        }
    }

    /// `client_x`/`client_y` are in the same units as the viewport size.
    /// A zero-sized viewport leaves the offset unchanged.
    pub fn on_pointer_move(
        &mut self,
        client_x: f32,
        client_y: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) {
        if viewport_width <= 0.0 || viewport_height <= 0.0 {
            return;
        }
        let x = 2.0 * client_x / viewport_width - 1.0;
        let y = -(2.0 * client_y / viewport_height - 1.0);
        self.pointer_offset = [x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0)];
    }

    /// `scroll_y` is the absolute vertical scroll offset, not a delta.
    pub fn on_scroll(&mut self, scroll_y: f32) {
        let rotation = scroll_y * self.scroll_rate;
        self.scroll_rotation = if self.wrap_scroll {
            rotation.rem_euclid(TAU)
        } else {
            rotation
        };
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            pointer_offset: self.pointer_offset,
            scroll_rotation: self.scroll_rotation,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollOffset {
    offset: f32,
}

pub const LINE_HEIGHT_PX: f32 = 40.0;

impl ScrollOffset {
    /// Positive `delta_px` scrolls down the document. The offset never goes
    /// above the top of the document.
    pub fn apply(&mut self, delta_px: f32) -> f32 {
        self.offset = (self.offset + delta_px).max(0.0);
        self.offset
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{InputState, ScrollOffset};
    use crate::config::MotionConfig;

    #[test]
    fn centre_of_viewport_is_zero_offset() {
        let mut input = InputState::new();
        input.on_pointer_move(400.0, 300.0, 800.0, 600.0);
        assert_eq!(input.snapshot().pointer_offset, [0.0, 0.0]);
    }

    #[test]
    fn top_left_maps_to_minus_one_plus_one() {
        let mut input = InputState::new();
        input.on_pointer_move(0.0, 0.0, 800.0, 600.0);
        assert_eq!(input.snapshot().pointer_offset, [-1.0, 1.0]);
    }

    #[test]
    fn only_latest_pointer_move_is_observed() {
        let mut input = InputState::new();
        input.on_pointer_move(0.0, 0.0, 800.0, 600.0);
        input.on_pointer_move(800.0, 600.0, 800.0, 600.0);
        input.on_pointer_move(600.0, 150.0, 800.0, 600.0);
        assert_eq!(input.snapshot().pointer_offset, [0.5, 0.5]);
    }

    #[test]
    fn zero_sized_viewport_is_ignored() {
        let mut input = InputState::new();
        input.on_pointer_move(600.0, 150.0, 800.0, 600.0);
        input.on_pointer_move(10.0, 10.0, 0.0, 600.0);
        assert_eq!(input.snapshot().pointer_offset, [0.5, 0.5]);
    }

    #[test]
    fn scroll_is_absolute_offset_times_rate() {
        let mut input = InputState::new();
        input.on_scroll(1_000.0);
        input.on_scroll(250.0);
        assert!((input.snapshot().scroll_rotation - 0.2).abs() < 1e-6);
    }

    #[test]
    fn scroll_wraps_when_enabled() {
        let mut input = InputState::with_config(&MotionConfig {
            wrap_scroll_rotation: true,
            ..MotionConfig::default()
        });
        input.on_scroll(100_000.0);
        let rotation = input.snapshot().scroll_rotation;
        assert!((0.0..std::f32::consts::TAU).contains(&rotation));
        assert!((rotation - (80.0f32).rem_euclid(std::f32::consts::TAU)).abs() < 1e-3);
    }

    #[test]
    fn scroll_offset_stops_at_top() {
        let mut scroll = ScrollOffset::default();
        assert_eq!(scroll.apply(120.0), 120.0);
        assert_eq!(scroll.apply(-500.0), 0.0);
        assert_eq!(scroll.offset(), 0.0);
    }

    proptest! {
        #[test]
        fn pointer_offset_stays_in_unit_range(
            moves in prop::collection::vec((-500.0f32..2500.0, -500.0f32..2500.0), 1..20),
            width in 1.0f32..2000.0,
            height in 1.0f32..2000.0,
        ) {
            let mut input = InputState::new();
            for (x, y) in &moves {
                input.on_pointer_move(*x, *y, width, height);
            }
            let (x, y) = moves[moves.len() - 1];
            let [ox, oy] = input.snapshot().pointer_offset;
            prop_assert!((-1.0..=1.0).contains(&ox));
            prop_assert!((-1.0..=1.0).contains(&oy));
            prop_assert_eq!(ox, (2.0 * x / width - 1.0).clamp(-1.0, 1.0));
            prop_assert_eq!(oy, (-(2.0 * y / height - 1.0)).clamp(-1.0, 1.0));
        }
    }
}
