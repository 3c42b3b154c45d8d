//! Linear duty mapping
//!
//! Every channel and every call goes through [`map_duty`], so a UI value
//! always produces the same raw duty for the same window.

use crate::config::DutyRange;

/// Upper bound of normalized UI values
pub const UI_MAX: u8 = 100;

/// Map a UI value (0-100) into a duty window
///
/// Computes `round(min + (max - min) * ui / 100)` after clamping `ui` to
/// 0-100 and both window ends into `0..=range`. Halves round away from
/// `min`.
pub fn map_duty(ui: u8, window: DutyRange, range: u16) -> u16 {
    let ui = i32::from(ui.min(UI_MAX));
    let window = window.clamped(range);
    let min = i32::from(window.min);
    let span = i32::from(window.max) - min;

    let scaled = span * ui;
    let offset = if scaled >= 0 {
        (scaled + 50) / 100
    } else {
        (scaled - 50) / 100
    };

    // Both ends are within 0..=range, so the result is too
    (min + offset) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_endpoints() {
        let window = DutyRange::new(0, 178);
        assert_eq!(map_duty(0, window, 255), 0);
        assert_eq!(map_duty(100, window, 255), 178);

        let window = DutyRange::new(40, 200);
        assert_eq!(map_duty(0, window, 255), 40);
        assert_eq!(map_duty(100, window, 255), 200);
    }

    #[test]
    fn test_rounding() {
        // 178 * 50 / 100 = 89 exactly
        assert_eq!(map_duty(50, DutyRange::new(0, 178), 255), 89);
        // 255 * 50 / 100 = 127.5 -> 128
        assert_eq!(map_duty(50, DutyRange::new(0, 255), 255), 128);
        // 255 * 1 / 100 = 2.55 -> 3
        assert_eq!(map_duty(1, DutyRange::new(0, 255), 255), 3);
    }

    #[test]
    fn test_ui_clamped() {
        let window = DutyRange::new(0, 178);
        assert_eq!(map_duty(250, window, 255), 178);
    }

    #[test]
    fn test_window_clamped_to_range() {
        let window = DutyRange::new(0, 1000);
        assert_eq!(map_duty(100, window, 255), 255);
        assert_eq!(map_duty(50, window, 255), 128);
    }

    #[test]
    fn test_inverted_window() {
        let window = DutyRange::new(255, 0);
        assert_eq!(map_duty(0, window, 255), 255);
        assert_eq!(map_duty(100, window, 255), 0);
        assert_eq!(map_duty(50, window, 255), 127);
    }

    proptest! {
        #[test]
        fn prop_endpoints_hit_window(a in 0u16..=1024, b in 0u16..=1024, range in 1u16..=1024) {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            let window = DutyRange::new(min, max);
            prop_assert_eq!(map_duty(0, window, range), min.min(range));
            prop_assert_eq!(map_duty(100, window, range), max.min(range));
        }

        #[test]
        fn prop_monotonic(a in 0u16..=1024, b in 0u16..=1024, ui in 0u8..100, range in 1u16..=1024) {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            let window = DutyRange::new(min, max);
            let lo = map_duty(ui, window, range);
            let hi = map_duty(ui + 1, window, range);
            prop_assert!(lo <= hi);
            prop_assert!(hi <= max.min(range));
            prop_assert!(lo >= min.min(range));
        }
    }
}
