//! HSV conversions for the color widget

use swatch_ipc::HexColor;

/// Convert HSV to RGB
/// h: 0-360, s: 0-1, v: 0-1
/// Returns [r, g, b] with values 0-1
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h = h.rem_euclid(360.0);
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    [r + m, g + m, b + m]
}

/// Convert RGB (0-1) to HSV (h: 0-360, s: 0-1, v: 0-1)
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    let s = if max == 0.0 { 0.0 } else { delta / max };

    (h, s, max)
}

/// Which HSV component a color strip edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HsvChannel {
    Hue,
    Saturation,
    Value,
}

impl HsvChannel {
    pub const ALL: [HsvChannel; 3] = [HsvChannel::Hue, HsvChannel::Saturation, HsvChannel::Value];
}

/// Color picker state.
///
/// Kept alongside the 8-bit color so hue and saturation survive edits
/// that pass through grey or black, where the color alone cannot hold them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    /// Degrees, 0-360
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    pub fn from_color(color: HexColor) -> Self {
        let [r, g, b] = color.to_srgb_f32();
        let (h, s, v) = rgb_to_hsv(r, g, b);
        Self { h, s, v }
    }

    pub fn to_color(self) -> HexColor {
        HexColor::from_srgb_f32(hsv_to_rgb(self.h, self.s, self.v))
    }

    /// Position of `channel` along its strip, 0-1
    pub fn position(self, channel: HsvChannel) -> f32 {
        match channel {
            HsvChannel::Hue => self.h / 360.0,
            HsvChannel::Saturation => self.s,
            HsvChannel::Value => self.v,
        }
    }

    /// This state with only `channel` moved to `position` (0-1)
    pub fn with_position(self, channel: HsvChannel, position: f32) -> Self {
        let position = position.clamp(0.0, 1.0);
        let mut next = self;
        match channel {
            // 360 would wrap back to red at the far end of the strip
            HsvChannel::Hue => next.h = position * 359.9,
            HsvChannel::Saturation => next.s = position,
            HsvChannel::Value => next.v = position,
        }
        next
    }

    /// Follow a color set from outside the picker. Hue and saturation are
    /// kept where the new color leaves them undefined.
    pub fn follow(self, color: HexColor) -> Self {
        if self.to_color() == color {
            return self;
        }
        let mut next = Self::from_color(color);
        if next.v == 0.0 {
            next.h = self.h;
            next.s = self.s;
        } else if next.s == 0.0 {
            next.h = self.h;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn test_primaries() {
        assert!(close(hsv_to_rgb(0.0, 1.0, 1.0), [1.0, 0.0, 0.0]));
        assert!(close(hsv_to_rgb(120.0, 1.0, 1.0), [0.0, 1.0, 0.0]));
        assert!(close(hsv_to_rgb(240.0, 1.0, 1.0), [0.0, 0.0, 1.0]));
        assert!(close(hsv_to_rgb(360.0, 1.0, 1.0), [1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_rgb_to_hsv_inverts() {
        for rgb in [[0.2, 0.4, 0.9], [1.0, 0.5, 0.0], [0.3, 0.3, 0.3], [0.9, 0.1, 0.5]] {
            let (h, s, v) = rgb_to_hsv(rgb[0], rgb[1], rgb[2]);
            assert!(close(hsv_to_rgb(h, s, v), rgb), "{rgb:?}");
        }
    }

    #[test]
    fn test_grey_has_no_hue_or_saturation() {
        let (h, s, v) = rgb_to_hsv(0.5, 0.5, 0.5);
        assert_eq!((h, s), (0.0, 0.0));
        assert!((v - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_channel_edits() {
        let red = Hsv::from_color(HexColor::rgb(0xff, 0, 0));
        assert_eq!(red.with_position(HsvChannel::Value, 0.0).to_color(), HexColor::rgb(0, 0, 0));
        assert_eq!(red.with_position(HsvChannel::Saturation, 0.0).to_color(), HexColor::WHITE);
        let green = red.with_position(HsvChannel::Hue, 1.0 / 3.0);
        assert_eq!(green.to_color().0[1], 0xff);
        let hue = Hsv::from_color(green.to_color()).position(HsvChannel::Hue);
        assert!((hue - 1.0 / 3.0).abs() < 0.01);
    }

    #[test]
    fn test_hue_survives_dragging_through_black() {
        let start = Hsv::from_color(HexColor::rgb(0x33, 0x66, 0xcc));
        let black = start.with_position(HsvChannel::Value, 0.0);
        assert_eq!(black.to_color(), HexColor::rgb(0, 0, 0));

        let back = black.with_position(HsvChannel::Value, 0.8);
        let (h, s, _) = {
            let [r, g, b] = back.to_color().to_srgb_f32();
            rgb_to_hsv(r, g, b)
        };
        assert!((h - start.h).abs() < 1.0, "{h} vs {}", start.h);
        assert!((s - start.s).abs() < 0.01);
    }

    #[test]
    fn test_follow_keeps_hue_for_grey_and_black() {
        let blue = Hsv::from_color(HexColor::rgb(0, 0, 0xff));

        let black = blue.follow(HexColor::rgb(0, 0, 0));
        assert_eq!((black.h, black.s, black.v), (blue.h, blue.s, 0.0));

        let grey = blue.follow(HexColor::rgb(0x80, 0x80, 0x80));
        assert_eq!(grey.h, blue.h);
        assert_eq!(grey.s, 0.0);

        let red = blue.follow(HexColor::rgb(0xff, 0, 0));
        assert_eq!(red, Hsv::from_color(HexColor::rgb(0xff, 0, 0)));

        // A color the state already produces leaves it untouched
        let dark = blue.with_position(HsvChannel::Value, 0.0);
        assert_eq!(dark.follow(HexColor::rgb(0, 0, 0)), dark);
    }
}
