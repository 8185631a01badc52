//! Parameter identifiers, values and ranges.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Every tunable preview parameter.
///
/// Keys are the camelCase names used by the panel and in JSON overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamId {
    AmbientIntensity,
    KeyIntensity,
    KeyColor,
    FillIntensity,
    RimIntensity,
    KeyLightX,
    KeyLightY,
    KeyLightZ,
    Roughness,
    Metalness,
    AoMapIntensity,
    DisplacementScale,
    EnvMapIntensity,
    AlphaTest,
    NormalScale,
    MinDistance,
    MaxDistance,
    MaxPolarAngle,
    TextureRepeat,
    AlbedoVariant,
    NormalVariant,
    DisplacementVariant,
}

impl ParamId {
    pub const ALL: [ParamId; 22] = [
        ParamId::AmbientIntensity,
        ParamId::KeyIntensity,
        ParamId::KeyColor,
        ParamId::FillIntensity,
        ParamId::RimIntensity,
        ParamId::KeyLightX,
        ParamId::KeyLightY,
        ParamId::KeyLightZ,
        ParamId::Roughness,
        ParamId::Metalness,
        ParamId::AoMapIntensity,
        ParamId::DisplacementScale,
        ParamId::EnvMapIntensity,
        ParamId::AlphaTest,
        ParamId::NormalScale,
        ParamId::MinDistance,
        ParamId::MaxDistance,
        ParamId::MaxPolarAngle,
        ParamId::TextureRepeat,
        ParamId::AlbedoVariant,
        ParamId::NormalVariant,
        ParamId::DisplacementVariant,
    ];

    /// Stable camelCase key
    pub fn key(self) -> &'static str {
        match self {
            ParamId::AmbientIntensity => "ambientIntensity",
            ParamId::KeyIntensity => "keyIntensity",
            ParamId::KeyColor => "keyColor",
            ParamId::FillIntensity => "fillIntensity",
            ParamId::RimIntensity => "rimIntensity",
            ParamId::KeyLightX => "keyLightX",
            ParamId::KeyLightY => "keyLightY",
            ParamId::KeyLightZ => "keyLightZ",
            ParamId::Roughness => "roughness",
            ParamId::Metalness => "metalness",
            ParamId::AoMapIntensity => "aoMapIntensity",
            ParamId::DisplacementScale => "displacementScale",
            ParamId::EnvMapIntensity => "envMapIntensity",
            ParamId::AlphaTest => "alphaTest",
            ParamId::NormalScale => "normalScale",
            ParamId::MinDistance => "minDistance",
            ParamId::MaxDistance => "maxDistance",
            ParamId::MaxPolarAngle => "maxPolarAngle",
            ParamId::TextureRepeat => "textureRepeat",
            ParamId::AlbedoVariant => "albedoVariant",
            ParamId::NormalVariant => "normalVariant",
            ParamId::DisplacementVariant => "displacementVariant",
        }
    }

    /// Kind of value this parameter holds
    pub fn kind(self) -> ParamKind {
        match self {
            ParamId::KeyColor => ParamKind::Color,
            ParamId::AlbedoVariant | ParamId::NormalVariant | ParamId::DisplacementVariant => {
                ParamKind::Choice
            }
            _ => ParamKind::Float,
        }
    }

    /// Render group that consumes this parameter
    pub fn group(self) -> ParamGroup {
        match self {
            ParamId::AmbientIntensity
            | ParamId::KeyIntensity
            | ParamId::KeyColor
            | ParamId::FillIntensity
            | ParamId::RimIntensity
            | ParamId::KeyLightX
            | ParamId::KeyLightY
            | ParamId::KeyLightZ => ParamGroup::Lighting,
            ParamId::Roughness
            | ParamId::Metalness
            | ParamId::AoMapIntensity
            | ParamId::DisplacementScale
            | ParamId::EnvMapIntensity
            | ParamId::AlphaTest
            | ParamId::NormalScale
            | ParamId::TextureRepeat => ParamGroup::Material,
            ParamId::MinDistance | ParamId::MaxDistance | ParamId::MaxPolarAngle => {
                ParamGroup::Camera
            }
            ParamId::AlbedoVariant | ParamId::NormalVariant | ParamId::DisplacementVariant => {
                ParamGroup::Textures
            }
        }
    }
}

impl ParamId {
    /// Slider range of a float parameter
    pub fn range(self) -> Option<ParamRange> {
        let range = match self {
            ParamId::AmbientIntensity => ParamRange::new(0.0, 10.0, 0.01),
            ParamId::KeyIntensity => ParamRange::new(0.0, 20.0, 0.01),
            ParamId::FillIntensity | ParamId::RimIntensity => ParamRange::new(0.0, 10.0, 0.01),
            ParamId::KeyLightX | ParamId::KeyLightY | ParamId::KeyLightZ => {
                ParamRange::new(-30.0, 30.0, 0.1)
            }
            ParamId::Roughness | ParamId::Metalness => ParamRange::new(0.0, 5.0, 0.01),
            ParamId::AoMapIntensity | ParamId::EnvMapIntensity | ParamId::NormalScale => {
                ParamRange::new(0.0, 10.0, 0.01)
            }
            ParamId::DisplacementScale => ParamRange::new(0.0, 0.5, 0.001),
            ParamId::AlphaTest => ParamRange::new(0.0, 1.0, 0.01),
            ParamId::MinDistance => ParamRange::new(0.5, 20.0, 0.1),
            ParamId::MaxDistance => ParamRange::new(1.0, 50.0, 0.1),
            ParamId::MaxPolarAngle => ParamRange::new(0.0, PI, 0.01),
            ParamId::TextureRepeat => ParamRange::new(0.1, 5.0, 0.1),
            ParamId::KeyColor
            | ParamId::AlbedoVariant
            | ParamId::NormalVariant
            | ParamId::DisplacementVariant => return None,
        };
        Some(range)
    }

    /// Number of options of a choice parameter
    pub fn choice_count(self) -> Option<usize> {
        match self.kind() {
            ParamKind::Choice => Some(2),
            _ => None,
        }
    }

    /// Bring `value` inside the bounds of this parameter: floats clamp to
    /// the slider range, choices to the last option. Colors pass through.
    pub fn constrain(self, value: ParamValue) -> ParamValue {
        match value {
            ParamValue::Float(v) => match self.range() {
                Some(range) => ParamValue::Float(range.clamp(v)),
                None => value,
            },
            ParamValue::Choice(i) => match self.choice_count() {
                Some(count) => ParamValue::Choice(i.min(count.saturating_sub(1))),
                None => value,
            },
            ParamValue::Color(_) => value,
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ParamId {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamId::ALL
            .into_iter()
            .find(|id| id.key() == s)
            .ok_or_else(|| ParamError::UnknownParam(s.to_string()))
    }
}

/// Value kind carried by a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Float,
    Color,
    Choice,
}

/// Which part of the scene consumes a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamGroup {
    Lighting,
    Material,
    Camera,
    Textures,
}

/// A parameter value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ParamValue {
    Float(f32),
    Color(HexColor),
    Choice(usize),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Float(_) => ParamKind::Float,
            ParamValue::Color(_) => ParamKind::Color,
            ParamValue::Choice(_) => ParamKind::Choice,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<HexColor> {
        match self {
            ParamValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<usize> {
        match self {
            ParamValue::Choice(i) => Some(*i),
            _ => None,
        }
    }
}

/// 8-bit sRGB color written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub [u8; 3]);

impl HexColor {
    pub const WHITE: HexColor = HexColor([0xff, 0xff, 0xff]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Channels as sRGB floats in 0-1
    pub fn to_srgb_f32(self) -> [f32; 3] {
        self.0.map(|c| c as f32 / 255.0)
    }

    /// Build from sRGB floats, clamping each channel to 0-1
    pub fn from_srgb_f32(rgb: [f32; 3]) -> Self {
        Self(rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
    }

    /// Channels converted to linear light
    pub fn to_linear_f32(self) -> [f32; 3] {
        self.to_srgb_f32().map(|c| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        })
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl FromStr for HexColor {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParamError::InvalidColor(s.to_string());
        let digits = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match digits.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
                Ok(Self([
                    channel(0).map_err(|_| invalid())?,
                    channel(2).map_err(|_| invalid())?,
                    channel(4).map_err(|_| invalid())?,
                ]))
            }
            3 => {
                // #abc expands to #aabbcc
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|n| n * 17);
                Ok(Self([
                    channel(0).map_err(|_| invalid())?,
                    channel(1).map_err(|_| invalid())?,
                    channel(2).map_err(|_| invalid())?,
                ]))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for HexColor {
    type Error = ParamError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

/// Inclusive slider range with a step increment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    /// Bound a value to `[min, max]`. NaN maps to `min`.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Round to the nearest step (measured from `min`), then clamp
    pub fn snap(&self, value: f32) -> f32 {
        if self.step <= 0.0 || value.is_nan() {
            return self.clamp(value);
        }
        let steps = ((value - self.min) / self.step).round();
        self.clamp(self.min + steps * self.step)
    }

    /// Position of `value` within the range as 0-1
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.clamp(value) - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_keys_round_trip() {
        for id in ParamId::ALL {
            assert_eq!(id.key().parse::<ParamId>().unwrap(), id);
        }
        assert!(matches!(
            "specularity".parse::<ParamId>(),
            Err(ParamError::UnknownParam(_))
        ));
    }

    #[test]
    fn test_param_serde_uses_keys() {
        let json = serde_json::to_string(&ParamId::AoMapIntensity).unwrap();
        assert_eq!(json, "\"aoMapIntensity\"");
        let json = serde_json::to_string(&ParamId::KeyLightX).unwrap();
        assert_eq!(json, "\"keyLightX\"");
    }

    #[test]
    fn test_hex_color_parse() {
        assert_eq!("#ffbb66".parse::<HexColor>().unwrap(), HexColor::rgb(0xff, 0xbb, 0x66));
        assert_eq!("#88BBFF".parse::<HexColor>().unwrap(), HexColor::rgb(0x88, 0xbb, 0xff));
        assert_eq!("#fff".parse::<HexColor>().unwrap(), HexColor::WHITE);
        assert!("ffffff".parse::<HexColor>().is_err());
        assert!("#ggg000".parse::<HexColor>().is_err());
        assert!("#ffff".parse::<HexColor>().is_err());
    }

    #[test]
    fn test_hex_color_display_is_lowercase() {
        assert_eq!(HexColor::rgb(0xAB, 0x01, 0xFF).to_string(), "#ab01ff");
    }

    #[test]
    fn test_hex_color_linear_conversion() {
        let [r, g, b] = HexColor::WHITE.to_linear_f32();
        assert!((r - 1.0).abs() < 1e-5 && (g - 1.0).abs() < 1e-5 && (b - 1.0).abs() < 1e-5);
        let [r, _, _] = HexColor::rgb(0x80, 0, 0).to_linear_f32();
        assert!((r - 0.2158).abs() < 0.001);
    }

    #[test]
    fn test_range_clamp() {
        let range = ParamRange::new(0.0, 0.5, 0.001);
        assert_eq!(range.clamp(0.7), 0.5);
        assert_eq!(range.clamp(-1.0), 0.0);
        assert_eq!(range.clamp(f32::NAN), 0.0);
        assert_eq!(range.clamp(0.25), 0.25);
    }

    #[test]
    fn test_range_snap() {
        let range = ParamRange::new(-30.0, 30.0, 0.1);
        assert!((range.snap(1.04) - 1.0).abs() < 1e-4);
        assert!((range.snap(1.06) - 1.1).abs() < 1e-4);
        assert_eq!(range.snap(45.0), 30.0);

        let offset = ParamRange::new(0.1, 5.0, 0.1);
        assert!((offset.snap(0.12) - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_every_float_param_has_a_range() {
        for id in ParamId::ALL {
            assert_eq!(id.range().is_some(), id.kind() == ParamKind::Float, "{id}");
            assert_eq!(id.choice_count().is_some(), id.kind() == ParamKind::Choice, "{id}");
        }
    }

    #[test]
    fn test_constrain_bounds_values() {
        assert_eq!(
            ParamId::DisplacementScale.constrain(ParamValue::Float(3.0)),
            ParamValue::Float(0.5)
        );
        assert_eq!(
            ParamId::MinDistance.constrain(ParamValue::Float(f32::NAN)),
            ParamValue::Float(0.5)
        );
        assert_eq!(
            ParamId::KeyLightX.constrain(ParamValue::Float(-12.5)),
            ParamValue::Float(-12.5)
        );
        assert_eq!(
            ParamId::AlbedoVariant.constrain(ParamValue::Choice(7)),
            ParamValue::Choice(1)
        );
        let color = ParamValue::Color(HexColor::rgb(1, 2, 3));
        assert_eq!(ParamId::KeyColor.constrain(color), color);
    }

    #[test]
    fn test_range_normalize() {
        let range = ParamRange::new(0.0, 20.0, 0.01);
        assert!((range.normalize(5.0) - 0.25).abs() < 1e-6);
        assert_eq!(range.normalize(40.0), 1.0);
        assert_eq!(ParamRange::new(1.0, 1.0, 0.1).normalize(1.0), 0.0);
    }
}
