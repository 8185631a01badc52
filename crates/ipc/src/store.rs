//! The scene parameter store value type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ParamError;
use crate::params::{HexColor, ParamId, ParamKind, ParamValue};
use crate::types::{CameraLimits, LightingParams, MaterialParams, TextureSelection};

/// Every parameter a preview page consumes, grouped by render concern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneParams {
    pub lighting: LightingParams,
    pub material: MaterialParams,
    pub camera: CameraLimits,
    pub textures: TextureSelection,
}

impl SceneParams {
    /// Current value of a parameter
    pub fn get(&self, id: ParamId) -> ParamValue {
        let l = &self.lighting;
        let m = &self.material;
        let c = &self.camera;
        let t = &self.textures;
        match id {
            ParamId::AmbientIntensity => ParamValue::Float(l.ambient_intensity),
            ParamId::KeyIntensity => ParamValue::Float(l.key_intensity),
            ParamId::KeyColor => ParamValue::Color(l.key_color),
            ParamId::FillIntensity => ParamValue::Float(l.fill_intensity),
            ParamId::RimIntensity => ParamValue::Float(l.rim_intensity),
            ParamId::KeyLightX => ParamValue::Float(l.key_position[0]),
            ParamId::KeyLightY => ParamValue::Float(l.key_position[1]),
            ParamId::KeyLightZ => ParamValue::Float(l.key_position[2]),
            ParamId::Roughness => ParamValue::Float(m.roughness),
            ParamId::Metalness => ParamValue::Float(m.metalness),
            ParamId::AoMapIntensity => ParamValue::Float(m.ao_map_intensity),
            ParamId::DisplacementScale => ParamValue::Float(m.displacement_scale),
            ParamId::EnvMapIntensity => ParamValue::Float(m.env_map_intensity),
            ParamId::AlphaTest => ParamValue::Float(m.alpha_test),
            ParamId::NormalScale => ParamValue::Float(m.normal_scale),
            ParamId::TextureRepeat => ParamValue::Float(m.texture_repeat),
            ParamId::MinDistance => ParamValue::Float(c.min_distance),
            ParamId::MaxDistance => ParamValue::Float(c.max_distance),
            ParamId::MaxPolarAngle => ParamValue::Float(c.max_polar_angle),
            ParamId::AlbedoVariant => ParamValue::Choice(t.albedo),
            ParamId::NormalVariant => ParamValue::Choice(t.normal),
            ParamId::DisplacementVariant => ParamValue::Choice(t.displacement),
        }
    }

    /// Assign a parameter. Returns whether the stored value changed.
    ///
    /// Values are stored as given; range clamping belongs to the panel.
    pub fn set(&mut self, id: ParamId, value: ParamValue) -> Result<bool, ParamError> {
        if value.kind() != id.kind() {
            return Err(ParamError::TypeMismatch {
                id,
                expected: id.kind(),
            });
        }
        if self.get(id) == value {
            return Ok(false);
        }

        match value {
            ParamValue::Float(v) => *self.float_slot(id) = v,
            ParamValue::Color(color) => self.lighting.key_color = color,
            ParamValue::Choice(index) => match id {
                ParamId::AlbedoVariant => self.textures.albedo = index,
                ParamId::NormalVariant => self.textures.normal = index,
                _ => self.textures.displacement = index,
            },
        }
        Ok(true)
    }

    fn float_slot(&mut self, id: ParamId) -> &mut f32 {
        let l = &mut self.lighting;
        let m = &mut self.material;
        let c = &mut self.camera;
        match id {
            ParamId::AmbientIntensity => &mut l.ambient_intensity,
            ParamId::KeyIntensity => &mut l.key_intensity,
            ParamId::FillIntensity => &mut l.fill_intensity,
            ParamId::RimIntensity => &mut l.rim_intensity,
            ParamId::KeyLightX => &mut l.key_position[0],
            ParamId::KeyLightY => &mut l.key_position[1],
            ParamId::KeyLightZ => &mut l.key_position[2],
            ParamId::Roughness => &mut m.roughness,
            ParamId::Metalness => &mut m.metalness,
            ParamId::AoMapIntensity => &mut m.ao_map_intensity,
            ParamId::DisplacementScale => &mut m.displacement_scale,
            ParamId::EnvMapIntensity => &mut m.env_map_intensity,
            ParamId::AlphaTest => &mut m.alpha_test,
            ParamId::NormalScale => &mut m.normal_scale,
            ParamId::TextureRepeat => &mut m.texture_repeat,
            ParamId::MinDistance => &mut c.min_distance,
            ParamId::MaxDistance => &mut c.max_distance,
            // Only float ids reach here; `set` checks the kind first
            _ => &mut c.max_polar_angle,
        }
    }

    /// Ids whose values differ between two parameter sets
    pub fn diff(&self, other: &SceneParams) -> Vec<ParamId> {
        ParamId::ALL
            .into_iter()
            .filter(|id| self.get(*id) != other.get(*id))
            .collect()
    }

    /// Flat `{key: value}` JSON object, the format of override files
    pub fn to_flat_json(&self) -> Value {
        let mut map = Map::new();
        for id in ParamId::ALL {
            let value = match self.get(id) {
                ParamValue::Float(v) => Value::from(v),
                ParamValue::Color(c) => Value::from(c.to_string()),
                ParamValue::Choice(i) => Value::from(i),
            };
            map.insert(id.key().to_string(), value);
        }
        Value::Object(map)
    }

    /// Apply a flat `{key: value}` JSON object over the current values.
    ///
    /// Values are clamped to their slider ranges. Returns the ids that
    /// changed. Nothing is applied if any entry is invalid.
    pub fn apply_overrides(&mut self, json: &str) -> Result<Vec<ParamId>, ParamError> {
        let map: Map<String, Value> = serde_json::from_str(json)?;

        let mut parsed = Vec::with_capacity(map.len());
        for (key, raw) in &map {
            let id: ParamId = key.parse()?;
            let mismatch = || ParamError::TypeMismatch {
                id,
                expected: id.kind(),
            };
            let value = match id.kind() {
                ParamKind::Float => ParamValue::Float(raw.as_f64().ok_or_else(mismatch)? as f32),
                ParamKind::Color => {
                    let text = raw.as_str().ok_or_else(mismatch)?;
                    ParamValue::Color(text.parse::<HexColor>()?)
                }
                ParamKind::Choice => ParamValue::Choice(raw.as_u64().ok_or_else(mismatch)? as usize),
            };
            let bounded = id.constrain(value);
            if bounded != value {
                tracing::debug!("Override {id} = {value:?} clamped to {bounded:?}");
            }
            parsed.push((id, bounded));
        }

        let mut next = *self;
        let mut changed = Vec::new();
        for (id, value) in parsed {
            if next.set(id, value)? {
                changed.push(id);
            }
        }
        *self = next;
        tracing::debug!("Applied {} parameter overrides", changed.len());
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_every_param() {
        let mut params = SceneParams::default();
        for id in ParamId::ALL {
            let value = match id.kind() {
                ParamKind::Float => ParamValue::Float(0.123),
                ParamKind::Color => ParamValue::Color(HexColor::rgb(1, 2, 3)),
                ParamKind::Choice => ParamValue::Choice(1),
            };
            assert!(params.set(id, value).unwrap(), "{id} should change");
            assert_eq!(params.get(id), value);
        }
    }

    #[test]
    fn test_set_reports_unchanged() {
        let mut params = SceneParams::default();
        let current = params.get(ParamId::Roughness);
        assert!(!params.set(ParamId::Roughness, current).unwrap());
    }

    #[test]
    fn test_set_rejects_wrong_kind() {
        let mut params = SceneParams::default();
        let result = params.set(ParamId::Roughness, ParamValue::Color(HexColor::WHITE));
        assert!(matches!(result, Err(ParamError::TypeMismatch { id: ParamId::Roughness, .. })));
        assert_eq!(params, SceneParams::default());
    }

    #[test]
    fn test_key_light_axes_are_independent() {
        let mut params = SceneParams::default();
        params.set(ParamId::KeyLightY, ParamValue::Float(-4.0)).unwrap();
        assert_eq!(params.lighting.key_position, [8.0, -4.0, 6.0]);
    }

    #[test]
    fn test_diff_lists_changed_ids() {
        let base = SceneParams::default();
        let mut other = base;
        other.material.normal_scale = 4.0;
        other.lighting.key_color = HexColor::rgb(0xff, 0, 0);
        assert_eq!(base.diff(&other), vec![ParamId::KeyColor, ParamId::NormalScale]);
    }

    #[test]
    fn test_apply_overrides() {
        let mut params = SceneParams::default();
        let changed = params
            .apply_overrides(r##"{"roughness": 0.8, "keyColor": "#ffddaa", "albedoVariant": 1}"##)
            .unwrap();
        assert_eq!(changed.len(), 3);
        assert!((params.material.roughness - 0.8).abs() < 1e-6);
        assert_eq!(params.lighting.key_color, HexColor::rgb(0xff, 0xdd, 0xaa));
        assert_eq!(params.textures.albedo, 1);
    }

    #[test]
    fn test_apply_overrides_is_atomic() {
        let mut params = SceneParams::default();
        let result = params.apply_overrides(r#"{"roughness": 0.8, "keyColor": 3}"#);
        assert!(result.is_err());
        assert_eq!(params, SceneParams::default());

        let result = params.apply_overrides(r#"{"shininess": 1.0}"#);
        assert!(matches!(result, Err(ParamError::UnknownParam(_))));
    }

    #[test]
    fn test_flat_json_feeds_overrides() {
        let mut source = SceneParams::default();
        source.material.metalness = 0.75;
        source.textures.normal = 1;
        let json = source.to_flat_json().to_string();

        let mut target = SceneParams::default();
        target.apply_overrides(&json).unwrap();
        assert_eq!(target.material.metalness, 0.75);
        assert_eq!(target.textures.normal, 1);
    }

    #[test]
    fn test_overrides_are_clamped_to_slider_ranges() {
        let mut params = SceneParams::default();
        let changed = params
            .apply_overrides(
                r#"{"displacementScale": 3.0, "alphaTest": 4.0, "roughness": -2.0, "normalVariant": 9}"#,
            )
            .unwrap();

        assert_eq!(changed.len(), 4);
        assert_eq!(params.material.displacement_scale, 0.5);
        assert_eq!(params.material.alpha_test, 1.0);
        assert_eq!(params.material.roughness, 0.0);
        assert_eq!(params.textures.normal, 1);
    }

    #[test]
    fn test_default_params_are_within_ranges() {
        let params = SceneParams::default();
        for id in ParamId::ALL {
            let value = params.get(id);
            assert_eq!(id.constrain(value), value, "{id}");
        }
    }
}
