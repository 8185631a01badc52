//! The live scene parameter store

use bevy::prelude::*;
use swatch_ipc::{ParamError, ParamId, ParamValue, SceneParams};

/// Current parameter values plus the active page's defaults.
///
/// Render systems read this every frame through change detection; the
/// panel writes it through [`ParamStore::set`].
#[derive(Resource, Debug, Clone, Default)]
pub struct ParamStore {
    current: SceneParams,
    defaults: SceneParams,
}

impl ParamStore {
    pub fn params(&self) -> &SceneParams {
        &self.current
    }

    pub fn defaults(&self) -> &SceneParams {
        &self.defaults
    }

    /// Install a page's defaults as both the baseline and the current values
    pub fn load_page(&mut self, defaults: SceneParams) {
        self.defaults = defaults;
        self.current = defaults;
    }

    /// Assign one parameter; returns whether it changed
    pub fn set(&mut self, id: ParamId, value: ParamValue) -> Result<bool, ParamError> {
        self.current.set(id, value)
    }

    /// Replace every value, returning the ids that changed
    pub fn replace(&mut self, params: SceneParams) -> Vec<ParamId> {
        let changed = self.current.diff(&params);
        self.current = params;
        changed
    }

    /// Restore the page defaults, returning the ids that changed
    pub fn reset(&mut self) -> Vec<ParamId> {
        let defaults = self.defaults;
        self.replace(defaults)
    }

    /// Apply a JSON override object over the current values
    pub fn apply_overrides(&mut self, json: &str) -> Result<Vec<ParamId>, ParamError> {
        self.current.apply_overrides(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_restores_page_defaults() {
        let mut defaults = SceneParams::default();
        defaults.material.roughness = 0.8;

        let mut store = ParamStore::default();
        store.load_page(defaults);
        store.set(ParamId::Roughness, ParamValue::Float(0.1)).unwrap();
        store.set(ParamId::AlbedoVariant, ParamValue::Choice(1)).unwrap();

        let changed = store.reset();
        assert_eq!(changed, vec![ParamId::Roughness, ParamId::AlbedoVariant]);
        assert_eq!(store.params(), &defaults);
    }

    #[test]
    fn test_overrides_keep_defaults() {
        let mut store = ParamStore::default();
        store.load_page(SceneParams::default());
        store.apply_overrides(r#"{"metalness": 0.9}"#).unwrap();
        assert_eq!(store.params().material.metalness, 0.9);
        assert_eq!(store.defaults(), &SceneParams::default());
    }

    #[test]
    fn test_page_load_with_out_of_range_overrides() {
        let mut store = ParamStore::default();
        store.load_page(SceneParams::default());
        let changed = store
            .apply_overrides(r#"{"displacementScale": 3, "alphaTest": 4, "maxDistance": 500}"#)
            .unwrap();

        assert_eq!(changed.len(), 3);
        let params = store.params();
        assert_eq!(params.material.displacement_scale, 0.5);
        assert_eq!(params.material.alpha_test, 1.0);
        assert_eq!(params.camera.max_distance, 50.0);
        for id in ParamId::ALL {
            assert_eq!(id.constrain(params.get(id)), params.get(id), "{id}");
        }
    }
}
