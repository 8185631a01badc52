//! Messages exchanged between the control panel and the scene.

use serde::{Deserialize, Serialize};

use crate::params::{ParamId, ParamValue};
use crate::store::SceneParams;

/// Messages from the control panel to the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PanelToScene {
    /// A widget changed a parameter (already clamped to the widget range)
    SetParam { id: ParamId, value: ParamValue },

    /// Restore the active page's default parameters
    ResetParams,
}

/// Messages from the scene to the control panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SceneToPanel {
    /// Parameters changed outside the panel; widgets must re-display
    ParamsChanged(SceneParams),

    /// A texture in the active bundle failed to load
    TexturesFailed { path: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_param_wire_format() {
        let msg = PanelToScene::SetParam {
            id: ParamId::DisplacementScale,
            value: ParamValue::Float(0.25),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "SetParam");
        assert_eq!(json["data"]["id"], "displacementScale");
        assert_eq!(json["data"]["value"]["kind"], "float");
    }
}
