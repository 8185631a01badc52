//! Channel bridge between the control panel and the scene
//!
//! The panel side sends [`PanelToScene`]; the Bevy side drains them once
//! per frame and answers with [`SceneToPanel`].

use bevy::prelude::Resource;
use crossbeam_channel::{Receiver, Sender};
use swatch_ipc::{PanelToScene, ParamId, ParamValue, SceneToPanel};

/// Sending half held by the panel widgets
#[derive(Clone)]
pub struct PanelBridge {
    to_scene: Sender<PanelToScene>,
}

impl PanelBridge {
    /// Create a new bridge pair
    pub fn new() -> (Self, PanelBridgeHandle) {
        let (to_scene_tx, to_scene_rx) = crossbeam_channel::unbounded();
        let (to_panel_tx, to_panel_rx) = crossbeam_channel::unbounded();

        let bridge = Self {
            to_scene: to_scene_tx,
        };
        let handle = PanelBridgeHandle {
            from_panel: to_scene_rx,
            to_panel: to_panel_tx,
            to_panel_rx,
        };
        (bridge, handle)
    }

    fn send(&self, msg: PanelToScene) {
        if self.to_scene.send(msg).is_err() {
            tracing::warn!("Scene side of the panel bridge is gone");
        }
    }

    pub fn set_param(&self, id: ParamId, value: ParamValue) {
        self.send(PanelToScene::SetParam { id, value });
    }

    pub fn reset_params(&self) {
        self.send(PanelToScene::ResetParams);
    }
}

/// Handle given to the Bevy side
#[derive(Resource)]
pub struct PanelBridgeHandle {
    from_panel: Receiver<PanelToScene>,
    to_panel: Sender<SceneToPanel>,
    to_panel_rx: Receiver<SceneToPanel>,
}

impl PanelBridgeHandle {
    /// Try to receive a message from the panel (non-blocking)
    pub fn try_recv(&self) -> Option<PanelToScene> {
        self.from_panel.try_recv().ok()
    }

    /// Send a message to the panel
    pub fn send(&self, msg: SceneToPanel) {
        let _ = self.to_panel.send(msg);
    }

    /// Try to receive a message addressed to the panel
    pub fn try_recv_for_panel(&self) -> Option<SceneToPanel> {
        self.to_panel_rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_arrive_in_order() {
        let (bridge, handle) = PanelBridge::new();
        bridge.set_param(ParamId::Roughness, ParamValue::Float(0.5));
        bridge.reset_params();

        assert!(matches!(
            handle.try_recv(),
            Some(PanelToScene::SetParam {
                id: ParamId::Roughness,
                ..
            })
        ));
        assert!(matches!(handle.try_recv(), Some(PanelToScene::ResetParams)));
        assert!(handle.try_recv().is_none());
    }

    #[test]
    fn test_scene_to_panel_round_trip() {
        let (_bridge, handle) = PanelBridge::new();
        handle.send(SceneToPanel::TexturesFailed {
            path: "x.jpg".into(),
            reason: "not found".into(),
        });
        assert!(matches!(
            handle.try_recv_for_panel(),
            Some(SceneToPanel::TexturesFailed { .. })
        ));
    }
}
