//! Panel bridge plumbing between the control panel and the parameter store

use bevy::prelude::*;
use swatch_ipc::{PanelToScene, SceneToPanel};
use swatch_panel::PanelBridgeHandle;
use swatch_scene::{OutboundPanelMessages, ParamStore};

pub struct PanelSyncPlugin;

impl Plugin for PanelSyncPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreUpdate, apply_panel_messages)
            .add_systems(PostUpdate, forward_outbound_messages);
    }
}

/// Apply widget changes to the store. Runs before the scene reads it.
fn apply_panel_messages(
    handle: Res<PanelBridgeHandle>,
    mut store: ResMut<ParamStore>,
    mut outbound: ResMut<OutboundPanelMessages>,
) {
    while let Some(msg) = handle.try_recv() {
        match msg {
            PanelToScene::SetParam { id, value } => {
                if let Err(err) = store.set(id, value) {
                    warn!("Rejected panel change: {err}");
                }
            }
            PanelToScene::ResetParams => reset_to_defaults(&mut store, &mut outbound),
        }
    }
}

/// Restore page defaults and tell the panel, since this change did not come from it
pub fn reset_to_defaults(store: &mut ParamStore, outbound: &mut OutboundPanelMessages) {
    let changed = store.reset();
    if changed.is_empty() {
        return;
    }
    info!("Reset {} parameters to page defaults", changed.len());
    outbound.send(SceneToPanel::ParamsChanged(*store.params()));
}

fn forward_outbound_messages(
    handle: Res<PanelBridgeHandle>,
    mut outbound: ResMut<OutboundPanelMessages>,
) {
    if outbound.messages.is_empty() {
        return;
    }
    for msg in outbound.drain() {
        handle.send(msg);
    }
}
