//! Keyboard shortcuts and pointer routing between panel and camera

use bevy::input::InputSystems;
use bevy::prelude::*;
use swatch_panel::PanelHover;
use swatch_scene::CameraInputBlocked;

mod hotkeys;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PreUpdate,
            (
                hotkeys::handle_page_hotkeys,
                hotkeys::handle_reset_hotkey,
                hotkeys::handle_dump_hotkey,
            )
                .after(InputSystems),
        )
        .add_systems(Update, block_camera_under_panel);

        info!("Input plugin initialized");
    }
}

/// Drags and scrolls over the panel belong to the panel, not the camera
fn block_camera_under_panel(hover: Res<PanelHover>, mut blocked: ResMut<CameraInputBlocked>) {
    if blocked.0 != hover.0 {
        blocked.0 = hover.0;
    }
}
