//! Swatch - interactive PBR material preview pages built on Bevy

use bevy::prelude::*;
use bevy::window::WindowResolution;
use swatch_config::{DisplayConfig, PreviewConfig};
use swatch_panel::PanelPlugin;
use swatch_scene::{ParamOverrides, PreviewPage, PreviewScenePlugin};

mod input;
mod navigation;
mod sync;

fn main() {
    // Startup options from the command line and environment
    let preview_config = PreviewConfig::from_env();

    // Display configuration - single source of truth for window size
    let display_config = DisplayConfig::default();

    let initial_page = PreviewPage::from_route(&preview_config.initial_route);

    let window_config = Window {
        title: "Swatch".into(),
        resolution: WindowResolution::new(display_config.width, display_config.height),
        present_mode: bevy::window::PresentMode::AutoVsync,
        ..default()
    };

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(window_config),
                ..default()
            })
            .set(AssetPlugin {
                file_path: preview_config.asset_root.to_string_lossy().into_owned(),
                ..default()
            })
            .set(bevy::log::LogPlugin {
                level: bevy::log::Level::INFO,
                ..default()
            }),
    );

    info!(
        "Starting Swatch on {} (assets: {})",
        preview_config.initial_route,
        preview_config.asset_root.display()
    );

    match preview_config.read_overrides() {
        Ok(Some(json)) => {
            app.insert_resource(ParamOverrides(json));
        }
        Ok(None) => {}
        Err(err) => warn!("Parameter overrides not loaded: {err}"),
    }

    app.insert_resource(ClearColor(Color::srgb_u8(0x1a, 0x1a, 0x1a)))
        .insert_resource(display_config)
        .insert_resource(preview_config)
        .insert_state(initial_page)
        .add_plugins(PreviewScenePlugin)
        .add_plugins(PanelPlugin)
        .add_plugins(sync::PanelSyncPlugin)
        .add_plugins(navigation::NavigationPlugin)
        .add_plugins(input::InputPlugin)
        .run();
}
