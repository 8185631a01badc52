//! Hotkey handling for Swatch
//!
//! - 1-5: Switch to the page at that position in the navigation bar
//! - R: Reset parameters to the page defaults
//! - P: Log the current parameters as JSON

use bevy::prelude::*;
use swatch_scene::{OutboundPanelMessages, ParamStore, PreviewPage};

use crate::sync::reset_to_defaults;

const PAGE_KEYS: [KeyCode; 5] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
];

/// Handle 1-5 for page switching
pub fn handle_page_hotkeys(
    key_input: Res<ButtonInput<KeyCode>>,
    current: Res<State<PreviewPage>>,
    mut next: ResMut<NextState<PreviewPage>>,
) {
    for (index, key) in PAGE_KEYS.iter().enumerate() {
        if !key_input.just_pressed(*key) {
            continue;
        }
        let Some(page) = PreviewPage::from_hotkey(index + 1) else {
            continue;
        };
        if page != *current.get() {
            info!("Switching to {} ({})", page.label(), page.route());
            next.set(page);
        }
    }
}

/// Handle R to restore page defaults
pub fn handle_reset_hotkey(
    key_input: Res<ButtonInput<KeyCode>>,
    current: Res<State<PreviewPage>>,
    mut store: ResMut<ParamStore>,
    mut outbound: ResMut<OutboundPanelMessages>,
) {
    if key_input.just_pressed(KeyCode::KeyR) && current.get().has_scene() {
        reset_to_defaults(&mut store, &mut outbound);
    }
}

/// Handle P to print the current parameters
pub fn handle_dump_hotkey(key_input: Res<ButtonInput<KeyCode>>, store: Res<ParamStore>) {
    if !key_input.just_pressed(KeyCode::KeyP) {
        return;
    }
    match serde_json::to_string_pretty(&store.params().to_flat_json()) {
        Ok(json) => info!("Current parameters:\n{json}"),
        Err(err) => error!("Could not serialize parameters: {err}"),
    }
}
