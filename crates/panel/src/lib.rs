//! Control panel for the Swatch preview pages
//!
//! [`ControlPanel`] is the widget binder: one controller per parameter,
//! listeners for widget input, in-place refresh for external updates.
//! [`PanelPlugin`] draws it with `bevy_ui` and talks to the scene over a
//! [`PanelBridge`].

mod binder;
mod bridge;
mod color;
mod controls;
mod widgets;

pub use binder::{ControlPanel, Controller, WidgetId};
pub use bridge::{PanelBridge, PanelBridgeHandle};
pub use color::{hsv_to_rgb, rgb_to_hsv, Hsv, HsvChannel};
pub use controls::{controls_for, standard_controls, ControlKind, ControlSpec, Folder};
pub use widgets::{
    drag_value, format_value, PanelDisplayChanged, PanelHover, PanelPlugin, PanelRoot, PanelState,
};
