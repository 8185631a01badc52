//! Scene plugins for the Swatch material preview pages
//!
//! Each page mounts a camera, a light rig, an optional ground and a
//! textured subject. All of it reads the shared [`ParamStore`], which the
//! control panel writes.

use bevy::prelude::*;
use swatch_ipc::SceneToPanel;

mod animation;
mod assembly;
mod camera;
mod displacement;
mod environment;
mod geometry;
mod ground;
mod lighting;
mod material;
mod obj;
mod pages;
mod presets;
mod store;
mod texture_ops;
mod textures;

pub use animation::{idle_yaw, IdleAnimationPlugin, IdleSpin};
pub use assembly::{ActivePreset, PageAssemblyPlugin, ParamOverrides};
pub use camera::{CameraControllerPlugin, CameraInputBlocked, MainCamera, OrbitCamera};
pub use displacement::{approach, DisplacementPlugin, HoverDisplacement};
pub use environment::EnvironmentPlugin;
pub use geometry::{rounded_box, subdivided_plane};
pub use lighting::{KeyLight, LightingPlugin};
pub use material::{PreviewSurface, SurfacePlugin, SurfaceState};
pub use obj::{parse_obj, ObjError, ObjLoader, ObjMesh};
pub use pages::PreviewPage;
pub use presets::{MaterialModel, PagePreset};
pub use store::ParamStore;
pub use textures::{TextureLoadError, TextureSet, TextureSlot};

/// Marker for everything a page spawns; despawned when the page unmounts
#[derive(Component, Debug, Default)]
pub struct PreviewEntity;

/// Marker for the textured subject mesh(es) of a page
#[derive(Component, Debug, Default)]
pub struct PreviewSubject;

/// Resource for queuing messages to send to the control panel.
/// The app crate drains this and forwards it over the panel bridge.
#[derive(Resource, Default)]
pub struct OutboundPanelMessages {
    pub messages: Vec<SceneToPanel>,
}

impl OutboundPanelMessages {
    /// Queue a message for the panel
    pub fn send(&mut self, msg: SceneToPanel) {
        self.messages.push(msg);
    }

    /// Take all queued messages, leaving the queue empty
    pub fn drain(&mut self) -> Vec<SceneToPanel> {
        std::mem::take(&mut self.messages)
    }
}

/// Everything needed to show the preview pages.
///
/// The initial page is whatever [`PreviewPage`] state the app inserts
/// before adding this plugin (the default page otherwise).
pub struct PreviewScenePlugin;

impl Plugin for PreviewScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<PreviewPage>();
        app.init_resource::<ParamStore>();
        app.init_resource::<OutboundPanelMessages>();
        app.init_asset_loader::<ObjLoader>();

        app.add_plugins(CameraControllerPlugin);
        app.add_plugins(LightingPlugin);
        app.add_plugins(EnvironmentPlugin);
        app.add_plugins(SurfacePlugin);
        app.add_plugins(DisplacementPlugin);
        app.add_plugins(IdleAnimationPlugin);
        app.add_plugins(PageAssemblyPlugin);
    }
}
