//! Parameter model and message protocol for Swatch
//!
//! Defines the tunable preview parameters shared by the control panel
//! and the Bevy scene, plus the messages exchanged between them.

mod error;
mod messages;
mod params;
mod store;
mod types;

pub use error::ParamError;
pub use messages::{PanelToScene, SceneToPanel};
pub use params::{HexColor, ParamGroup, ParamId, ParamKind, ParamRange, ParamValue};
pub use store::SceneParams;
pub use types::*;
