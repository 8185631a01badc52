//! Control descriptions: which widget edits which parameter, and its range.

use swatch_ipc::{ParamGroup, ParamId, ParamKind, ParamRange};

/// Panel section a control is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Folder {
    Lighting,
    Material,
    Camera,
    Textures,
}

impl Folder {
    pub const ALL: [Folder; 4] = [
        Folder::Lighting,
        Folder::Material,
        Folder::Camera,
        Folder::Textures,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Folder::Lighting => "Lighting",
            Folder::Material => "Material",
            Folder::Camera => "Camera",
            Folder::Textures => "Textures",
        }
    }
}

impl From<ParamGroup> for Folder {
    fn from(group: ParamGroup) -> Self {
        match group {
            ParamGroup::Lighting => Folder::Lighting,
            ParamGroup::Material => Folder::Material,
            ParamGroup::Camera => Folder::Camera,
            ParamGroup::Textures => Folder::Textures,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Slider(ParamRange),
    Color,
    /// Cycles through the labelled options; the value is the option index
    Choice(Vec<&'static str>),
}

/// One widget in the panel
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSpec {
    pub id: ParamId,
    pub label: &'static str,
    pub folder: Folder,
    pub kind: ControlKind,
}

impl ControlSpec {
    /// The widget for `id`: a slider over its range, a color picker, or a
    /// choice over its labelled options
    pub fn for_param(id: ParamId) -> Self {
        let (label, kind) = match (id.range(), id.kind()) {
            (Some(range), _) => (id.key(), ControlKind::Slider(range)),
            (None, ParamKind::Color) => (id.key(), ControlKind::Color),
            (None, _) => {
                let (label, options) = choice_options(id);
                (label, ControlKind::Choice(options.to_vec()))
            }
        };
        Self {
            id,
            label,
            folder: id.group().into(),
            kind,
        }
    }
}

fn choice_options(id: ParamId) -> (&'static str, &'static [&'static str]) {
    match id {
        ParamId::AlbedoVariant => ("albedo", &["Original (vibrant)", "AI color (muted)"]),
        ParamId::NormalVariant => ("normal", &["Colored", "Emboss"]),
        _ => ("displacement", &["Grayscale (sharp)", "Blur (smooth)"]),
    }
}

/// Every control the panel knows, in display order
pub fn standard_controls() -> Vec<ControlSpec> {
    ParamId::ALL.into_iter().map(ControlSpec::for_param).collect()
}

/// The standard controls for `ids`, in the order given
pub fn controls_for(ids: &[ParamId]) -> Vec<ControlSpec> {
    ids.iter().copied().map(ControlSpec::for_param).collect()
}
