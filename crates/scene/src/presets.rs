//! Per-page scene descriptions and default parameters

use bevy::prelude::*;
use swatch_ipc::{
    CameraLimits, HexColor, LightingParams, MaterialParams, ParamId, SceneParams,
    TextureSelection,
};

use crate::pages::PreviewPage;
use crate::textures::{TextureSet, TextureSlot};

/// Mesh a page renders its material on
#[derive(Debug, Clone, PartialEq)]
pub enum SubjectShape {
    RoundedBox { size: Vec3, radius: f32, smoothness: u32 },
    Plane { width: f32, height: f32, columns: u32, rows: u32 },
    Sphere { radius: f32, sectors: u32, stacks: u32 },
    /// OBJ model path relative to the asset root
    Model { path: &'static str },
}

/// Displacement targets while the pointer is over / off the subject
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverTargets {
    pub over: f32,
    pub out: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectSpec {
    pub shape: SubjectShape,
    /// One entity per position; all share the mesh and material
    pub instances: Vec<Vec3>,
    pub idle_spin: bool,
    pub hover: Option<HoverTargets>,
}

/// Shading model of the subject material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialModel {
    Standard,
    /// Standard plus a clearcoat layer
    Physical,
}

/// A directional light with a fixed color and position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalSpec {
    pub color: HexColor,
    pub position: Vec3,
    /// Used by fixed lights only; fill and rim take the store's intensity
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSpec {
    pub color: HexColor,
    pub position: Vec3,
    pub intensity: f32,
    pub range: f32,
}

/// Which lights a page spawns. Ambient and key follow the store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LightRig {
    pub key: bool,
    pub fill: Option<DirectionalSpec>,
    pub rim: Option<DirectionalSpec>,
    pub accents: Vec<DirectionalSpec>,
    pub point: Option<PointSpec>,
}

/// Soft blob shadow under the subject
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactShadowSpec {
    pub opacity: f32,
    pub scale: f32,
    pub blur: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundSpec {
    Plane {
        y: f32,
        size: f32,
        color: HexColor,
        contact_shadow: Option<ContactShadowSpec>,
    },
    Slab {
        size: Vec3,
        color: HexColor,
    },
}

/// Prefiltered environment lighting presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentPreset {
    City,
    Sunset,
    Apartment,
}

impl EnvironmentPreset {
    fn name(self) -> &'static str {
        match self {
            EnvironmentPreset::City => "city",
            EnvironmentPreset::Sunset => "sunset",
            EnvironmentPreset::Apartment => "apartment",
        }
    }

    pub fn diffuse_path(self) -> String {
        format!("environment_maps/{}_diffuse_rgb9e5_zstd.ktx2", self.name())
    }

    pub fn specular_path(self) -> String {
        format!("environment_maps/{}_specular_rgb9e5_zstd.ktx2", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentSpec {
    pub preset: EnvironmentPreset,
    /// Also draw the map as the skybox
    pub background: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSpec {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

/// Everything needed to mount one preview page
#[derive(Debug, Clone, PartialEq)]
pub struct PagePreset {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub subject: SubjectSpec,
    pub material_model: MaterialModel,
    pub textures: TextureSet,
    pub lights: LightRig,
    pub ground: Option<GroundSpec>,
    pub environment: EnvironmentSpec,
    pub camera: CameraSpec,
    pub defaults: SceneParams,
    /// Parameters exposed in the control panel; empty hides the panel
    pub controls: Vec<ParamId>,
}

const DARK_GROUND: HexColor = HexColor::rgb(0x1a, 0x1a, 0x1a);

const LIGHTING_CONTROLS: [ParamId; 8] = [
    ParamId::AmbientIntensity,
    ParamId::KeyIntensity,
    ParamId::KeyColor,
    ParamId::FillIntensity,
    ParamId::RimIntensity,
    ParamId::KeyLightX,
    ParamId::KeyLightY,
    ParamId::KeyLightZ,
];

const MATERIAL_CONTROLS: [ParamId; 7] = [
    ParamId::Roughness,
    ParamId::Metalness,
    ParamId::AoMapIntensity,
    ParamId::DisplacementScale,
    ParamId::EnvMapIntensity,
    ParamId::AlphaTest,
    ParamId::NormalScale,
];

impl PagePreset {
    /// Preset for a page, or `None` for pages without a 3D scene
    pub fn for_page(page: PreviewPage) -> Option<Self> {
        match page {
            PreviewPage::Window1 => Some(Self::window1()),
            PreviewPage::Flowers => Some(Self::flowers()),
            PreviewPage::Colombia => Some(Self::colombia()),
            PreviewPage::Waiting1 => Some(Self::waiting1()),
            PreviewPage::Separate | PreviewPage::Placeholder => None,
        }
    }

    fn window1() -> Self {
        let mut controls = LIGHTING_CONTROLS.to_vec();
        controls.extend(MATERIAL_CONTROLS);
        controls.extend([
            ParamId::MinDistance,
            ParamId::MaxDistance,
            ParamId::MaxPolarAngle,
        ]);

        Self {
            title: "Photo Mapping Materials Test",
            subtitle: "Explore and tweak the 3D window material and lighting in real time.",
            subject: SubjectSpec {
                shape: SubjectShape::RoundedBox {
                    size: Vec3::ONE,
                    radius: 0.1,
                    smoothness: 8,
                },
                instances: vec![Vec3::new(0.0, 0.5, 0.0)],
                idle_spin: true,
                hover: None,
            },
            material_model: MaterialModel::Standard,
            textures: TextureSet::material_folder("window1_metallicSquare/", ".jpg", &TextureSlot::ALL),
            lights: LightRig {
                key: true,
                fill: Some(DirectionalSpec {
                    color: HexColor::rgb(0x88, 0xbb, 0xff),
                    position: Vec3::new(-6.0, 8.0, -4.0),
                    intensity: 0.0,
                }),
                rim: Some(DirectionalSpec {
                    color: HexColor::rgb(0xff, 0xbb, 0x66),
                    position: Vec3::new(2.0, 3.0, -8.0),
                    intensity: 0.0,
                }),
                accents: vec![
                    DirectionalSpec {
                        color: HexColor::WHITE,
                        position: Vec3::new(-8.0, 5.0, 2.0),
                        intensity: 0.4,
                    },
                    DirectionalSpec {
                        color: HexColor::rgb(0xff, 0xdd, 0xaa),
                        position: Vec3::new(8.0, 3.0, -2.0),
                        intensity: 0.3,
                    },
                ],
                point: Some(PointSpec {
                    color: HexColor::WHITE,
                    position: Vec3::new(2.0, 3.0, 3.0),
                    intensity: 0.8,
                    range: 10.0,
                }),
            },
            ground: Some(GroundSpec::Plane {
                y: 0.0,
                size: 10.0,
                color: DARK_GROUND,
                contact_shadow: Some(ContactShadowSpec {
                    opacity: 0.5,
                    scale: 3.0,
                    blur: 2.0,
                }),
            }),
            environment: EnvironmentSpec {
                preset: EnvironmentPreset::City,
                background: false,
            },
            camera: CameraSpec {
                position: Vec3::new(7.0, 7.0, 5.0),
                target: Vec3::ZERO,
                fov_degrees: 25.0,
                near: 0.1,
                far: 100.0,
            },
            defaults: SceneParams::default(),
            controls,
        }
    }

    fn flowers() -> Self {
        let mut controls = LIGHTING_CONTROLS.to_vec();
        controls.extend(MATERIAL_CONTROLS);
        controls.extend([
            ParamId::TextureRepeat,
            ParamId::AlbedoVariant,
            ParamId::NormalVariant,
            ParamId::DisplacementVariant,
        ]);

        Self {
            title: "Flowers Plane",
            subtitle: "PBR textured plane with displacement mapping",
            subject: SubjectSpec {
                shape: SubjectShape::Plane {
                    width: 16.0,
                    height: 9.0,
                    columns: 512,
                    rows: 288,
                },
                instances: vec![Vec3::ZERO],
                idle_spin: false,
                hover: None,
            },
            material_model: MaterialModel::Standard,
            textures: TextureSet::new()
                .with_variants(
                    TextureSlot::BaseColor,
                    &["flowersTextures/albedoOG.png", "flowersTextures/AI_color.png"],
                )
                .with_variants(
                    TextureSlot::Normal,
                    &[
                        "flowersTextures/normalsColored.png",
                        "flowersTextures/normalsEmboss.png",
                    ],
                )
                .with(TextureSlot::Roughness, "flowersTextures/roughness.png")
                .with(TextureSlot::AmbientOcclusion, "flowersTextures/AO_depth.png")
                .with_variants(
                    TextureSlot::Height,
                    &[
                        "flowersTextures/displacementGrayscale.png",
                        "flowersTextures/Blur.png",
                    ],
                ),
            lights: LightRig {
                key: true,
                fill: Some(DirectionalSpec {
                    color: HexColor::WHITE,
                    position: Vec3::new(-5.0, 5.0, -5.0),
                    intensity: 0.0,
                }),
                ..default()
            },
            ground: None,
            environment: EnvironmentSpec {
                preset: EnvironmentPreset::Sunset,
                background: true,
            },
            camera: CameraSpec {
                position: Vec3::new(8.0, 6.0, 8.0),
                target: Vec3::ZERO,
                fov_degrees: 45.0,
                near: 0.1,
                far: 1000.0,
            },
            defaults: SceneParams {
                lighting: LightingParams {
                    ambient_intensity: 0.4,
                    key_intensity: 1.5,
                    key_color: HexColor::WHITE,
                    key_position: [10.0, 10.0, 5.0],
                    fill_intensity: 0.3,
                    rim_intensity: 0.0,
                },
                material: MaterialParams {
                    roughness: 0.8,
                    metalness: 0.1,
                    ao_map_intensity: 1.2,
                    displacement_scale: 0.3,
                    displacement_bias: -0.1,
                    env_map_intensity: 0.5,
                    alpha_test: 0.1,
                    normal_scale: 4.0,
                    texture_repeat: 1.0,
                },
                camera: CameraLimits {
                    damping: Some(0.05),
                    ..CameraLimits::free()
                },
                textures: TextureSelection::default(),
            },
            controls,
        }
    }

    fn colombia() -> Self {
        Self {
            title: "Marbles",
            subtitle: "Clearcoat marbles resting on a wooden floor",
            subject: SubjectSpec {
                shape: SubjectShape::Sphere {
                    radius: 0.5,
                    sectors: 32,
                    stacks: 32,
                },
                // Resting on the floor: centers sit one radius up
                instances: [
                    [0.0, 0.0],
                    [2.0, 1.0],
                    [-1.5, -0.5],
                    [1.0, -2.0],
                    [-2.0, 1.5],
                    [0.5, 0.8],
                    [-1.0, -1.2],
                    [2.5, 0.3],
                ]
                .into_iter()
                .map(|[x, z]| Vec3::new(x, 0.5, z))
                .collect(),
                idle_spin: false,
                hover: None,
            },
            material_model: MaterialModel::Physical,
            textures: TextureSet::material_folder(
                "colombiaTexture/colombiaMaterial/colombiaMaterial_",
                ".jpg",
                &TextureSlot::ALL,
            ),
            lights: LightRig {
                key: true,
                fill: Some(DirectionalSpec {
                    color: HexColor::WHITE,
                    position: Vec3::new(-5.0, 5.0, -5.0),
                    intensity: 0.0,
                }),
                ..default()
            },
            ground: Some(GroundSpec::Slab {
                size: Vec3::new(20.0, 0.5, 20.0),
                color: HexColor::rgb(0xd2, 0x69, 0x1e),
            }),
            environment: EnvironmentSpec {
                preset: EnvironmentPreset::Apartment,
                background: true,
            },
            camera: CameraSpec {
                position: Vec3::new(15.0, 10.0, 15.0),
                target: Vec3::ZERO,
                fov_degrees: 45.0,
                near: 0.1,
                far: 1000.0,
            },
            defaults: SceneParams {
                lighting: LightingParams {
                    ambient_intensity: 0.4,
                    key_intensity: 1.5,
                    key_color: HexColor::WHITE,
                    key_position: [10.0, 10.0, 5.0],
                    fill_intensity: 0.5,
                    rim_intensity: 0.0,
                },
                material: MaterialParams::default(),
                camera: CameraLimits {
                    damping: Some(0.05),
                    ..CameraLimits::free()
                },
                textures: TextureSelection::default(),
            },
            controls: Vec::new(),
        }
    }

    fn waiting1() -> Self {
        Self {
            title: "Waiting Model",
            subtitle: "3D model visualization with matcap material",
            subject: SubjectSpec {
                shape: SubjectShape::Model {
                    path: "models/Waiting1_.obj",
                },
                instances: vec![Vec3::ZERO],
                idle_spin: true,
                hover: Some(HoverTargets {
                    over: 0.7,
                    out: 0.001,
                }),
            },
            material_model: MaterialModel::Standard,
            textures: TextureSet::new()
                .with(TextureSlot::BaseColor, "models/matcap-revised (1).png")
                .with(TextureSlot::Normal, "waitingMaterial/waitingMaterial_Normal.jpg")
                .with(TextureSlot::Roughness, "waitingMaterial/waitingMaterial_Roughness.jpg")
                .with(TextureSlot::Metallic, "waitingMaterial/waitingMaterial_Metallic.jpg")
                .with(
                    TextureSlot::AmbientOcclusion,
                    "waitingMaterial/waitingMaterial_AmbientOcclusion.jpg",
                )
                .with(TextureSlot::Height, "waitingMaterial/waitingMaterial_Height.jpg")
                .with(TextureSlot::Opacity, "waitingMaterial/waitingMaterial_Opacity.jpg"),
            lights: LightRig {
                point: Some(PointSpec {
                    color: HexColor::rgb(0xff, 0xf8, 0xb0),
                    position: Vec3::new(0.0, 0.1, 0.5),
                    intensity: 13.0,
                    range: 20.0,
                }),
                ..default()
            },
            ground: Some(GroundSpec::Plane {
                y: -1.0,
                size: 10.0,
                color: DARK_GROUND,
                contact_shadow: None,
            }),
            environment: EnvironmentSpec {
                preset: EnvironmentPreset::Sunset,
                background: false,
            },
            camera: CameraSpec {
                position: Vec3::new(0.0, 0.0, 15.0),
                target: Vec3::ZERO,
                fov_degrees: 10.0,
                near: 0.1,
                far: 100.0,
            },
            defaults: SceneParams {
                lighting: LightingParams {
                    ambient_intensity: 0.0,
                    key_intensity: 0.0,
                    fill_intensity: 0.0,
                    rim_intensity: 0.0,
                    ..LightingParams::default()
                },
                material: MaterialParams {
                    roughness: 0.4,
                    metalness: 0.2,
                    ao_map_intensity: 1.5,
                    displacement_scale: 0.03,
                    displacement_bias: 0.0,
                    env_map_intensity: 1.0,
                    alpha_test: 0.0,
                    normal_scale: 1.0,
                    texture_repeat: 1.0,
                },
                camera: CameraLimits::free(),
                textures: TextureSelection::default(),
            },
            controls: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_pages_have_presets() {
        for page in PreviewPage::ALL {
            assert_eq!(PagePreset::for_page(page).is_some(), page.has_scene(), "{page:?}");
        }
    }

    #[test]
    fn test_window1_defaults() {
        let preset = PagePreset::for_page(PreviewPage::Window1).unwrap();
        let material = preset.defaults.material;
        assert_eq!(material.roughness, 0.3);
        assert_eq!(material.ao_map_intensity, 1.5);
        assert_eq!(preset.defaults.lighting.key_position, [8.0, 12.0, 6.0]);
        assert_eq!(preset.textures.sources().len(), 8);
        assert_eq!(preset.controls.len(), 18);
    }

    #[test]
    fn test_flowers_offers_texture_variants() {
        let preset = PagePreset::for_page(PreviewPage::Flowers).unwrap();
        assert_eq!(preset.textures.variant_count(TextureSlot::BaseColor), 2);
        assert_eq!(preset.textures.variant_count(TextureSlot::Height), 2);
        assert_eq!(preset.defaults.material.displacement_bias, -0.1);
        assert_eq!(preset.defaults.camera.damping, Some(0.05));
        assert!(preset.controls.contains(&ParamId::TextureRepeat));
    }

    #[test]
    fn test_colombia_marbles_rest_on_floor() {
        let preset = PagePreset::for_page(PreviewPage::Colombia).unwrap();
        assert_eq!(preset.subject.instances.len(), 8);
        assert!(preset.subject.instances.iter().all(|p| p.y == 0.5));
        assert_eq!(preset.material_model, MaterialModel::Physical);
        assert!(preset.controls.is_empty());
        assert!(!preset.subtitle.contains("tilt"));
    }

    #[test]
    fn test_page_defaults_are_within_ranges() {
        for page in PreviewPage::ALL {
            let Some(preset) = PagePreset::for_page(page) else {
                continue;
            };
            for id in ParamId::ALL {
                let value = preset.defaults.get(id);
                assert_eq!(id.constrain(value), value, "{page:?} {id}");
            }
        }
    }

    #[test]
    fn test_waiting_hover_targets() {
        let preset = PagePreset::for_page(PreviewPage::Waiting1).unwrap();
        let hover = preset.subject.hover.unwrap();
        assert_eq!(hover.over, 0.7);
        assert_eq!(hover.out, 0.001);
        assert_eq!(preset.defaults.material.displacement_scale, 0.03);
    }

    #[test]
    fn test_environment_paths() {
        assert_eq!(
            EnvironmentPreset::City.specular_path(),
            "environment_maps/city_specular_rgb9e5_zstd.ktx2"
        );
    }
}
