//! Bevy UI rendering of the control panel.
//!
//! Controls:
//! - Slider: drag horizontally; the value moves by pointer delta from where
//!   the drag started and snaps to the slider step
//! - Color: drag the hue, saturation or value strip
//! - Choice: click to cycle options
//! - Reset: restore the page defaults
//!
//! Widgets are spawned when a page with controls mounts and mutated in
//! place afterwards. Only [`PanelDisplayChanged`] triggers visual updates.

use std::collections::HashMap;

use bevy::picking::Pickable;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use swatch_ipc::{ParamId, ParamRange, ParamValue, SceneToPanel};
use swatch_scene::{ActivePreset, ParamStore, PreviewPage};

use crate::binder::ControlPanel;
use crate::bridge::{PanelBridge, PanelBridgeHandle};
use crate::color::{Hsv, HsvChannel};
use crate::controls::{controls_for, ControlKind, ControlSpec, Folder};

/// Track width used when layout has not produced a size yet
const FALLBACK_TRACK_WIDTH: f32 = 200.0;

const PANEL_WIDTH: f32 = 320.0;
const LABEL_WIDTH: f32 = 120.0;
const VALUE_WIDTH: f32 = 64.0;
const TRACK_HEIGHT: f32 = 14.0;
const THUMB_WIDTH: f32 = 8.0;

const PANEL_BACKGROUND: Color = Color::srgba(0.08, 0.08, 0.1, 0.85);
const TRACK_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.1);
const THUMB_COLOR: Color = Color::WHITE;
const LABEL_COLOR: Color = Color::srgb(0.75, 0.75, 0.75);
const HEADING_COLOR: Color = Color::WHITE;
const ERROR_COLOR: Color = Color::srgb(1.0, 0.45, 0.4);

/// A widget's displayed value changed and its visuals must follow
#[derive(Message, Debug, Clone, Copy)]
pub struct PanelDisplayChanged(pub ParamId);

/// Whether the pointer is over (or dragging in) the panel
#[derive(Resource, Debug, Default)]
pub struct PanelHover(pub bool);

/// The mounted binder and the channel its listeners write to
#[derive(Resource)]
pub struct PanelState {
    pub panel: ControlPanel,
    bridge: PanelBridge,
    mounted_for: Option<PreviewPage>,
    /// Picker state of each color control
    colors: HashMap<ParamId, Hsv>,
}

impl PanelState {
    /// Picker state for `param`, derived from its color if none is kept
    fn hsv(&self, param: ParamId) -> Option<Hsv> {
        if let Some(hsv) = self.colors.get(&param) {
            return Some(*hsv);
        }
        match self.panel.displayed(param)? {
            ParamValue::Color(color) => Some(Hsv::from_color(color)),
            _ => None,
        }
    }
}

#[derive(Component)]
pub struct PanelRoot;

/// Any panel node that reacts to the pointer
#[derive(Component)]
struct PanelElement;

#[derive(Component)]
struct SliderTrack {
    param: ParamId,
    range: ParamRange,
}

#[derive(Component)]
struct SliderThumb {
    param: ParamId,
    range: ParamRange,
}

#[derive(Component)]
struct ColorStrip {
    param: ParamId,
    channel: HsvChannel,
}

#[derive(Component)]
struct ColorStripThumb {
    param: ParamId,
    channel: HsvChannel,
}

#[derive(Component)]
struct ColorSwatch {
    param: ParamId,
}

#[derive(Component)]
struct ChoiceButton {
    param: ParamId,
}

#[derive(Component)]
struct ValueText {
    param: ParamId,
}

#[derive(Component)]
struct StatusText;

#[derive(Component)]
struct ResetButton;

#[derive(Debug, Clone, Copy)]
enum DragKind {
    Slider { range: ParamRange, start_value: f32 },
    Strip { channel: HsvChannel, start: Hsv },
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    param: ParamId,
    kind: DragKind,
    start_x: f32,
    width: f32,
}

/// The widget currently being dragged
#[derive(Resource, Debug, Default)]
struct ActiveDrag(Option<Drag>);

/// Slider value after dragging `delta_px` on a track `width_px` wide
pub fn drag_value(range: &ParamRange, start_value: f32, delta_px: f32, width_px: f32) -> f32 {
    let width = if width_px > 0.0 {
        width_px
    } else {
        FALLBACK_TRACK_WIDTH
    };
    range.snap(start_value + delta_px / width * range.span())
}

/// Number of decimals implied by a step (0.01 shows two)
fn step_decimals(step: f32) -> usize {
    if step <= 0.0 || step >= 1.0 {
        return 0;
    }
    (-step.log10() - 1e-4).ceil().clamp(0.0, 6.0) as usize
}

/// Text shown next to a widget
pub fn format_value(spec: &ControlSpec, value: ParamValue) -> String {
    match (&spec.kind, value) {
        (ControlKind::Slider(range), ParamValue::Float(v)) => {
            format!("{v:.*}", step_decimals(range.step))
        }
        (ControlKind::Choice(options), ParamValue::Choice(i)) => {
            options.get(i).copied().unwrap_or("?").to_string()
        }
        (_, ParamValue::Color(c)) => c.to_string(),
        (_, other) => format!("{other:?}"),
    }
}

pub struct PanelPlugin;

impl Plugin for PanelPlugin {
    fn build(&self, app: &mut App) {
        let (bridge, handle) = PanelBridge::new();

        app.insert_resource(PanelState {
            panel: ControlPanel::default(),
            bridge,
            mounted_for: None,
            colors: HashMap::new(),
        })
        .insert_resource(handle)
        .init_resource::<PanelHover>()
        .init_resource::<ActiveDrag>()
        .add_message::<PanelDisplayChanged>()
        .add_systems(
            Update,
            (
                sync_panel_mount,
                receive_scene_messages.after(sync_panel_mount),
                start_drag.after(sync_panel_mount),
                update_drag.after(start_drag),
                cycle_choices.after(sync_panel_mount),
                press_reset.after(sync_panel_mount),
                refresh_widgets
                    .after(receive_scene_messages)
                    .after(update_drag)
                    .after(cycle_choices),
                update_panel_hover.after(update_drag),
            ),
        );
    }
}

/// Spawn the panel when a page with controls mounts, despawn it on unmount
fn sync_panel_mount(
    mut commands: Commands,
    preset: Option<Res<ActivePreset>>,
    store: Res<ParamStore>,
    mut state: ResMut<PanelState>,
    roots: Query<Entity, With<PanelRoot>>,
) {
    let page = preset.as_ref().map(|p| p.page);
    if page == state.mounted_for {
        return;
    }

    for root in roots.iter() {
        commands.entity(root).despawn();
    }
    state.panel.dispose();
    state.colors.clear();
    state.mounted_for = page;

    let Some(preset) = preset else {
        return;
    };
    let specs = controls_for(&preset.preset.controls);
    if specs.is_empty() {
        return;
    }

    let mut panel = ControlPanel::mount(&specs, store.params());
    for spec in &specs {
        let bridge = state.bridge.clone();
        panel.on_change(spec.id, move |id, value| bridge.set_param(id, value));
    }
    for controller in panel.controllers() {
        if let ParamValue::Color(color) = controller.displayed() {
            state.colors.insert(controller.spec.id, Hsv::from_color(color));
        }
    }
    spawn_panel(&mut commands, &panel);
    info!("Control panel mounted with {} controls", specs.len());
    state.panel = panel;
}

fn label_font() -> TextFont {
    TextFont {
        font_size: 12.0,
        ..default()
    }
}

fn spawn_panel(commands: &mut Commands, panel: &ControlPanel) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(48.0),
                right: Val::Px(12.0),
                width: Val::Px(PANEL_WIDTH),
                max_height: Val::Percent(90.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(12.0)),
                row_gap: Val::Px(6.0),
                overflow: Overflow::clip(),
                ..default()
            },
            BackgroundColor(PANEL_BACKGROUND),
            Interaction::default(),
            PanelElement,
            PanelRoot,
            Name::new("Control Panel"),
        ))
        .with_children(|root| {
            for folder in Folder::ALL {
                let controllers: Vec<_> = panel
                    .controllers()
                    .iter()
                    .filter(|c| c.spec.folder == folder)
                    .collect();
                if controllers.is_empty() {
                    continue;
                }

                root.spawn((
                    Text::new(folder.title()),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(HEADING_COLOR),
                    Node {
                        margin: UiRect::top(Val::Px(6.0)),
                        ..default()
                    },
                    Pickable::IGNORE,
                ));

                for controller in controllers {
                    spawn_control(root, &controller.spec, controller.displayed());
                }
            }

            root.spawn((
                Node {
                    margin: UiRect::top(Val::Px(8.0)),
                    padding: UiRect::axes(Val::Px(10.0), Val::Px(4.0)),
                    align_self: AlignSelf::FlexStart,
                    ..default()
                },
                BackgroundColor(TRACK_COLOR),
                Button,
                PanelElement,
                ResetButton,
            ))
            .with_child((
                Text::new("Reset"),
                label_font(),
                TextColor(HEADING_COLOR),
                Pickable::IGNORE,
            ));

            root.spawn((
                Text::new(""),
                label_font(),
                TextColor(ERROR_COLOR),
                StatusText,
                Pickable::IGNORE,
            ));
        });
}

fn row_node() -> Node {
    Node {
        flex_direction: FlexDirection::Row,
        align_items: AlignItems::Center,
        column_gap: Val::Px(8.0),
        ..default()
    }
}

fn spawn_control(parent: &mut ChildSpawnerCommands, spec: &ControlSpec, value: ParamValue) {
    let param = spec.id;
    parent
        .spawn((row_node(), Pickable::IGNORE))
        .with_children(|row| {
            row.spawn((
                Text::new(spec.label),
                label_font(),
                TextColor(LABEL_COLOR),
                Node {
                    width: Val::Px(LABEL_WIDTH),
                    ..default()
                },
                Pickable::IGNORE,
            ));

            match (&spec.kind, value) {
                (ControlKind::Slider(range), ParamValue::Float(v)) => {
                    spawn_track(
                        row,
                        SliderTrack {
                            param,
                            range: *range,
                        },
                        SliderThumb {
                            param,
                            range: *range,
                        },
                        range.normalize(v),
                    );
                }
                (ControlKind::Color, ParamValue::Color(c)) => {
                    row.spawn((
                        Node {
                            flex_grow: 1.0,
                            height: Val::Px(TRACK_HEIGHT),
                            ..default()
                        },
                        BackgroundColor(Color::srgb_u8(c.0[0], c.0[1], c.0[2])),
                        ColorSwatch { param },
                        Pickable::IGNORE,
                    ));
                }
                (ControlKind::Choice(_), _) => {
                    row.spawn((
                        Node {
                            flex_grow: 1.0,
                            height: Val::Px(TRACK_HEIGHT + 4.0),
                            justify_content: JustifyContent::Center,
                            ..default()
                        },
                        BackgroundColor(TRACK_COLOR),
                        Button,
                        PanelElement,
                        ChoiceButton { param },
                    ))
                    .with_child((
                        Text::new("next"),
                        label_font(),
                        TextColor(LABEL_COLOR),
                        Pickable::IGNORE,
                    ));
                }
                _ => {
                    row.spawn(Node {
                        flex_grow: 1.0,
                        ..default()
                    });
                }
            }

            row.spawn((
                Text::new(format_value(spec, value)),
                label_font(),
                TextColor(LABEL_COLOR),
                Node {
                    width: Val::Px(VALUE_WIDTH),
                    ..default()
                },
                ValueText { param },
                Pickable::IGNORE,
            ));
        });

    if let (ControlKind::Color, ParamValue::Color(color)) = (&spec.kind, value) {
        for channel in HsvChannel::ALL {
            parent
                .spawn((row_node(), Pickable::IGNORE))
                .with_children(|row| {
                    let name = match channel {
                        HsvChannel::Hue => "  hue",
                        HsvChannel::Saturation => "  saturation",
                        HsvChannel::Value => "  value",
                    };
                    row.spawn((
                        Text::new(name),
                        label_font(),
                        TextColor(LABEL_COLOR),
                        Node {
                            width: Val::Px(LABEL_WIDTH),
                            ..default()
                        },
                        Pickable::IGNORE,
                    ));
                    spawn_track(
                        row,
                        ColorStrip { param, channel },
                        ColorStripThumb { param, channel },
                        Hsv::from_color(color).position(channel),
                    );
                    row.spawn(Node {
                        width: Val::Px(VALUE_WIDTH),
                        ..default()
                    });
                });
        }
    }
}

fn spawn_track(
    row: &mut ChildSpawnerCommands,
    track: impl Component,
    thumb: impl Component,
    position: f32,
) {
    row.spawn((
        Node {
            flex_grow: 1.0,
            height: Val::Px(TRACK_HEIGHT),
            ..default()
        },
        BackgroundColor(TRACK_COLOR),
        Interaction::default(),
        PanelElement,
        track,
    ))
    .with_children(|track| {
        track.spawn((
            Node {
                position_type: PositionType::Absolute,
                left: thumb_left(position),
                width: Val::Px(THUMB_WIDTH),
                height: Val::Percent(100.0),
                ..default()
            },
            BackgroundColor(THUMB_COLOR),
            thumb,
            Pickable::IGNORE,
        ));
    });
}

fn thumb_left(position: f32) -> Val {
    Val::Percent(position.clamp(0.0, 1.0) * 100.0)
}

fn cursor_x(windows: &Query<&Window, With<PrimaryWindow>>) -> Option<f32> {
    windows.single().ok()?.cursor_position().map(|p| p.x)
}

fn track_width(node: &ComputedNode) -> f32 {
    node.size().x * node.inverse_scale_factor()
}

fn start_drag(
    mut drag: ResMut<ActiveDrag>,
    state: Res<PanelState>,
    windows: Query<&Window, With<PrimaryWindow>>,
    sliders: Query<(&Interaction, &SliderTrack, &ComputedNode), Changed<Interaction>>,
    strips: Query<(&Interaction, &ColorStrip, &ComputedNode), Changed<Interaction>>,
) {
    let Some(start_x) = cursor_x(&windows) else {
        return;
    };

    for (interaction, track, node) in sliders.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }
        let Some(ParamValue::Float(start_value)) = state.panel.displayed(track.param) else {
            continue;
        };
        drag.0 = Some(Drag {
            param: track.param,
            kind: DragKind::Slider {
                range: track.range,
                start_value,
            },
            start_x,
            width: track_width(node),
        });
    }

    for (interaction, strip, node) in strips.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }
        let Some(start) = state.hsv(strip.param) else {
            continue;
        };
        drag.0 = Some(Drag {
            param: strip.param,
            kind: DragKind::Strip {
                channel: strip.channel,
                start,
            },
            start_x,
            width: track_width(node),
        });
    }
}

fn update_drag(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut drag: ResMut<ActiveDrag>,
    mut state: ResMut<PanelState>,
    mut changed: MessageWriter<PanelDisplayChanged>,
) {
    let Some(active) = drag.0 else {
        return;
    };
    if !mouse_button.pressed(MouseButton::Left) {
        drag.0 = None;
        return;
    }
    let Some(x) = cursor_x(&windows) else {
        return;
    };
    let delta = x - active.start_x;

    match active.kind {
        DragKind::Slider { range, start_value } => {
            let value = ParamValue::Float(drag_value(&range, start_value, delta, active.width));
            if state.panel.displayed(active.param) == Some(value) {
                return;
            }
            if state.panel.input(active.param, value).is_some() {
                changed.write(PanelDisplayChanged(active.param));
            }
        }
        DragKind::Strip { channel, start } => {
            let hsv = drag_hsv(start, channel, delta, active.width);
            if state.hsv(active.param) == Some(hsv) {
                return;
            }
            state.colors.insert(active.param, hsv);
            // Hue moves at zero value change the picker but not the color
            let color = ParamValue::Color(hsv.to_color());
            if state.panel.displayed(active.param) != Some(color) {
                state.panel.input(active.param, color);
            }
            changed.write(PanelDisplayChanged(active.param));
        }
    }
}

/// Picker state after dragging `channel` by `delta_px` from `start`.
/// Only the dragged channel moves.
fn drag_hsv(start: Hsv, channel: HsvChannel, delta_px: f32, width_px: f32) -> Hsv {
    let width = if width_px > 0.0 {
        width_px
    } else {
        FALLBACK_TRACK_WIDTH
    };
    start.with_position(channel, start.position(channel) + delta_px / width)
}

fn cycle_choices(
    mut state: ResMut<PanelState>,
    buttons: Query<(&Interaction, &ChoiceButton), Changed<Interaction>>,
    mut changed: MessageWriter<PanelDisplayChanged>,
) {
    for (interaction, button) in buttons.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }
        let Some(controller) = state.panel.controller(button.param) else {
            continue;
        };
        let (ControlKind::Choice(options), ParamValue::Choice(current)) =
            (&controller.spec.kind, controller.displayed())
        else {
            continue;
        };
        let next = (current + 1) % options.len().max(1);
        if state
            .panel
            .input(button.param, ParamValue::Choice(next))
            .is_some()
        {
            changed.write(PanelDisplayChanged(button.param));
        }
    }
}

/// The scene answers a reset with `ParamsChanged`, which refreshes the widgets
fn press_reset(
    state: Res<PanelState>,
    buttons: Query<&Interaction, (Changed<Interaction>, With<ResetButton>)>,
) {
    if buttons.iter().any(|i| *i == Interaction::Pressed) {
        state.bridge.reset_params();
    }
}

/// External updates from the scene: refresh displays, report load failures
fn receive_scene_messages(
    handle: Res<PanelBridgeHandle>,
    mut state: ResMut<PanelState>,
    mut changed: MessageWriter<PanelDisplayChanged>,
    mut status: Query<&mut Text, With<StatusText>>,
) {
    while let Some(msg) = handle.try_recv_for_panel() {
        match msg {
            SceneToPanel::ParamsChanged(params) => {
                for id in state.panel.sync_from(&params) {
                    if let Some(ParamValue::Color(color)) = state.panel.displayed(id) {
                        let hsv = state
                            .hsv(id)
                            .map_or(Hsv::from_color(color), |hsv| hsv.follow(color));
                        state.colors.insert(id, hsv);
                    }
                    changed.write(PanelDisplayChanged(id));
                }
            }
            SceneToPanel::TexturesFailed { path, reason } => {
                for mut text in status.iter_mut() {
                    text.0 = format!("Texture failed: {path}\n{reason}");
                }
            }
        }
    }
}

fn refresh_widgets(
    state: Res<PanelState>,
    mut changed: MessageReader<PanelDisplayChanged>,
    mut slider_thumbs: Query<(&SliderThumb, &mut Node), Without<ColorStripThumb>>,
    mut strip_thumbs: Query<(&ColorStripThumb, &mut Node), Without<SliderThumb>>,
    mut swatches: Query<(&ColorSwatch, &mut BackgroundColor)>,
    mut texts: Query<(&ValueText, &mut Text)>,
) {
    for PanelDisplayChanged(param) in changed.read() {
        let Some(controller) = state.panel.controller(*param) else {
            continue;
        };
        let value = controller.displayed();

        for (thumb, mut node) in slider_thumbs.iter_mut() {
            if let (true, ParamValue::Float(v)) = (thumb.param == *param, value) {
                node.left = thumb_left(thumb.range.normalize(v));
            }
        }
        if let ParamValue::Color(color) = value {
            let hsv = state.hsv(*param).unwrap_or(Hsv::from_color(color));
            for (thumb, mut node) in strip_thumbs.iter_mut() {
                if thumb.param == *param {
                    node.left = thumb_left(hsv.position(thumb.channel));
                }
            }
            for (swatch, mut background) in swatches.iter_mut() {
                if swatch.param == *param {
                    background.0 = Color::srgb_u8(color.0[0], color.0[1], color.0[2]);
                }
            }
        }
        for (text, mut content) in texts.iter_mut() {
            if text.param == *param {
                content.0 = format_value(&controller.spec, value);
            }
        }
    }
}

fn update_panel_hover(
    drag: Res<ActiveDrag>,
    elements: Query<&Interaction, With<PanelElement>>,
    mut hover: ResMut<PanelHover>,
) {
    let over = drag.0.is_some() || elements.iter().any(|i| *i != Interaction::None);
    if hover.0 != over {
        hover.0 = over;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::standard_controls;
    use swatch_ipc::HexColor;

    fn spec(id: ParamId) -> ControlSpec {
        standard_controls().into_iter().find(|c| c.id == id).unwrap()
    }

    #[test]
    fn test_drag_moves_by_delta_and_snaps() {
        let range = ParamRange::new(0.0, 10.0, 0.01);
        // Half the track is half the span
        assert!((drag_value(&range, 2.0, 100.0, 200.0) - 7.0).abs() < 1e-4);
        // Dragging past the end clamps
        assert_eq!(drag_value(&range, 2.0, 1000.0, 200.0), 10.0);
        assert_eq!(drag_value(&range, 2.0, -1000.0, 200.0), 0.0);

        let coarse = ParamRange::new(0.1, 5.0, 0.1);
        let v = drag_value(&coarse, 1.0, 3.0, 200.0);
        assert!((v - 1.1).abs() < 1e-4, "{v}");
    }

    #[test]
    fn test_drag_without_layout_uses_fallback_width() {
        let range = ParamRange::new(0.0, 1.0, 0.01);
        assert!((drag_value(&range, 0.0, 100.0, 0.0) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_color_drag_moves_only_the_dragged_channel() {
        let start = Hsv::from_color(HexColor::rgb(0x33, 0x66, 0xcc));

        // Drag value all the way down, then back up within the same drag
        let black = drag_hsv(start, HsvChannel::Value, -1000.0, 200.0);
        assert_eq!(black.to_color(), HexColor::rgb(0, 0, 0));
        assert_eq!((black.h, black.s), (start.h, start.s));

        let back = drag_hsv(start, HsvChannel::Value, 0.0, 200.0);
        assert_eq!(back, start);
        assert_eq!(back.to_color(), HexColor::rgb(0x33, 0x66, 0xcc));

        // A later drag on the black color keeps the hue it had
        let lighter = drag_hsv(black, HsvChannel::Value, 100.0, 200.0);
        assert_eq!(lighter.h, start.h);
        assert!((lighter.v - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_step_decimals() {
        assert_eq!(step_decimals(0.01), 2);
        assert_eq!(step_decimals(0.001), 3);
        assert_eq!(step_decimals(0.1), 1);
        assert_eq!(step_decimals(1.0), 0);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(
            format_value(&spec(ParamId::Roughness), ParamValue::Float(0.3)),
            "0.30"
        );
        assert_eq!(
            format_value(&spec(ParamId::DisplacementScale), ParamValue::Float(0.02)),
            "0.020"
        );
        assert_eq!(
            format_value(&spec(ParamId::KeyColor), ParamValue::Color(HexColor::rgb(255, 136, 0))),
            "#ff8800"
        );
        assert_eq!(
            format_value(&spec(ParamId::NormalVariant), ParamValue::Choice(1)),
            "Emboss"
        );
    }
}
