//! Navigation bar, page titles and the text-only pages

use bevy::picking::Pickable;
use bevy::prelude::*;
use swatch_scene::{PagePreset, PreviewEntity, PreviewPage};

const NAV_HEIGHT: f32 = 40.0;
const NAV_BACKGROUND: Color = Color::WHITE;
const LINK_COLOR: Color = Color::srgb(0.133, 0.133, 0.133);
const LINK_HOVER_COLOR: Color = Color::srgb(0.145, 0.388, 0.922);
const TITLE_COLOR: Color = Color::WHITE;
const SUBTITLE_COLOR: Color = Color::srgb(0.8, 0.8, 0.8);
const CARD_TEXT_COLOR: Color = Color::srgb(0.353, 0.353, 0.353);

/// Navigation bar link to a page
#[derive(Component)]
struct NavLink(PreviewPage);

pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_nav_bar)
            .add_systems(Update, (follow_nav_links, style_nav_links));

        for page in PreviewPage::ALL {
            app.add_systems(OnEnter(page), spawn_page_overlay);
        }
    }
}

fn spawn_nav_bar(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(0.0),
                left: Val::Px(0.0),
                width: Val::Percent(100.0),
                height: Val::Px(NAV_HEIGHT),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                column_gap: Val::Px(32.0),
                ..default()
            },
            BackgroundColor(NAV_BACKGROUND),
            Name::new("Navigation"),
        ))
        .with_children(|nav| {
            for (index, page) in PreviewPage::NAVIGABLE.into_iter().enumerate() {
                nav.spawn((
                    Button,
                    Node {
                        padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
                        ..default()
                    },
                    NavLink(page),
                ))
                .with_child((
                    Text::new(format!("{} {}", index + 1, page.label())),
                    TextFont {
                        font_size: 15.0,
                        ..default()
                    },
                    TextColor(LINK_COLOR),
                    Pickable::IGNORE,
                ));
            }
        });
}

fn follow_nav_links(
    links: Query<(&Interaction, &NavLink), Changed<Interaction>>,
    current: Res<State<PreviewPage>>,
    mut next: ResMut<NextState<PreviewPage>>,
) {
    for (interaction, link) in links.iter() {
        if *interaction == Interaction::Pressed && link.0 != *current.get() {
            info!("Navigating to {}", link.0.route());
            next.set(link.0);
        }
    }
}

/// Highlight the hovered link and the link of the current page
fn style_nav_links(
    current: Res<State<PreviewPage>>,
    links: Query<(&Interaction, &NavLink, &Children)>,
    mut texts: Query<&mut TextColor>,
) {
    for (interaction, link, children) in links.iter() {
        let highlighted = *interaction != Interaction::None || link.0 == *current.get();
        let color = if highlighted {
            LINK_HOVER_COLOR
        } else {
            LINK_COLOR
        };
        for child in children.iter() {
            if let Ok(mut text_color) = texts.get_mut(child) {
                if text_color.0 != color {
                    text_color.0 = color;
                }
            }
        }
    }
}

fn spawn_page_overlay(mut commands: Commands, page: Res<State<PreviewPage>>) {
    let page = *page.get();
    match page {
        PreviewPage::Separate => spawn_centered_card(
            &mut commands,
            "Seperate Test",
            Some("This is a placeholder for another test page. Add your content here."),
        ),
        PreviewPage::Placeholder => {
            spawn_centered_card(&mut commands, "Choose a test page above", None)
        }
        _ => {
            if let Some(preset) = PagePreset::for_page(page) {
                spawn_title(&mut commands, preset.title, preset.subtitle);
            }
        }
    }
}

fn spawn_title(commands: &mut Commands, title: &str, subtitle: &str) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(NAV_HEIGHT + 12.0),
                left: Val::Px(16.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                ..default()
            },
            Pickable::IGNORE,
            PreviewEntity,
        ))
        .with_children(|overlay| {
            overlay.spawn((
                Text::new(title),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(TITLE_COLOR),
                Pickable::IGNORE,
            ));
            if !subtitle.is_empty() {
                overlay.spawn((
                    Text::new(subtitle),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(SUBTITLE_COLOR),
                    Pickable::IGNORE,
                ));
            }
        });
}

fn spawn_centered_card(commands: &mut Commands, heading: &str, body: Option<&str>) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            Pickable::IGNORE,
            PreviewEntity,
        ))
        .with_children(|screen| {
            screen
                .spawn((
                    Node {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        row_gap: Val::Px(12.0),
                        padding: UiRect::all(Val::Px(40.0)),
                        min_width: Val::Px(320.0),
                        max_width: Val::Px(420.0),
                        ..default()
                    },
                    BackgroundColor(Color::WHITE),
                    Pickable::IGNORE,
                ))
                .with_children(|card| {
                    card.spawn((
                        Text::new(heading),
                        TextFont {
                            font_size: 28.0,
                            ..default()
                        },
                        TextColor(LINK_COLOR),
                        Pickable::IGNORE,
                    ));
                    if let Some(body) = body {
                        card.spawn((
                            Text::new(body),
                            TextFont {
                                font_size: 16.0,
                                ..default()
                            },
                            TextColor(CARD_TEXT_COLOR),
                            Pickable::IGNORE,
                        ));
                    }
                });
        });
}
