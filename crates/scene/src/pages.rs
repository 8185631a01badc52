//! Preview pages and the routes that select them

use bevy::prelude::*;

/// The page currently mounted. Each transition unmounts the previous
/// page's entities and mounts the next one.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PreviewPage {
    #[default]
    Window1,
    Flowers,
    Colombia,
    Waiting1,
    Separate,
    /// Shown for any route that matches no page
    Placeholder,
}

impl PreviewPage {
    /// Pages reachable from the navigation bar, in hotkey order
    pub const NAVIGABLE: [PreviewPage; 5] = [
        PreviewPage::Window1,
        PreviewPage::Flowers,
        PreviewPage::Colombia,
        PreviewPage::Waiting1,
        PreviewPage::Separate,
    ];

    pub const ALL: [PreviewPage; 6] = [
        PreviewPage::Window1,
        PreviewPage::Flowers,
        PreviewPage::Colombia,
        PreviewPage::Waiting1,
        PreviewPage::Separate,
        PreviewPage::Placeholder,
    ];

    /// Resolve a route such as `/flowers`. Unknown routes give the placeholder.
    pub fn from_route(route: &str) -> Self {
        let name = route.trim().trim_matches('/').to_ascii_lowercase();
        match name.as_str() {
            "window1" => PreviewPage::Window1,
            "flowers" => PreviewPage::Flowers,
            "colombia" => PreviewPage::Colombia,
            "waiting1" => PreviewPage::Waiting1,
            "seperate" => PreviewPage::Separate,
            _ => PreviewPage::Placeholder,
        }
    }

    pub fn route(self) -> &'static str {
        match self {
            PreviewPage::Window1 => "/window1",
            PreviewPage::Flowers => "/flowers",
            PreviewPage::Colombia => "/colombia",
            PreviewPage::Waiting1 => "/waiting1",
            PreviewPage::Separate => "/seperate",
            PreviewPage::Placeholder => "/",
        }
    }

    /// Label used by the navigation bar
    pub fn label(self) -> &'static str {
        match self {
            PreviewPage::Window1 => "Window 1",
            PreviewPage::Flowers => "Flowers",
            PreviewPage::Colombia => "Colombia",
            PreviewPage::Waiting1 => "Waiting 1",
            PreviewPage::Separate => "Seperate",
            PreviewPage::Placeholder => "Home",
        }
    }

    /// Page for a 1-based hotkey number
    pub fn from_hotkey(number: usize) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|index| Self::NAVIGABLE.get(index).copied())
    }

    /// Whether the page renders a 3D scene
    pub fn has_scene(self) -> bool {
        !matches!(self, PreviewPage::Separate | PreviewPage::Placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_routes() {
        for page in PreviewPage::NAVIGABLE {
            assert_eq!(PreviewPage::from_route(page.route()), page);
        }
        assert_eq!(PreviewPage::from_route("Flowers/"), PreviewPage::Flowers);
    }

    #[test]
    fn test_unknown_routes_give_placeholder() {
        assert_eq!(PreviewPage::from_route("/"), PreviewPage::Placeholder);
        assert_eq!(PreviewPage::from_route("/separate"), PreviewPage::Placeholder);
        assert_eq!(PreviewPage::from_route("/window2"), PreviewPage::Placeholder);
    }

    #[test]
    fn test_hotkeys() {
        assert_eq!(PreviewPage::from_hotkey(1), Some(PreviewPage::Window1));
        assert_eq!(PreviewPage::from_hotkey(5), Some(PreviewPage::Separate));
        assert_eq!(PreviewPage::from_hotkey(0), None);
        assert_eq!(PreviewPage::from_hotkey(6), None);
    }

    #[test]
    fn test_scene_pages() {
        assert!(PreviewPage::Waiting1.has_scene());
        assert!(!PreviewPage::Separate.has_scene());
        assert!(!PreviewPage::Placeholder.has_scene());
    }
}
