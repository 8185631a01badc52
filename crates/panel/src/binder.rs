//! Two-way binding between panel widgets and scene parameters.
//!
//! Widgets are created once on mount. Widget input notifies the listeners
//! registered for that parameter; external updates only refresh what the
//! widgets display and never call listeners back.

use std::collections::HashMap;

use swatch_ipc::{ParamId, ParamValue, SceneParams};

use crate::controls::{ControlKind, ControlSpec};

/// Stable identity of a widget for the lifetime of a mounted panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub u32);

type Listener = Box<dyn FnMut(ParamId, ParamValue) + Send + Sync>;

/// One mounted widget and the value it currently shows
#[derive(Debug, Clone)]
pub struct Controller {
    pub widget: WidgetId,
    pub spec: ControlSpec,
    displayed: ParamValue,
}

impl Controller {
    pub fn displayed(&self) -> ParamValue {
        self.displayed
    }

    /// Bring `value` inside what this widget can show.
    /// Returns `None` if the value has the wrong kind.
    fn constrain(&self, value: ParamValue) -> Option<ParamValue> {
        match (&self.spec.kind, value) {
            (ControlKind::Slider(range), ParamValue::Float(v)) => {
                Some(ParamValue::Float(range.clamp(v)))
            }
            (ControlKind::Color, ParamValue::Color(c)) => Some(ParamValue::Color(c)),
            (ControlKind::Choice(options), ParamValue::Choice(i)) => {
                Some(ParamValue::Choice(i.min(options.len().saturating_sub(1))))
            }
            _ => None,
        }
    }
}

/// The mounted set of widgets plus change listeners keyed by parameter
#[derive(Default)]
pub struct ControlPanel {
    controllers: Vec<Controller>,
    listeners: HashMap<ParamId, Vec<Listener>>,
}

impl ControlPanel {
    /// Build one controller per spec, showing the (clamped) current values
    pub fn mount(specs: &[ControlSpec], params: &SceneParams) -> Self {
        let mut controllers = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            let mut controller = Controller {
                widget: WidgetId(index as u32),
                spec: spec.clone(),
                displayed: params.get(spec.id),
            };
            match controller.constrain(controller.displayed) {
                Some(value) => controller.displayed = value,
                None => tracing::debug!("Control {:?} does not match its parameter kind", spec.id),
            }
            controllers.push(controller);
        }
        tracing::debug!("Mounted control panel with {} widgets", controllers.len());

        Self {
            controllers,
            listeners: HashMap::new(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        !self.controllers.is_empty()
    }

    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    pub fn controller(&self, id: ParamId) -> Option<&Controller> {
        self.controllers.iter().find(|c| c.spec.id == id)
    }

    pub fn displayed(&self, id: ParamId) -> Option<ParamValue> {
        self.controller(id).map(|c| c.displayed)
    }

    /// Register a listener for widget changes to `id`
    pub fn on_change(
        &mut self,
        id: ParamId,
        listener: impl FnMut(ParamId, ParamValue) + Send + Sync + 'static,
    ) {
        self.listeners.entry(id).or_default().push(Box::new(listener));
    }

    /// A widget changed `id` to `value`. The value is clamped to the widget,
    /// displayed, and passed to the listeners. Returns the applied value.
    pub fn input(&mut self, id: ParamId, value: ParamValue) -> Option<ParamValue> {
        let controller = self.controllers.iter_mut().find(|c| c.spec.id == id)?;
        let Some(applied) = controller.constrain(value) else {
            tracing::debug!("Ignoring {value:?} for {id:?}: wrong kind");
            return None;
        };
        controller.displayed = applied;

        if let Some(listeners) = self.listeners.get_mut(&id) {
            for listener in listeners.iter_mut() {
                listener(id, applied);
            }
        }
        Some(applied)
    }

    /// Parameters changed elsewhere: refresh displayed values in place.
    /// Listeners are not called. Returns the ids whose display changed.
    pub fn sync_from(&mut self, params: &SceneParams) -> Vec<ParamId> {
        let mut changed = Vec::new();
        for controller in &mut self.controllers {
            let Some(value) = controller.constrain(params.get(controller.spec.id)) else {
                continue;
            };
            if value != controller.displayed {
                controller.displayed = value;
                changed.push(controller.spec.id);
            }
        }
        changed
    }

    /// Unmount: drop every controller and listener
    pub fn dispose(&mut self) {
        self.controllers.clear();
        self.listeners.clear();
    }
}

impl std::fmt::Debug for ControlPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPanel")
            .field("controllers", &self.controllers)
            .field("listeners", &self.listeners.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::controls::standard_controls;
    use swatch_ipc::HexColor;

    fn recorder(panel: &mut ControlPanel, id: ParamId) -> Arc<Mutex<Vec<ParamValue>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        panel.on_change(id, move |_, value| sink.lock().unwrap().push(value));
        seen
    }

    #[test]
    fn test_mount_shows_current_values() {
        let params = SceneParams::default();
        let panel = ControlPanel::mount(&standard_controls(), &params);
        assert_eq!(panel.controllers().len(), ParamId::ALL.len());
        for id in ParamId::ALL {
            assert_eq!(panel.displayed(id), Some(params.get(id)), "{id:?}");
        }
    }

    #[test]
    fn test_mount_clamps_initial_values() {
        let mut params = SceneParams::default();
        params.material.displacement_scale = 3.0;
        let panel = ControlPanel::mount(&standard_controls(), &params);
        assert_eq!(
            panel.displayed(ParamId::DisplacementScale),
            Some(ParamValue::Float(0.5))
        );
    }

    #[test]
    fn test_input_clamps_and_notifies() {
        let mut panel = ControlPanel::mount(&standard_controls(), &SceneParams::default());
        let seen = recorder(&mut panel, ParamId::Roughness);
        let other = recorder(&mut panel, ParamId::Metalness);

        let applied = panel.input(ParamId::Roughness, ParamValue::Float(7.5));
        assert_eq!(applied, Some(ParamValue::Float(5.0)));
        assert_eq!(panel.displayed(ParamId::Roughness), Some(ParamValue::Float(5.0)));
        assert_eq!(*seen.lock().unwrap(), vec![ParamValue::Float(5.0)]);
        assert!(other.lock().unwrap().is_empty());
    }

    #[test]
    fn test_input_of_wrong_kind_is_ignored() {
        let mut panel = ControlPanel::mount(&standard_controls(), &SceneParams::default());
        let seen = recorder(&mut panel, ParamId::Roughness);

        let applied = panel.input(ParamId::Roughness, ParamValue::Color(HexColor::WHITE));
        assert_eq!(applied, None);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(panel.displayed(ParamId::Roughness), Some(ParamValue::Float(0.3)));
    }

    #[test]
    fn test_sync_updates_in_place_without_listeners() {
        let mut params = SceneParams::default();
        let mut panel = ControlPanel::mount(&standard_controls(), &params);
        let widgets: Vec<WidgetId> = panel.controllers().iter().map(|c| c.widget).collect();
        let seen = recorder(&mut panel, ParamId::KeyIntensity);

        params.lighting.key_intensity = 4.0;
        params.lighting.key_color = HexColor::rgb(0x10, 0x20, 0x30);
        params.material.normal_scale = 99.0;
        let changed = panel.sync_from(&params);

        assert_eq!(
            changed,
            vec![ParamId::KeyIntensity, ParamId::KeyColor, ParamId::NormalScale]
        );
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(panel.displayed(ParamId::NormalScale), Some(ParamValue::Float(10.0)));
        let after: Vec<WidgetId> = panel.controllers().iter().map(|c| c.widget).collect();
        assert_eq!(widgets, after);

        // A second sync with the same values changes nothing
        assert!(panel.sync_from(&params).is_empty());
    }

    #[test]
    fn test_choice_index_clamped_to_options() {
        let mut panel = ControlPanel::mount(&standard_controls(), &SceneParams::default());
        let applied = panel.input(ParamId::NormalVariant, ParamValue::Choice(9));
        assert_eq!(applied, Some(ParamValue::Choice(1)));
    }

    #[test]
    fn test_dispose_drops_everything() {
        let mut panel = ControlPanel::mount(&standard_controls(), &SceneParams::default());
        let seen = recorder(&mut panel, ParamId::Roughness);
        panel.dispose();

        assert!(!panel.is_mounted());
        assert_eq!(panel.input(ParamId::Roughness, ParamValue::Float(1.0)), None);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(Arc::strong_count(&seen), 1);
    }
}
