use serde::{Deserialize, Serialize};

pub const TRANSLATE_SNAP_STEP: f32 = 0.05;
pub const SCALE_SNAP_STEP: f32 = 0.1;
pub const ROTATE_SNAP_STEP_DEGREES: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl GizmoMode {
    pub const ALL: [GizmoMode; 3] = [GizmoMode::Translate, GizmoMode::Rotate, GizmoMode::Scale];

    pub fn label(self) -> &'static str {
        match self {
            GizmoMode::Translate => "Translate",
            GizmoMode::Rotate => "Rotate",
            GizmoMode::Scale => "Scale",
        }
    }

    pub fn snap_step(self) -> f32 {
        match self {
            GizmoMode::Translate => TRANSLATE_SNAP_STEP,
            GizmoMode::Rotate => ROTATE_SNAP_STEP_DEGREES,
            GizmoMode::Scale => SCALE_SNAP_STEP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GizmoSpace {
    #[default]
    World,
    Local,
}

impl GizmoSpace {
    pub fn label(self) -> &'static str {
        match self {
            GizmoSpace::World => "World",
            GizmoSpace::Local => "Local",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            GizmoSpace::World => GizmoSpace::Local,
            GizmoSpace::Local => GizmoSpace::World,
        }
    }
}

/// Gizmo toolbar state persisted with each session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoSettings {
    pub mode: GizmoMode,
    pub space: GizmoSpace,
    pub snap: bool,
}

impl GizmoSettings {
    /// Step applied to the current mode, or `None` while snapping is off.
    pub fn snap_increment(&self) -> Option<f32> {
        self.snap.then(|| self.mode.snap_step())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_increment_follows_mode() {
        let mut settings = GizmoSettings::default();
        assert_eq!(settings.snap_increment(), None);

        settings.snap = true;
        assert_eq!(settings.snap_increment(), Some(TRANSLATE_SNAP_STEP));
        settings.mode = GizmoMode::Rotate;
        assert_eq!(settings.snap_increment(), Some(ROTATE_SNAP_STEP_DEGREES));
        settings.mode = GizmoMode::Scale;
        assert_eq!(settings.snap_increment(), Some(SCALE_SNAP_STEP));
    }
}
