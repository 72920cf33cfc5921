//! Per-session settings: temperature, model and panel visibility

use std::collections::BTreeSet;

use tracing::debug;

use super::SessionError;

/// Side panels the presentation layer can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Panel {
    /// Temperature and usage guide
    Settings,
    /// Developer name and contact
    Developer,
    /// Model in use and installed models
    Model,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::Settings, Panel::Developer, Panel::Model];

    /// Heading shown above the panel
    pub fn title(&self) -> &'static str {
        match self {
            Self::Settings => "설정",
            Self::Developer => "개발자 정보",
            Self::Model => "모델 정보",
        }
    }
}

impl std::str::FromStr for Panel {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "Panel::from_str: called");
        match s.trim().to_lowercase().as_str() {
            "settings" | "setting" | "설정" => Ok(Self::Settings),
            "developer" | "dev" | "개발자" => Ok(Self::Developer),
            "model" | "모델" => Ok(Self::Model),
            other => {
                debug!(%other, "Panel::from_str: unknown panel");
                Err(SessionError::UnknownPanel(other.to_string()))
            }
        }
    }
}

impl std::fmt::Display for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Settings => write!(f, "settings"),
            Self::Developer => write!(f, "developer"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// Mutable settings owned by exactly one session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    temperature: f32,
    model_id: String,
    panels: BTreeSet<Panel>,
}

impl SessionSettings {
    /// Start with all panels hidden; the temperature must be in 0.0..=1.0
    pub fn new(model_id: impl Into<String>, temperature: f32) -> Result<Self, SessionError> {
        check_temperature(temperature)?;
        Ok(Self {
            temperature,
            model_id: model_id.into(),
            panels: BTreeSet::new(),
        })
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Set the temperature; values outside 0.0..=1.0 (and NaN) are rejected
    pub fn set_temperature(&mut self, value: f32) -> Result<(), SessionError> {
        debug!(%value, "SessionSettings::set_temperature: called");
        check_temperature(value)?;
        self.temperature = value;
        Ok(())
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        self.panels.contains(&panel)
    }

    /// Flip a panel; returns the new visibility
    pub fn toggle(&mut self, panel: Panel) -> bool {
        let visible = if self.panels.remove(&panel) {
            false
        } else {
            self.panels.insert(panel);
            true
        };
        debug!(%panel, visible, "SessionSettings::toggle: toggled");
        visible
    }

    /// Visible panels in display order
    pub fn visible_panels(&self) -> impl Iterator<Item = Panel> + '_ {
        self.panels.iter().copied()
    }
}

fn check_temperature(value: f32) -> Result<(), SessionError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SessionError::TemperatureOutOfRange(value))
    }
}
