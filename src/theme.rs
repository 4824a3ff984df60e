use serde::{Deserialize, Serialize};

use crate::ir::GroupLabel;

// Golden-angle step keeps neighbouring group ids visually apart.
const GROUP_HUE_STEP: f32 = 137.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub group_font_size: f32,
    pub text_color: String,
    pub secondary_text_color: String,
    pub line_color: String,
    pub unassigned_fill: String,
    pub unassigned_border: String,
    pub selected_fill: String,
    pub selected_border: String,
    pub background: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 11.0,
            group_font_size: 9.0,
            text_color: "#212529".to_string(),
            secondary_text_color: "#495057".to_string(),
            line_color: "#cbd5e0".to_string(),
            unassigned_fill: "#ffffff".to_string(),
            unassigned_border: "#0d6efd".to_string(),
            selected_fill: "#fff9db".to_string(),
            selected_border: "#fab005".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            group_font_size: 9.0,
            text_color: "#1C2430".to_string(),
            secondary_text_color: "#5B6B82".to_string(),
            line_color: "#D7E0F0".to_string(),
            unassigned_fill: "#F8FAFF".to_string(),
            unassigned_border: "#7A8AA6".to_string(),
            selected_fill: "#FFF7E0".to_string(),
            selected_border: "#F59F00".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn group_fill(&self, group: &GroupLabel) -> String {
        match group_hue(group) {
            Some(hue) => format!("hsl({hue}, 70%, 90%)"),
            None => self.unassigned_fill.clone(),
        }
    }

    pub fn group_border(&self, group: &GroupLabel) -> String {
        match group_hue(group) {
            Some(hue) => format!("hsl({hue}, 70%, 40%)"),
            None => self.unassigned_border.clone(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

fn group_hue(group: &GroupLabel) -> Option<f32> {
    group
        .group_id()
        .map(|id| (id as f32 * GROUP_HUE_STEP) % 360.0)
}
