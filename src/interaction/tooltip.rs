use crate::map::legend::category_label;

use super::Pointer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

/// Floating label that follows hover-enter events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    visibility: Visibility,
    text: String,
    position: Pointer,
    offset: (i32, i32),
}

impl Default for Tooltip {
    fn default() -> Self {
        Self::new(Self::TERMINAL_OFFSET)
    }
}

impl Tooltip {
    /// Two columns right of the pointer, one row up.
    pub const TERMINAL_OFFSET: (i32, i32) = (2, -1);

    pub fn new(offset: (i32, i32)) -> Self {
        Self {
            visibility: Visibility::Hidden,
            text: String::new(),
            position: Pointer::default(),
            offset,
        }
    }

    /// Show `"<name>: <label>"` next to the pointer. Always re-texts and
    /// re-positions, even when already visible.
    pub fn show(&mut self, name: &str, category: Option<&str>, pointer: Pointer) {
        self.text = tooltip_text(name, category);
        self.visibility = Visibility::Visible;
        self.position = Pointer {
            x: pointer.x + self.offset.0,
            y: pointer.y + self.offset.1,
        };
    }

    pub fn hide(&mut self) {
        self.visibility = Visibility::Hidden;
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> Pointer {
        self.position
    }
}

pub fn tooltip_text(name: &str, category: Option<&str>) -> String {
    match category {
        Some(c) => format!("{name}: {}", category_label(c)),
        None => format!("{name}: No data"),
    }
}
