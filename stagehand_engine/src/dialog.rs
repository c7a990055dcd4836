//! Character dialogs and their options.

use serde::{Deserialize, Serialize};

/// An ordered list of options belonging to a character.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dialog {
    pub id: String,
    pub options: Vec<DialogOption>,
}

/// One selectable line. Hidden options stay in place so indices remain stable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DialogOption {
    pub text: String,
    pub response_text: Option<String>,
    /// Verb on the owning character run when the option is chosen.
    pub verb: Option<String>,
    pub visible: bool,
    /// Hide the option after it has been chosen once.
    pub once: bool,
    pub visited: bool,
}

impl DialogOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            response_text: None,
            verb: None,
            visible: true,
            once: false,
            visited: false,
        }
    }
}

impl Dialog {
    pub fn new(id: impl Into<String>, options: Vec<DialogOption>) -> Self {
        Self { id: id.into(), options }
    }

    pub fn option(&self, index: usize) -> Option<&DialogOption> {
        self.options.get(index)
    }

    pub fn option_mut(&mut self, index: usize) -> Option<&mut DialogOption> {
        self.options.get_mut(index)
    }

    /// Visible options with their stable indices.
    pub fn visible_options(&self) -> impl Iterator<Item = (usize, &DialogOption)> {
        self.options.iter().enumerate().filter(|(_, o)| o.visible)
    }

    pub fn has_visible_options(&self) -> bool {
        self.options.iter().any(|o| o.visible)
    }

    /// Remove an option permanently. Later options shift down by one.
    pub fn remove_option(&mut self, index: usize) -> Option<DialogOption> {
        (index < self.options.len()).then(|| self.options.remove(index))
    }

    /// Mark a visible option as chosen and return a copy of it.
    ///
    /// Hidden or out-of-range options cannot be chosen.
    pub fn choose(&mut self, index: usize) -> Option<DialogOption> {
        let option = self.options.get_mut(index).filter(|o| o.visible)?;
        option.visited = true;
        if option.once {
            option.visible = false;
        }
        Some(option.clone())
    }
}

/// Attribute changes for a dialog option, applied only after the whole
/// actor/dialog/option chain has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptionAttrPatch {
    pub visible: Option<bool>,
}

impl OptionAttrPatch {
    pub fn is_empty(&self) -> bool {
        self.visible.is_none()
    }

    pub fn apply(&self, option: &mut DialogOption) {
        if let Some(visible) = self.visible {
            option.visible = visible;
        }
    }
}
