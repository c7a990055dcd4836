//! On-screen text: subtitles, speech bubbles and plain text boxes.
//!
//! Only one text is shown at a time. Queued texts wait their turn; adding a
//! non-queued text clears everything that is showing or waiting. Every text
//! that leaves the screen, whether it timed out, was skipped or was cleared,
//! releases its completion token.

use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};
use variantly::Variantly;

use crate::callback::CallbackToken;
use crate::geometry::{Color, Vec2};

/// Where a text is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Variantly)]
pub enum TextPos {
    /// The bottom-of-screen subtitle slot.
    Subtitle,
    /// Scene coordinates, usually above the speaking actor.
    At(Vec2),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextKind {
    #[default]
    Subtitle,
    Talk,
    Rectangle,
}

impl TextKind {
    pub const NAMES: &'static [&'static str] = &["SUBTITLE", "TALK", "RECTANGLE"];

    pub fn parse(s: &str) -> Option<TextKind> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUBTITLE" => Some(TextKind::Subtitle),
            "TALK" => Some(TextKind::Talk),
            "RECTANGLE" => Some(TextKind::Rectangle),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TextKind::Subtitle => "SUBTITLE",
            TextKind::Talk => "TALK",
            TextKind::Rectangle => "RECTANGLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TextStyle {
    pub kind: TextKind,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    pub pos: TextPos,
    pub style: TextStyle,
    /// Actor talking, if any.
    pub actor: Option<String>,
    pub remaining: f32,
    pub on_complete: Option<CallbackToken>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextManager {
    pub time_per_char: f32,
    pub min_duration: f32,
    current: Option<Text>,
    queue: VecDeque<Text>,
    completed: Vec<CallbackToken>,
}

impl Default for TextManager {
    fn default() -> Self {
        Self::new(0.05, 1.5)
    }
}

impl TextManager {
    pub fn new(time_per_char: f32, min_duration: f32) -> Self {
        Self {
            time_per_char,
            min_duration,
            current: None,
            queue: VecDeque::new(),
            completed: Vec::new(),
        }
    }

    /// How long `text` stays on screen.
    pub fn duration_for(&self, text: &str) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let by_length = text.chars().count() as f32 * self.time_per_char;
        by_length.max(self.min_duration)
    }

    pub fn add_text(
        &mut self,
        text: &str,
        pos: TextPos,
        queue: bool,
        style: TextStyle,
        actor: Option<&str>,
        on_complete: Option<CallbackToken>,
    ) {
        if !queue {
            self.clear();
        }
        debug!("text {:?}: \"{text}\"", style.kind);
        let entry = Text {
            text: text.to_string(),
            pos,
            style,
            actor: actor.map(str::to_string),
            remaining: self.duration_for(text),
            on_complete,
        };
        if self.current.is_none() {
            self.current = Some(entry);
        } else {
            self.queue.push_back(entry);
        }
    }

    pub fn current(&self) -> Option<&Text> {
        self.current.as_ref()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }

    /// Remove every text, releasing all tokens.
    pub fn clear(&mut self) {
        let showing = self.current.take().into_iter().chain(self.queue.drain(..));
        self.completed.extend(showing.filter_map(|t| t.on_complete));
    }

    /// End the current text now and move on to the next one.
    pub fn skip(&mut self) {
        if let Some(text) = self.current.take() {
            self.completed.extend(text.on_complete);
            self.current = self.queue.pop_front();
        }
    }

    /// Count down the current text and return tokens of texts that finished.
    pub fn update(&mut self, dt: f32) -> Vec<CallbackToken> {
        let mut left = dt;
        while let Some(text) = self.current.as_mut() {
            if text.remaining > left {
                text.remaining -= left;
                break;
            }
            left -= text.remaining.max(0.0);
            self.skip();
        }
        std::mem::take(&mut self.completed)
    }
}
