use log::error;
use serde::{Deserialize, Serialize};

use super::{ActionContext, ActionError, ActionSpec, put};
use crate::geometry::Color;
use crate::param::{Param, ParamMap, ParamType, ParamValues, parse_bool};
use crate::text::{TextKind, TextPos, TextStyle};

/// Show a line of text, spoken by an actor or as a plain subtitle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SayAction {
    pub actor: Option<String>,
    pub text: String,
    pub speech: Option<String>,
    pub kind: TextKind,
    pub queue: bool,
    pub wait: bool,
}

impl ActionSpec for SayAction {
    const ID: &'static str = "say";
    const DESCRIPTION: &'static str = "Say a line of text";
    const PARAMS: &'static [Param] = &[
        Param::new("actor", ParamType::Actor).desc("Actor speaking; empty for narration"),
        Param::new("text", ParamType::SmallText).desc("Text to show").mandatory(),
        Param::new("speech", ParamType::Sound).desc("Voice sound played through the actor"),
        Param::new("type", ParamType::Option)
            .desc("How the text is drawn")
            .options(TextKind::NAMES)
            .default_value("SUBTITLE"),
        Param::new("queue", ParamType::Boolean)
            .desc("Show after the current text instead of replacing it")
            .default_value("false"),
        Param::new("wait", ParamType::Boolean)
            .desc("Wait until the text is gone")
            .mandatory()
            .default_value("true"),
    ];

    fn from_params(values: &ParamValues) -> Result<Self, ActionError> {
        Ok(Self {
            actor: values.string("actor").filter(|a| !a.trim().is_empty()),
            text: values.required_string("text")?,
            speech: values.string("speech"),
            kind: values.typed("type", TextKind::parse).unwrap_or_default(),
            queue: values.bool("queue").unwrap_or(false),
            wait: values.required("wait", parse_bool)?,
        })
    }

    fn to_params(&self, out: &mut ParamMap) {
        put(out, "actor", self.actor.as_ref(), String::clone);
        out.insert("text".into(), self.text.clone());
        put(out, "speech", self.speech.as_ref(), String::clone);
        out.insert("type".into(), self.kind.name().to_string());
        out.insert("queue".into(), self.queue.to_string());
        out.insert("wait".into(), self.wait.to_string());
    }

    fn run(&self, ctx: &mut ActionContext) -> bool {
        let (color, anchor) = match self.actor.as_deref() {
            Some(id) => match ctx.world.find_actor_anywhere(id) {
                Some(actor) => (actor.text_color(), Some(actor.bbox_rect().top_center())),
                None => {
                    error!("say: actor '{id}' not found");
                    return false;
                },
            },
            None => (Color::WHITE, None),
        };
        let pos = match (self.kind, anchor) {
            (TextKind::Subtitle, _) | (_, None) => TextPos::Subtitle,
            (_, Some(point)) => TextPos::At(point),
        };

        if let (Some(actor), Some(speech)) = (&self.actor, &self.speech) {
            ctx.world.play_sound(actor, speech);
        }

        let on_complete = ctx.continuation_if(self.wait);
        let style = TextStyle { kind: self.kind, color };
        ctx.world
            .text
            .add_text(&self.text, pos, self.queue, style, self.actor.as_deref(), on_complete);
        self.wait
    }
}
