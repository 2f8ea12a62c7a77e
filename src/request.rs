//! Request construction for the two assistant tasks.
//!
//! [`build`] validates user input and produces a [`TaskRequest`]; a
//! [`Payload`] is the `generateContent` wire body derived from it.

use serde::{Deserialize, Serialize};

use crate::catalog::ModelCatalog;
use crate::{Error, Result};

/// The tasks the assistant can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    RecommendModel,
    SynthesizeTestimonial,
}

impl TaskKind {
    /// Minimum input length, in characters after trimming.
    pub fn min_length(&self) -> usize {
        match self {
            TaskKind::RecommendModel => 5,
            TaskKind::SynthesizeTestimonial => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::RecommendModel => "recommend-model",
            TaskKind::SynthesizeTestimonial => "synthesize-testimonial",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw user input for a task, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskInput {
    Recommend {
        task_description: String,
    },
    Testimonial {
        feedback_text: String,
        persona: String,
    },
}

/// A validated request, built once per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    kind: TaskKind,
    instruction_text: String,
    content_text: String,
}

impl TaskRequest {
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn instruction_text(&self) -> &str {
        &self.instruction_text
    }

    pub fn content_text(&self) -> &str {
        &self.content_text
    }

    pub fn payload(&self) -> Payload {
        Payload::new(&self.instruction_text, &self.content_text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// `generateContent` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub contents: Vec<Content>,
    pub system_instruction: Content,
}

impl Payload {
    pub fn new(instruction_text: &str, content_text: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: content_text.to_string(),
                }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: instruction_text.to_string(),
                }],
            },
        }
    }
}

const RECOMMEND_INSTRUCTION: &str = "You are an AI product expert for mAI. \
Your job is to justify which single one of the mAI models listed by the user is the best choice for the user's task. \
Use only the model descriptions provided. \
Answer with one concise, enthusiastic and professional paragraph, highlighting the recommended model \
(for example \"m-4.5 Pro\") in bold using **double asterisks**. \
Base your answer on the user's task and the capabilities of the models. \
Do not mention that the models are fictional, that you are an AI, or that you lack access to external data. \
Do NOT use any search tool.";

fn testimonial_instruction(persona: &str) -> String {
    format!(
        "You are a professional copywriter specialized in customer testimonials for B2B AI products. \
Transform the user's raw feedback into a compelling customer testimonial. \
The testimonial must be a single quotation, credible and enthusiastic, written in the first person \
from the perspective of the following professional role: \"{persona}\". \
It must be between 2 and 4 sentences long, use professional language, and focus on the business \
or technical impact relevant to that role. \
Do not add the person's name. Do not speak as an AI."
    )
}

fn check_length(kind: TaskKind, text: &str) -> Result<()> {
    let actual_length = text.chars().count();
    if actual_length < kind.min_length() {
        return Err(Error::Validation {
            min_length: kind.min_length(),
            actual_length,
        });
    }
    Ok(())
}

/// Validate `input` for `kind` and build the request. Pure and deterministic.
pub fn build(kind: TaskKind, input: &TaskInput) -> Result<TaskRequest> {
    match (kind, input) {
        (TaskKind::RecommendModel, TaskInput::Recommend { task_description }) => {
            let task = task_description.trim();
            check_length(kind, task)?;
            let content_text = format!(
                "Based on the following descriptions, which mAI model is best for the task: \"{}\"?\n\n\
                 mAI model descriptions:\n{}",
                task,
                ModelCatalog::builtin().as_prompt_lines()
            );
            Ok(TaskRequest {
                kind,
                instruction_text: RECOMMEND_INSTRUCTION.to_string(),
                content_text,
            })
        }
        (
            TaskKind::SynthesizeTestimonial,
            TaskInput::Testimonial {
                feedback_text,
                persona,
            },
        ) => {
            let feedback = feedback_text.trim();
            check_length(kind, feedback)?;
            Ok(TaskRequest {
                kind,
                instruction_text: testimonial_instruction(persona.trim()),
                content_text: feedback.to_string(),
            })
        }
        (kind, _) => Err(Error::InvalidInput(format!(
            "input does not match task {}",
            kind
        ))),
    }
}
