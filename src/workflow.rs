//! The two assistant call sites.
//!
//! Each call reads input from a [`Surface`], validates it, and drives
//! request building, dispatch and extraction. The surface only ever sees a
//! coarse result: the rendered text, an instructive validation message, or a
//! generic failure message with the error indicator raised. The underlying
//! error goes to the log.

use crate::dispatch::{Dispatcher, RetryPolicy};
use crate::extract::{extract, quote_testimonial, render_emphasis, RenderStyle};
use crate::request::{build, TaskInput, TaskKind, TaskRequest};
use crate::transport::Transport;
use crate::{mlog, mlog_debug, mlog_error, Error, Result};

/// The UI collaborator a workflow reads from and reports to.
///
/// Methods take `&self`; implementations hold their own interior state.
pub trait Surface: Send + Sync {
    /// The user's free-text input, trimmed.
    fn trimmed_input(&self) -> String;

    /// The selected enumerated option (the persona for testimonials).
    fn selected_option(&self) -> String {
        String::new()
    }

    fn set_busy(&self, busy: bool);

    fn set_result_text(&self, text: &str);

    fn set_error_visible(&self, visible: bool);

    fn render_style(&self) -> RenderStyle {
        RenderStyle::Html
    }
}

/// Terminal state of one workflow call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// Input was too short; nothing was sent.
    Rejected {
        min_length: usize,
        actual_length: usize,
    },
    Completed(String),
    Failed,
}

impl WorkflowOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, WorkflowOutcome::Completed(_))
    }
}

/// User-facing strings for one task kind.
struct Messages {
    pending: &'static str,
    too_short: &'static str,
    failed: &'static str,
}

fn messages(kind: TaskKind) -> Messages {
    match kind {
        TaskKind::RecommendModel => Messages {
            pending: "Analyzing...",
            too_short: "Please enter a more detailed task description (minimum 5 characters).",
            failed: "Unable to generate the recommendation right now.",
        },
        TaskKind::SynthesizeTestimonial => Messages {
            pending: "Generating...",
            too_short: "Please enter more substantial feedback (minimum 10 characters).",
            failed: "Unable to generate the testimonial right now.",
        },
    }
}

/// Holds the surface busy until dropped, so every exit path clears it.
struct BusyGuard<'a> {
    surface: &'a dyn Surface,
}

impl<'a> BusyGuard<'a> {
    fn engage(surface: &'a dyn Surface) -> Self {
        surface.set_busy(true);
        Self { surface }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.surface.set_busy(false);
    }
}

/// Runs the recommendation and testimonial workflows over one dispatcher.
///
/// Calls are independent: `&self` methods may run concurrently and share no
/// retry state.
pub struct Assistant<T: Transport> {
    dispatcher: Dispatcher<T>,
}

impl<T: Transport> Assistant<T> {
    pub fn new(transport: T) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport),
        }
    }

    pub fn with_policy(transport: T, policy: RetryPolicy) -> Self {
        Self {
            dispatcher: Dispatcher::with_policy(transport, policy),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    pub async fn recommend_model(&self, surface: &dyn Surface) -> WorkflowOutcome {
        let input = TaskInput::Recommend {
            task_description: surface.trimmed_input(),
        };
        self.run(TaskKind::RecommendModel, input, surface).await
    }

    pub async fn synthesize_testimonial(&self, surface: &dyn Surface) -> WorkflowOutcome {
        let input = TaskInput::Testimonial {
            feedback_text: surface.trimmed_input(),
            persona: surface.selected_option(),
        };
        self.run(TaskKind::SynthesizeTestimonial, input, surface).await
    }

    /// Dispatch a built request and post-process the generated text for `style`.
    pub async fn generate(&self, request: &TaskRequest, style: RenderStyle) -> Result<String> {
        let body = self.dispatcher.dispatch(&request.payload()).await?;
        let text = extract(&body)?;
        Ok(match request.kind() {
            TaskKind::RecommendModel => render_emphasis(&text, style),
            TaskKind::SynthesizeTestimonial => quote_testimonial(&text, style),
        })
    }

    async fn run(&self, kind: TaskKind, input: TaskInput, surface: &dyn Surface) -> WorkflowOutcome {
        let msgs = messages(kind);
        surface.set_error_visible(false);
        surface.set_result_text(msgs.pending);

        let request = match build(kind, &input) {
            Ok(request) => request,
            Err(Error::Validation {
                min_length,
                actual_length,
            }) => {
                mlog_debug!(
                    "{}: input rejected ({} < {} chars)",
                    kind,
                    actual_length,
                    min_length
                );
                surface.set_result_text(msgs.too_short);
                return WorkflowOutcome::Rejected {
                    min_length,
                    actual_length,
                };
            }
            Err(e) => {
                mlog_error!("{}: could not build request: {}", kind, e);
                surface.set_error_visible(true);
                surface.set_result_text(msgs.failed);
                return WorkflowOutcome::Failed;
            }
        };

        let _busy = BusyGuard::engage(surface);
        mlog!("{}: dispatching request", kind);
        match self.generate(&request, surface.render_style()).await {
            Ok(text) => {
                mlog!("{}: completed", kind);
                surface.set_result_text(&text);
                WorkflowOutcome::Completed(text)
            }
            Err(e) => {
                mlog_error!("{}: failed: {}", kind, e);
                surface.set_error_visible(true);
                surface.set_result_text(msgs.failed);
                WorkflowOutcome::Failed
            }
        }
    }
}
