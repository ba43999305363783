//! Routing of agent lifecycle events to desktop notifications.
//!
//! A payload is parsed into a [`NotificationEvent`], [`classify`] decides
//! between sending and suppressing, and [`Dispatcher`] performs the side
//! effects. Classification is pure so it can be tested without processes.
//!
//! Payload shape:
//!
//! ```json
//! {
//!   "type": "agent-turn-complete",
//!   "thread-id": "b5f6c1c2-1111-2222-3333-444455556666",
//!   "turn-id": "12345",
//!   "cwd": "/Users/alice/projects/example",
//!   "input-messages": ["Rename `foo` to `bar` and update the callsites."],
//!   "last-assistant-message": "Rename complete and verified `cargo build` succeeds."
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::{expand_home, NotifyConfig};
use crate::error::{QdError, Result};
use crate::probe;
use crate::runner::CommandRunner;

pub const AGENT_TURN_COMPLETE: &str = "agent-turn-complete";

const TITLE_PREFIX: &str = "Codex: ";
const DEFAULT_TITLE: &str = "Turn Complete!";
const GROUP_PREFIX: &str = "codex-";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NotificationEvent {
    /// Non-string kinds are kept in their JSON form so they can be reported.
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: Option<String>,
    /// Correlation id; becomes the notification group.
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub turn_id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub input_messages: Option<Vec<String>>,
    #[serde(rename = "last-assistant-message", default)]
    pub last_message: Option<String>,
}

impl NotificationEvent {
    /// The payload must be a JSON object. Arrays would otherwise bind to
    /// fields by position.
    pub fn parse(payload: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(payload).map_err(QdError::Payload)?;
        if !value.is_object() {
            return Err(QdError::Payload(serde::de::Error::custom(
                "expected a JSON object",
            )));
        }
        serde_json::from_value(value).map_err(QdError::Payload)
    }

    pub fn kind(&self) -> EventKind<'_> {
        match self.kind.as_deref() {
            Some(AGENT_TURN_COMPLETE) => EventKind::AgentTurnComplete,
            other => EventKind::Unrecognized(other),
        }
    }

    fn joined_input(&self) -> String {
        self.input_messages
            .as_deref()
            .unwrap_or_default()
            .join(" ")
    }
}

fn lenient_kind<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind<'a> {
    AgentTurnComplete,
    Unrecognized(Option<&'a str>),
}

/// What the OS notification facility is asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
    pub title: String,
    pub body: String,
    pub group_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dispatch {
        action: NotificationAction,
        /// Working directory handed to the sound cue, when non-empty.
        sound_cue_dir: Option<String>,
    },
    Suppress {
        kind: Option<String>,
    },
}

/// Decide what to do with `event`. No side effects.
pub fn classify(event: &NotificationEvent) -> Route {
    match event.kind() {
        EventKind::AgentTurnComplete => {
            let headline = event
                .last_message
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_TITLE);
            let body = event.joined_input();
            // Title and joined input are concatenated with no separator.
            let title = format!("{TITLE_PREFIX}{headline}{body}");
            let group_key = format!(
                "{GROUP_PREFIX}{}",
                event.thread_id.as_deref().unwrap_or_default()
            );
            Route::Dispatch {
                action: NotificationAction {
                    title,
                    body,
                    group_key,
                },
                sound_cue_dir: event.cwd.clone().filter(|d| !d.is_empty()),
            }
        }
        EventKind::Unrecognized(kind) => Route::Suppress {
            kind: kind.map(str::to_string),
        },
    }
}

/// Line printed when an event is not turned into a notification.
pub fn suppressed_notice(kind: Option<&str>) -> String {
    format!(
        "not sending a push notification for: {}",
        kind.unwrap_or("(none)")
    )
}

pub struct Dispatcher<'a, R: CommandRunner> {
    runner: &'a R,
    config: &'a NotifyConfig,
}

impl<'a, R: CommandRunner> Dispatcher<'a, R> {
    pub fn new(runner: &'a R, config: &'a NotifyConfig) -> Self {
        Self { runner, config }
    }

    /// Classify and act. Only a failing notifier call is an error.
    pub fn dispatch(&self, event: &NotificationEvent) -> Result<Route> {
        let route = classify(event);
        self.perform(&route)?;
        Ok(route)
    }

    pub fn perform(&self, route: &Route) -> Result<()> {
        match route {
            Route::Suppress { kind } => {
                println!("{}", suppressed_notice(kind.as_deref()));
                Ok(())
            }
            Route::Dispatch {
                action,
                sound_cue_dir,
            } => {
                if let Some(dir) = sound_cue_dir {
                    self.play_sound_cue(dir);
                }
                self.notify(action)
            }
        }
    }

    fn play_sound_cue(&self, dir: &str) {
        let Some(script) = self.config.sound_script.as_deref().and_then(expand_home) else {
            tracing::debug!("no sound cue configured");
            return;
        };
        probe::sound_cue(self.runner, &script, dir);
    }

    fn notify(&self, action: &NotificationAction) -> Result<()> {
        let mut args = vec![
            "-title".to_string(),
            action.title.clone(),
            "-message".to_string(),
            action.body.clone(),
            "-group".to_string(),
            action.group_key.clone(),
            "-ignoreDnD".to_string(),
        ];
        if let Some(bundle) = &self.config.activate {
            args.push("-activate".to_string());
            args.push(bundle.clone());
        }

        let notifier = &self.config.notifier;
        let captured = self.runner.capture(Path::new(notifier), &args);
        tracing::debug!(stdout = %captured.stdout.trim(), "notifier finished");
        captured.outcome.into_result(notifier)
    }
}
