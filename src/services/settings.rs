use crate::models::{is_valid_language_code, SettingUpdate, Settings};
use crate::services::queue::completion;
use crate::services::store::{load_json, save_json, KeyValueStore, StoreError, StoreKey};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// Errors that can occur while changing settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Overlay a persisted record on the defaults, field by field
///
/// Unknown keys are ignored. A known key with a value of the wrong type, or
/// an invalid language code, keeps its default.
pub fn merge_over_defaults(stored: &Value) -> Settings {
    let mut settings = Settings::default();
    let Some(fields) = stored.as_object() else {
        tracing::warn!("Stored settings are not an object, using defaults");
        return settings;
    };

    if let Some(value) = fields.get("notifications") {
        match value.as_bool() {
            Some(enabled) => settings.notifications = enabled,
            None => tracing::warn!("Ignoring stored notifications value {}", value),
        }
    }

    if let Some(value) = fields.get("locationEnabled") {
        match value.as_bool() {
            Some(enabled) => settings.location_enabled = enabled,
            None => tracing::warn!("Ignoring stored locationEnabled value {}", value),
        }
    }

    if let Some(value) = fields.get("language") {
        match value.as_str() {
            Some(code) if is_valid_language_code(code) => settings.language = code.to_string(),
            _ => tracing::warn!("Ignoring stored language value {}", value),
        }
    }

    settings
}

/// Apply a single-field change to a copy of `current`
pub fn apply_update(current: &Settings, update: SettingUpdate) -> Result<Settings, SettingsError> {
    let mut next = current.clone();
    match update {
        SettingUpdate::Notifications(enabled) => next.notifications = enabled,
        SettingUpdate::LocationEnabled(enabled) => next.location_enabled = enabled,
        SettingUpdate::Language(code) => {
            if !is_valid_language_code(&code) {
                return Err(SettingsError::InvalidValue {
                    key: "language",
                    reason: format!("{:?} is not a language code", code),
                });
            }
            next.language = code;
        }
    }
    Ok(next)
}

/// Display name for a language code
pub fn language_label(code: &str) -> String {
    match code {
        "en" => "English (US)".to_string(),
        "es" => "Español".to_string(),
        "fr" => "Français".to_string(),
        "de" => "Deutsch".to_string(),
        other => other.to_string(),
    }
}

/// Which boolean setting a toggle row controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleKey {
    Notifications,
    LocationEnabled,
}

impl ToggleKey {
    fn update(self, value: bool) -> SettingUpdate {
        match self {
            ToggleKey::Notifications => SettingUpdate::Notifications(value),
            ToggleKey::LocationEnabled => SettingUpdate::LocationEnabled(value),
        }
    }

    fn current(self, settings: &Settings) -> bool {
        match self {
            ToggleKey::Notifications => settings.notifications,
            ToggleKey::LocationEnabled => settings.location_enabled,
        }
    }
}

/// Message shown when an action row is activated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: &'static str,
    pub message: &'static str,
}

/// One row of the settings screen
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingsRow {
    Action {
        id: &'static str,
        title: &'static str,
        subtitle: String,
        notice: Notice,
    },
    Toggle {
        id: &'static str,
        title: &'static str,
        subtitle: String,
        key: ToggleKey,
        value: bool,
    },
}

impl SettingsRow {
    pub fn id(&self) -> &'static str {
        match self {
            SettingsRow::Action { id, .. } | SettingsRow::Toggle { id, .. } => *id,
        }
    }
}

/// A titled group of rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsSection {
    pub title: Option<&'static str>,
    pub rows: Vec<SettingsRow>,
}

/// Result of activating a row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RowOutcome {
    Notice(Notice),
    Updated(Settings),
    UnknownRow,
}

const COMING_SOON: &str = "Coming Soon";

fn action(id: &'static str, title: &'static str, subtitle: &str, notice: Notice) -> SettingsRow {
    SettingsRow::Action {
        id,
        title,
        subtitle: subtitle.to_string(),
        notice,
    }
}

/// Settings screen layout bound to `settings`
pub fn settings_rows(settings: &Settings) -> Vec<SettingsSection> {
    vec![
        SettingsSection {
            title: Some("Account"),
            rows: vec![action(
                "profile",
                "Profile",
                "Manage your account information",
                Notice {
                    title: COMING_SOON,
                    message: "Profile management will be available soon",
                },
            )],
        },
        SettingsSection {
            title: Some("Preferences"),
            rows: vec![
                SettingsRow::Toggle {
                    id: "notifications",
                    title: "Notifications",
                    subtitle: "Push notifications for new places".to_string(),
                    key: ToggleKey::Notifications,
                    value: settings.notifications,
                },
                SettingsRow::Toggle {
                    id: "location",
                    title: "Location Services",
                    subtitle: "Allow location access for nearby places".to_string(),
                    key: ToggleKey::LocationEnabled,
                    value: settings.location_enabled,
                },
                action(
                    "language",
                    "Language",
                    &language_label(&settings.language),
                    Notice {
                        title: COMING_SOON,
                        message: "Language selection will be available soon",
                    },
                ),
            ],
        },
        SettingsSection {
            title: Some("Support"),
            rows: vec![
                action(
                    "privacy",
                    "Privacy Policy",
                    "How we protect your data",
                    Notice {
                        title: "Privacy Policy",
                        message: "Your privacy is important to us. We only collect data necessary to provide our services.",
                    },
                ),
                action(
                    "help",
                    "Help & Support",
                    "Get help with the app",
                    Notice {
                        title: "Help",
                        message: "Need help? Contact us at support@placesapp.com",
                    },
                ),
            ],
        },
        SettingsSection {
            title: None,
            rows: vec![action(
                "sign_out",
                "Sign Out",
                "",
                Notice {
                    title: "Sign Out",
                    message: "Are you sure you want to sign out?",
                },
            )],
        },
    ]
}

enum Command {
    Load { done: oneshot::Sender<Settings> },
    Update { update: SettingUpdate, done: oneshot::Sender<Settings> },
    // Without a value the flip is computed against the worker's state
    Toggle { key: ToggleKey, value: Option<bool>, done: oneshot::Sender<Settings> },
}

/// Owner of the user's preferences
///
/// Same queueing and write-then-reflect rules as the favorites manager:
/// updates apply in issue order, and a failed write keeps the previous
/// settings.
pub struct SettingsManager {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<Settings>,
    worker: JoinHandle<()>,
}

impl SettingsManager {
    /// Load settings from the store and start the write queue
    pub async fn spawn(store: Arc<dyn KeyValueStore>) -> Self {
        let (state_tx, state) = watch::channel(Settings::default());
        let mut worker = SettingsWorker {
            store,
            settings: Settings::default(),
            state: state_tx,
        };
        worker.load().await;

        let (commands, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(worker.run(rx));

        Self {
            commands,
            state,
            worker,
        }
    }

    pub fn settings(&self) -> Settings {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.state.clone()
    }

    pub fn rows(&self) -> Vec<SettingsSection> {
        settings_rows(&self.state.borrow())
    }

    /// Re-read settings from the store
    pub fn load(&self) -> impl Future<Output = Settings> + Send + 'static {
        let (done, reply) = oneshot::channel();
        self.submit(Command::Load { done }, reply)
    }

    /// Merge one field, persist the whole record, then publish it
    pub fn update_setting(&self, update: SettingUpdate) -> impl Future<Output = Settings> + Send + 'static {
        let (done, reply) = oneshot::channel();
        self.submit(Command::Update { update, done }, reply)
    }

    /// Dispatch a row activation by row kind
    ///
    /// Toggle rows need `value`; action rows ignore it.
    pub async fn activate(&self, row_id: &str, value: Option<bool>) -> RowOutcome {
        let row = self
            .rows()
            .into_iter()
            .flat_map(|section| section.rows)
            .find(|row| row.id() == row_id);

        match row {
            Some(SettingsRow::Action { notice, .. }) => RowOutcome::Notice(notice),
            Some(SettingsRow::Toggle { key, .. }) => {
                let (done, reply) = oneshot::channel();
                RowOutcome::Updated(self.submit(Command::Toggle { key, value, done }, reply).await)
            }
            None => RowOutcome::UnknownRow,
        }
    }

    /// Stop accepting writes and wait for queued ones to finish
    pub async fn dispose(self) {
        drop(self.commands);
        if let Err(e) = self.worker.await {
            tracing::error!("Settings worker panicked: {}", e);
        }
    }

    fn submit(
        &self,
        command: Command,
        reply: oneshot::Receiver<Settings>,
    ) -> impl Future<Output = Settings> + Send + 'static {
        if self.commands.send(command).is_err() {
            tracing::warn!("Settings queue is closed, dropping request");
        }
        completion(reply, self.state.clone())
    }
}

struct SettingsWorker {
    store: Arc<dyn KeyValueStore>,
    settings: Settings,
    state: watch::Sender<Settings>,
}

impl SettingsWorker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = commands.recv().await {
            let done = match command {
                Command::Load { done } => {
                    self.load().await;
                    done
                }
                Command::Update { update, done } => {
                    let key = update.key();
                    if let Err(e) = self.update(update).await {
                        tracing::error!("Error updating setting {}: {}", key, e);
                    }
                    done
                }
                Command::Toggle { key, value, done } => {
                    let update = key.update(value.unwrap_or(!key.current(&self.settings)));
                    if let Err(e) = self.update(update).await {
                        tracing::error!("Error toggling setting {:?}: {}", key, e);
                    }
                    done
                }
            };
            let _ = done.send(self.settings.clone());
        }
        tracing::debug!("Settings worker stopped");
    }

    async fn load(&mut self) {
        match load_json::<Value>(self.store.as_ref(), StoreKey::SETTINGS).await {
            Ok(Some(stored)) => self.reflect(merge_over_defaults(&stored)),
            Ok(None) => self.reflect(Settings::default()),
            Err(e) => {
                tracing::error!("Error loading settings: {}", e);
                self.reflect(Settings::default());
            }
        }
    }

    async fn update(&mut self, update: SettingUpdate) -> Result<(), SettingsError> {
        let next = apply_update(&self.settings, update)?;
        save_json(self.store.as_ref(), StoreKey::SETTINGS, &next).await?;
        tracing::info!("Settings saved: {:?}", next);
        self.reflect(next);
        Ok(())
    }

    fn reflect(&mut self, settings: Settings) {
        self.settings = settings;
        self.state.send_replace(self.settings.clone());
    }
}
