#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;

use std::path;
use std::time::Instant;

use tokio::sync::mpsc;

use super::fallback_script;
use super::format_script;
use super::progress::advance_progress;
use super::samples::description_placeholder;
use super::samples::example_input;
use super::write_download;
use super::Credentials;
use super::ProgressTimer;
use super::FALLBACK_NOTICE;
use crate::domain::models::Action;
use crate::domain::models::ClientError;
use crate::domain::models::ClipboardBox;
use crate::domain::models::Event;
use crate::domain::models::GenerationConfig;
use crate::domain::models::GenerationMode;
use crate::domain::models::GenerationOutcome;
use crate::domain::models::GenerationRequest;
use crate::domain::models::NotificationKind;
use crate::domain::models::NumericField;
use crate::domain::models::StoreBox;
use crate::domain::models::ViewState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GenerationPhase {
    #[default]
    Idle,
    Validating,
    InFlight,
    /// The response is in and the progress bar sits at 100% until display.
    Settling,
}

/// Owns the generation parameters and the view state, and runs one
/// request/response cycle per `generate` call. The backend call itself runs
/// in the actions worker; its outcome comes back as events.
pub struct Controller {
    pub config: GenerationConfig,
    pub view: ViewState,
    phase: GenerationPhase,
    in_flight_input: String,
    store: StoreBox,
    clipboard: ClipboardBox,
    download_dir: path::PathBuf,
    action_tx: mpsc::UnboundedSender<Action>,
    event_tx: mpsc::UnboundedSender<Event>,
    progress_timer: Option<ProgressTimer>,
}

impl Controller {
    pub fn new(
        config: GenerationConfig,
        store: StoreBox,
        clipboard: ClipboardBox,
        download_dir: path::PathBuf,
        action_tx: mpsc::UnboundedSender<Action>,
        event_tx: mpsc::UnboundedSender<Event>,
    ) -> Controller {
        let mut controller = Controller {
            config,
            view: ViewState::default(),
            phase: GenerationPhase::Idle,
            in_flight_input: "".to_string(),
            store,
            clipboard,
            download_dir,
            action_tx,
            event_tx,
            progress_timer: None,
        };

        Credentials::load(
            controller.store.as_ref(),
            &mut controller.config,
            &mut controller.view,
        );
        controller.apply_mode();
        for field in [
            NumericField::Temperature,
            NumericField::MaxTokens,
            NumericField::TopP,
            NumericField::FrequencyPenalty,
            NumericField::PresencePenalty,
            NumericField::MaxIterations,
        ] {
            controller.view.readouts.refresh(field, &controller.config);
        }

        return controller;
    }

    pub fn phase(&self) -> GenerationPhase {
        return self.phase;
    }

    #[cfg(test)]
    pub fn store(&self) -> &dyn crate::domain::models::KeyValueStore {
        return self.store.as_ref();
    }

    fn apply_mode(&mut self) {
        let mode = self.config.mode;
        self.view.npc_tags_visible = mode.uses_npc_tags();
        self.view.description_placeholder = description_placeholder(mode).to_string();
    }

    pub fn set_mode(&mut self, mode: GenerationMode) {
        self.config.mode = mode;
        self.apply_mode();
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.config.mode.toggle());
    }

    pub fn cycle_model(&mut self, forward: bool) {
        self.config.cycle_model(forward);
    }

    pub fn cycle_agent_mode(&mut self, forward: bool) {
        self.config.cycle_agent_mode(forward);
    }

    /// Parses raw text for a numeric field. Invalid text leaves the value
    /// untouched and raises a warning.
    pub fn set_numeric(&mut self, field: NumericField, raw: &str) -> Result<(), ClientError> {
        if let Err(err) = self.config.parse_numeric(field, raw) {
            self.view.notify(NotificationKind::Warning, &err.to_string());
            return Err(err);
        }

        self.view.readouts.refresh(field, &self.config);
        return Ok(());
    }

    pub fn step_numeric(&mut self, field: NumericField, forward: bool) {
        self.config.step_numeric(field, forward);
        self.view.readouts.refresh(field, &self.config);
    }

    pub fn save_key(&mut self) -> Result<(), ClientError> {
        let input = self.view.key_field.to_string();
        return Credentials::save(
            self.store.as_mut(),
            &mut self.config,
            &mut self.view,
            &input,
        );
    }

    pub fn clear_key(&mut self) -> Result<(), ClientError> {
        return Credentials::clear(self.store.as_mut(), &mut self.config, &mut self.view);
    }

    pub fn toggle_key_visibility(&mut self) {
        Credentials::toggle_visibility(self.store.as_ref(), &mut self.view);
    }

    pub fn check_backend(&mut self) {
        if let Err(err) = self.action_tx.send(Action::BackendHealthCheck()) {
            tracing::warn!(error = ?err, "Actions worker is gone, skipping health check");
        }
    }

    pub fn on_backend_health(&mut self, res: Result<(), String>) {
        match res {
            Ok(()) => {
                self.view
                    .notify(NotificationKind::Info, "Generation backend is healthy.");
            }
            Err(err) => {
                tracing::warn!(error = err.as_str(), "Generation backend health check failed");
                self.view.notify(
                    NotificationKind::Warning,
                    "Generation backend is unreachable, placeholder scripts will be shown.",
                );
            }
        }
    }

    /// Validates the description and hands a request snapshot to the worker.
    pub fn generate(&mut self) -> Result<(), ClientError> {
        if self.phase != GenerationPhase::Idle {
            return Err(ClientError::Busy);
        }

        self.phase = GenerationPhase::Validating;
        let input = self.view.description.trim().to_string();
        if input.is_empty() {
            let err = ClientError::EmptyDescription(self.config.mode);
            self.view.notify(NotificationKind::Warning, &err.to_string());
            self.phase = GenerationPhase::Idle;
            return Err(err);
        }

        let request = GenerationRequest::new(&input, &self.view.npc_tags, &self.config);
        tracing::debug!(
            mode = %request.mode,
            model = request.config.model.as_str(),
            agent_mode = %request.config.agent_mode,
            npc_tags = ?request.npc_tags,
            has_api_key = request.config.api_key.is_some(),
            "Submitting generation request"
        );

        self.in_flight_input = input;
        self.phase = GenerationPhase::InFlight;
        self.view.busy = true;
        self.view.progress = Some(0.0);
        self.progress_timer = Some(ProgressTimer::start(self.event_tx.clone()));

        if let Err(err) = self.action_tx.send(Action::BackendRequest(request)) {
            tracing::error!(error = ?err, "Actions worker is gone");
            self.on_generation_settled(GenerationOutcome::Failed(err.to_string()));
        }

        return Ok(());
    }

    pub fn on_generation_progress(&mut self, increment: f64) {
        if self.phase != GenerationPhase::InFlight {
            return;
        }

        if let Some(progress) = self.view.progress {
            self.view.progress = Some(advance_progress(progress, increment));
        }
    }

    fn stop_progress(&mut self) {
        if let Some(timer) = self.progress_timer.take() {
            timer.cancel();
        }
    }

    pub fn on_generation_settling(&mut self) {
        if self.phase != GenerationPhase::InFlight {
            return;
        }

        self.stop_progress();
        self.phase = GenerationPhase::Settling;
        self.view.progress = Some(100.0);
    }

    pub fn on_generation_settled(&mut self, outcome: GenerationOutcome) {
        self.stop_progress();

        match outcome {
            GenerationOutcome::Response(res) => {
                tracing::info!(
                    success = ?res.success,
                    model = ?res.model,
                    agent_mode = ?res.agent_mode,
                    mode = ?res.mode,
                    knowledge_base = ?res.knowledge_base,
                    "Generation finished"
                );
                self.view.display_result(&res.display_text());
            }
            GenerationOutcome::Failed(err) => {
                tracing::error!(
                    error = err.as_str(),
                    "Generation failed, showing placeholder script"
                );
                self.view
                    .display_result(&fallback_script(&self.in_flight_input));
                self.view.notify(NotificationKind::Info, FALLBACK_NOTICE);
            }
        }

        self.view.busy = false;
        self.view.progress = None;
        self.phase = GenerationPhase::Idle;
    }

    pub fn copy(&mut self) -> Result<(), ClientError> {
        let text = match self.view.output.script() {
            Some(text) => text.to_string(),
            None => {
                return Err(self.warn(ClientError::NothingToCopy));
            }
        };

        if let Err(err) = self.clipboard.set_text(&text) {
            tracing::error!(error = ?err, "Copy failed");
            let err = ClientError::Clipboard(err.to_string());
            self.view.notify(NotificationKind::Error, &err.to_string());
            return Err(err);
        }

        self.view
            .notify(NotificationKind::Success, "Script copied to clipboard.");
        return Ok(());
    }

    pub fn download(&mut self) -> Result<path::PathBuf, ClientError> {
        let text = match self.view.output.script() {
            Some(text) => text.to_string(),
            None => {
                return Err(self.warn(ClientError::NothingToDownload));
            }
        };

        match write_download(&self.download_dir, &text) {
            Ok(file_path) => {
                self.view.notify(
                    NotificationKind::Success,
                    &format!("Saved {}", file_path.display()),
                );
                return Ok(file_path);
            }
            Err(err) => {
                tracing::error!(error = ?err, "Download failed");
                let err = ClientError::FileSystem(err.to_string());
                self.view.notify(NotificationKind::Error, &err.to_string());
                return Err(err);
            }
        }
    }

    pub fn format(&mut self) -> Result<(), ClientError> {
        let formatted = match self.view.output.script() {
            Some(text) => format_script(text),
            None => {
                return Err(self.warn(ClientError::NothingToFormat));
            }
        };

        self.view.display_result(&formatted);
        self.view.notify(NotificationKind::Success, "Script formatted.");
        return Ok(());
    }

    pub fn clear(&mut self) {
        self.view.set_description("");
        self.view.clear_output();
    }

    pub fn load_example(&mut self) {
        self.view.set_description(example_input(self.config.mode));
    }

    pub fn tick(&mut self, now: Instant) {
        self.view.expire(now);
    }

    fn warn(&mut self, err: ClientError) -> ClientError {
        self.view.notify(NotificationKind::Warning, &err.to_string());
        return err;
    }
}
