//! Generation workflow: layout -> images -> code -> refinements.
//!
//! Every operation follows the same shape: reject if another generation is
//! in flight, mark the session loading and clear its error, await the
//! provider, then either replace the derived state and advance the phase or
//! record one fixed message and leave everything else as it was. Loading is
//! cleared on every exit path, including a dropped future.

use anyhow::{Context, Result};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

use crate::errors::WeaverError;
use crate::log::Journal;
use crate::provider::DynProvider;
use crate::session::Session;
use crate::wire::{AppStep, FormData, ImageRequest, PreviewData};

pub const PREVIEW_FAILED: &str = "Failed to generate preview. Please try again.";
pub const CODE_FAILED: &str = "Failed to generate code. Please try again.";
pub const REFINE_FAILED: &str = "Failed to refine code. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Derived state replaced.
    Done,
    /// Precondition missing; no call made.
    Skipped,
    /// Another generation is in flight; request rejected.
    Busy,
    /// Call failed; session error set, state untouched.
    Failed,
}

/// Releases the in-flight slot on drop.
struct Slot<'a>(&'a AtomicBool);

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Session borrowed for the length of one generation; clears `loading` on drop.
struct Loading<'a>(&'a mut Session);

impl<'a> Loading<'a> {
    fn begin(session: &'a mut Session) -> Self {
        session.loading = true;
        session.error = None;
        Self(session)
    }
}

impl Deref for Loading<'_> {
    type Target = Session;
    fn deref(&self) -> &Session {
        &*self.0
    }
}

impl DerefMut for Loading<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        &mut *self.0
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.loading = false;
    }
}

pub struct Orchestrator {
    provider: DynProvider,
    images: ImageRequest,
    journal: Option<Journal>,
    in_flight: AtomicBool,
}

impl Orchestrator {
    pub fn new(provider: DynProvider) -> Self {
        Self {
            provider,
            images: ImageRequest::default(),
            journal: None,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<Slot<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Slot(&self.in_flight))
    }

    fn record<T: serde::Serialize>(&self, stage: &str, payload: &T) {
        if let Some(j) = &self.journal {
            if let Err(e) = j.save_stage(stage, payload) {
                warn!(stage, error = %format!("{e:#}"), "could not save stage artifact");
            }
        }
    }

    /// Summary/Preview -> Preview. Layout first; images only once it resolved.
    pub async fn generate_preview(&self, session: &mut Session) -> Outcome {
        let Some(_slot) = self.try_begin() else {
            warn!("generate_preview rejected: generation already in flight");
            return Outcome::Busy;
        };
        let mut session = Loading::begin(session);
        let form = session.wizard.form().clone();

        match self.build_preview(&form).await {
            Ok(preview) => {
                info!(images = preview.image_payloads.len(), "preview ready");
                session.preview = Some(preview);
                session.wizard.enter(AppStep::Preview);
                Outcome::Done
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "preview generation failed");
                session.error = Some(PREVIEW_FAILED.into());
                Outcome::Failed
            }
        }
    }

    async fn build_preview(&self, form: &FormData) -> Result<PreviewData> {
        let layout = self
            .provider
            .derive_layout(form)
            .await
            .context("layout derivation")?;
        self.record("layout", &layout);

        let payloads = self
            .provider
            .generate_images(&layout.image_prompt, &self.images)
            .await
            .context("image generation")?;
        if payloads.len() < self.images.count {
            return Err(WeaverError::InsufficientImages {
                got: payloads.len(),
                need: self.images.count,
            }
            .into());
        }
        self.record("images", &payloads);

        Ok(PreviewData::new(layout.layout_description, payloads, &self.images.mime_type))
    }

    /// Preview -> Result, using the mockup at `selected`.
    pub async fn generate_code(&self, session: &mut Session, selected: usize) -> Outcome {
        if session.preview.is_none() {
            return Outcome::Skipped;
        }
        let Some(_slot) = self.try_begin() else {
            warn!("generate_code rejected: generation already in flight");
            return Outcome::Busy;
        };
        let mut session = Loading::begin(session);

        let result = match session.preview.as_ref() {
            Some(preview) => self.build_code(session.wizard.form(), preview, selected).await,
            None => return Outcome::Skipped,
        };
        match result {
            Ok(code) => {
                info!(selected, bytes = code.len(), "code ready");
                self.record("code", &code);
                session.final_code = Some(code);
                session.wizard.enter(AppStep::Result);
                Outcome::Done
            }
            Err(e) => {
                error!(selected, error = %format!("{e:#}"), "code generation failed");
                session.error = Some(CODE_FAILED.into());
                Outcome::Failed
            }
        }
    }

    async fn build_code(&self, form: &FormData, preview: &PreviewData, selected: usize) -> Result<String> {
        let image = preview
            .image_payloads
            .get(selected)
            .ok_or(WeaverError::ImageIndex {
                index: selected,
                available: preview.image_payloads.len(),
            })?;
        self.provider
            .generate_code(form, &preview.layout_description, image)
            .await
            .context("code generation")
    }

    /// Result -> Result with updated code.
    pub async fn refine_code(&self, session: &mut Session, instruction: &str) -> Outcome {
        let Some(current) = session.final_code.clone() else {
            return Outcome::Skipped;
        };
        let Some(_slot) = self.try_begin() else {
            warn!("refine_code rejected: generation already in flight");
            return Outcome::Busy;
        };
        let mut session = Loading::begin(session);

        match self.provider.refine_code(&current, instruction).await {
            Ok(code) => {
                info!(bytes = code.len(), "code refined");
                if let Some(j) = &self.journal {
                    let stage = j.next_refine_stage();
                    self.record(&stage, &serde_json::json!({ "instruction": instruction, "code": code }));
                }
                session.final_code = Some(code);
                Outcome::Done
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "refinement failed");
                session.error = Some(REFINE_FAILED.into());
                Outcome::Failed
            }
        }
    }
}
