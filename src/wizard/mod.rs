use crate::errors::WeaverError;
use crate::wire::{AppStep, Direction, FormData, FormField, StepInfo, STEPS};

/// Phase and form-step controller for one wizard session.
///
/// Generation-dependent transitions (Summary -> Preview, Preview -> Result)
/// are driven by the orchestrator; everything else lives here.
#[derive(Debug, Clone)]
pub struct Wizard {
    phase: AppStep,
    form_step: usize,
    form: FormData,
    editing: bool,
    direction: Direction,
}

impl Default for Wizard {
    fn default() -> Self {
        Self {
            phase: AppStep::Form,
            form_step: 0,
            form: FormData::default(),
            editing: false,
            direction: Direction::Forward,
        }
    }
}

impl Wizard {
    pub fn phase(&self) -> AppStep { self.phase }
    #[cfg(test)]
    pub fn form_step(&self) -> usize { self.form_step }
    pub fn form(&self) -> &FormData { &self.form }
    pub fn is_editing(&self) -> bool { self.editing }
    pub fn direction(&self) -> Direction { self.direction }

    pub fn current_step(&self) -> &'static StepInfo {
        &STEPS[self.form_step]
    }

    pub fn is_first_step(&self) -> bool {
        self.form_step == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.form_step == STEPS.len() - 1
    }

    /// Overwrites one field. No validation; empty values are fine.
    pub fn update_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set(field, value.into());
    }

    pub fn next(&mut self) {
        if self.editing {
            self.editing = false;
            self.phase = AppStep::Summary;
            return;
        }

        if !self.is_last_step() {
            self.direction = Direction::Forward;
            self.form_step += 1;
        } else {
            self.phase = AppStep::Summary;
        }
    }

    pub fn back(&mut self) {
        if self.form_step > 0 {
            self.direction = Direction::Backward;
            self.form_step -= 1;
        }
    }

    /// Jump from Summary into one step; the following `next()` returns to Summary.
    pub fn edit(&mut self, step: usize) -> Result<(), WeaverError> {
        if step >= STEPS.len() {
            return Err(WeaverError::StepIndex { index: step, len: STEPS.len() });
        }
        self.editing = true;
        self.direction = Direction::Backward;
        self.form_step = step;
        self.phase = AppStep::Form;
        Ok(())
    }

    /// Preview's back action.
    pub fn back_to_summary(&mut self) {
        if self.phase == AppStep::Preview {
            self.phase = AppStep::Summary;
        }
    }

    pub(crate) fn enter(&mut self, phase: AppStep) {
        self.phase = phase;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
