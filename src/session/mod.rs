use crate::wire::{AppStep, PreviewData};
use crate::wizard::Wizard;

/// All mutable state of one wizard session.
///
/// Created at session start, reset by `start_over`. The wizard part is
/// driven through [`Wizard`]; the derived part (preview, code, loading,
/// error) is written only by the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub wizard: Wizard,
    pub(crate) preview: Option<PreviewData>,
    pub(crate) final_code: Option<String>,
    pub(crate) loading: bool,
    pub(crate) error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AppStep {
        self.wizard.phase()
    }

    pub fn preview(&self) -> Option<&PreviewData> {
        self.preview.as_ref()
    }

    pub fn final_code(&self) -> Option<&str> {
        self.final_code.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn start_over(&mut self) {
        self.wizard.reset();
        self.preview = None;
        self.final_code = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{FormData, FormField};

    #[test]
    fn start_over_clears_everything_from_any_phase() {
        for phase in [AppStep::Form, AppStep::Summary, AppStep::Preview, AppStep::Result] {
            let mut s = Session::new();
            s.wizard.update_field(FormField::Description, "dashboard");
            s.wizard.update_field(FormField::ExtraDetails, "charts");
            s.wizard.next();
            s.wizard.edit(0).unwrap();
            s.wizard.enter(phase);
            s.preview = Some(PreviewData::new("l".into(), vec!["a".into(), "b".into()], "image/png"));
            s.final_code = Some("<html></html>".into());
            s.error = Some("boom".into());

            s.start_over();

            assert_eq!(s.phase(), AppStep::Form);
            assert_eq!(s.wizard.form_step(), 0);
            assert_eq!(s.wizard.form(), &FormData::default());
            assert!(!s.wizard.is_editing());
            assert!(s.preview().is_none());
            assert!(s.final_code().is_none());
            assert!(s.error().is_none());
        }
    }

    #[test]
    fn dismiss_error_keeps_phase() {
        let mut s = Session::new();
        s.wizard.enter(AppStep::Summary);
        s.error = Some("x".into());
        s.dismiss_error();
        assert!(s.error().is_none());
        assert_eq!(s.phase(), AppStep::Summary);
    }
}
