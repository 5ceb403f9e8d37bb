//! Request extractors shared by handlers.

pub mod step_form;
pub mod validate;

pub use step_form::StepForm;
pub use validate::ValidatedJson;
