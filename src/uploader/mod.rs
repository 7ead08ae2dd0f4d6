// Post submission module
//
// This module packages a selection of images and a caption into one
// multipart request against the photo service API and resolves the
// navigation outcome.

pub mod api_client;
pub mod payload;
pub mod submit;

pub use submit::{PostSubmission, PostSubmissionHandler, Route, SubmitOutcome};
