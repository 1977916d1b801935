pub mod cli;
pub mod session;

pub use session::{Notice, RenderRequest, SessionController, UploadDecision, UploadPhase};
