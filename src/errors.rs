use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeaverError {
    #[error("provider error: {0}")] Provider(String),
    #[error("malformed response: {0}")] Schema(String),
    #[error("image generation returned {got} image(s), need at least {need}")] InsufficientImages { got: usize, need: usize },
    #[error("no preview image at index {index} (have {available})")] ImageIndex { index: usize, available: usize },
    #[error("step {index} is out of range (have {len} steps)")] StepIndex { index: usize, len: usize },
    #[error("config error: {0}")] Config(String),
}
