mod dispatcher;
mod pipeline;

pub use {
    dispatcher::ProcessingDispatcher,
    pipeline::{GenerationOutput, GenerationPipeline, GenerationRequest, ProgressReporter},
};
