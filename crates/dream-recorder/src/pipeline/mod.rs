mod http_pipeline;
mod luma_client;
mod openai_client;
mod thumbnailer;

pub(crate) use {
    http_pipeline::HttpPipeline, luma_client::LumaClient, openai_client::OpenAiClient,
    thumbnailer::Thumbnailer,
};

#[cfg(test)]
pub(crate) use {
    luma_client::{GenerationStatus, PollStep},
    openai_client::{ChatResponse, TranscriptionResponse},
};
