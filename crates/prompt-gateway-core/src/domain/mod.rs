//! Domain types for the generation pipeline.

mod generation;
mod reply;

pub use generation::{
    ChatMessage, ChatRole, GenerationOptions, GenerationOutcome, GenerationRequest, QueryParams,
    RequestParameters,
};
pub use reply::{BackendReply, ChatChunk, ChunkMessage, ChunkStream, NormalizedResponse, ReplyShape};
