pub mod publish_ctx;
pub mod publish_flow;

pub use publish_ctx::PublishCtx;
pub use publish_flow::{PublishFlow, PublishOutcome};
