pub mod classifier;
pub mod processor;

pub use classifier::{classify, WebhookEvent};
pub use processor::process_webhook;
