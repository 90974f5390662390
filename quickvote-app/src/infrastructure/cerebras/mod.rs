mod client;
mod prompt;
mod reply;
mod types;

pub use client::{CerebrasClient, DEFAULT_API_URL, DEFAULT_MODEL};
pub use prompt::{build_category_prompt, build_options_prompt, build_refine_prompt};
pub use reply::{clean_plain_reply, parse_category_reply, parse_options_reply, parse_refined_reply};
pub use types::Sampling;
