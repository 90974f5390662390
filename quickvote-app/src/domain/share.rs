use serde::{Deserialize, Serialize};

const WHATSAPP_TEXT: &str = "Check out this poll:";
const TWITTER_TEXT: &str = "Vote on my poll:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLinks {
    pub poll_url: String,
    pub whatsapp: String,
    pub twitter: String,
}

pub fn poll_path(poll_id: &str) -> String {
    format!("/poll/{}", urlencoding::encode(poll_id))
}

impl ShareLinks {
    pub fn for_poll(origin: &str, poll_id: &str) -> Self {
        let poll_url = format!("{}{}", origin.trim_end_matches('/'), poll_path(poll_id));
        let whatsapp = format!(
            "https://wa.me/?text={}",
            urlencoding::encode(&format!("{WHATSAPP_TEXT}\n{poll_url}"))
        );
        let twitter = format!(
            "https://twitter.com/intent/tweet?text={}",
            urlencoding::encode(&format!("{TWITTER_TEXT}\n{poll_url}"))
        );

        Self {
            poll_url,
            whatsapp,
            twitter,
        }
    }
}
