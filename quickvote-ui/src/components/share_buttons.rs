use leptos::prelude::*;
use quickvote_app::domain::ShareLinks;

/// Copy-link and share intents for one poll. `compact` drops the URL field for list rows.
/// Copying is handled by the page script through `data-copy-url`.
#[component]
pub fn ShareButtons(links: ShareLinks, #[prop(optional)] compact: bool) -> impl IntoView {
    let class = if compact { "share share--compact" } else { "share" };

    view! {
        <div class=class>
            {(!compact).then(|| view! {
                <input class="share__url" readonly aria-label="Poll link" value=links.poll_url.clone()/>
            })}
            <button type="button" class="button share__copy" data-copy-url=links.poll_url>
                "Copy link"
            </button>
            <a class="button button--whatsapp" href=links.whatsapp target="_blank" rel="noopener">
                "WhatsApp"
            </a>
            <a class="button button--twitter" href=links.twitter target="_blank" rel="noopener">
                "Twitter"
            </a>
        </div>
    }
}
