use leptos::prelude::*;
use quickvote_app::domain::OptionResult;

/// One option's result row. The button carries its index for the live script.
#[component]
pub fn VoteBar(option: OptionResult, selected: bool) -> impl IntoView {
    let class = if selected {
        "vote-bar vote-bar--selected"
    } else {
        "vote-bar"
    };
    let width = format!("width: {}%", option.percent);

    view! {
        <li class=class data-index=option.index.to_string()>
            <button type="button" class="vote-bar__button" data-vote=option.index.to_string()>
                <span class="vote-bar__label">{option.label}</span>
                <span class="vote-bar__count">
                    <span class="vote-bar__votes">{option.votes}</span>
                    " · "
                    <span class="vote-bar__percent">{option.percent} "%"</span>
                </span>
            </button>
            <div class="vote-bar__track">
                <div class="vote-bar__fill" style=width></div>
            </div>
        </li>
    }
}
