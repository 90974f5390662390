use leptos::prelude::*;
use leptos_meta::MetaTags;
use quickvote_ui::App;

const CSS: &str = r#"
:root {
    --base: #faf4ed;
    --surface: #fffaf3;
    --overlay: #f2e9e1;
    --muted: #9893a5;
    --subtle: #797593;
    --text: #575279;
    --love: #b4637a;
    --gold: #ea9d34;
    --pine: #286983;
    --foam: #56949f;
}
* { box-sizing: border-box; margin: 0; padding: 0; }
body {
    font-family: 'Inter', -apple-system, sans-serif;
    background: var(--base);
    color: var(--text);
    min-height: 100vh;
}
a { color: var(--pine); }
.container { max-width: 800px; margin: 0 auto; padding: 1.5rem; }
.nav { display: flex; align-items: center; gap: 1.5rem; padding: 1rem 1.5rem; border-bottom: 1px solid var(--overlay); background: var(--surface); }
.nav__brand { font-weight: 800; color: var(--love); text-decoration: none; font-size: 1.2rem; }
.nav__links { display: flex; gap: 1rem; flex: 1; }
.nav__links a { text-decoration: none; color: var(--subtle); }
.nav__user { display: flex; align-items: center; gap: 0.5rem; }
.nav__avatar { width: 28px; height: 28px; border-radius: 50%; }
.nav__logout { background: none; border: none; color: var(--subtle); cursor: pointer; text-decoration: underline; }
.page-title { font-size: 1.8rem; margin: 1.5rem 0 1rem; }
.hero { text-align: center; padding: 3rem 0 2rem; }
.hero__title { font-size: clamp(2rem, 5vw, 3rem); color: var(--love); font-weight: 800; margin-bottom: 0.75rem; }
.hero__subtitle { color: var(--subtle); font-size: 1.1rem; max-width: 500px; margin: 0 auto 1.5rem; }
.hero__actions { display: flex; gap: 1rem; justify-content: center; }
.features { list-style: none; display: grid; gap: 0.75rem; margin-top: 2rem; }
.features li { background: var(--surface); border: 2px solid var(--overlay); border-radius: 8px; padding: 1rem; }
.button {
    display: inline-block; padding: 0.6rem 1.1rem; border: 2px solid var(--overlay); border-radius: 8px;
    background: var(--surface); color: var(--text); font-weight: 600; cursor: pointer; text-decoration: none;
}
.button:disabled { opacity: 0.5; cursor: not-allowed; }
.button--primary { background: var(--pine); border-color: var(--pine); color: var(--base); }
.button--danger { border-color: var(--love); color: var(--love); }
.button--ghost { border-color: transparent; background: none; color: var(--muted); }
.button--whatsapp { border-color: #25d366; }
.button--twitter { border-color: #1d9bf0; }
.poll-form, .form { display: flex; flex-direction: column; gap: 0.75rem; }
.poll-form__label, .form__label { font-weight: 600; margin-top: 0.5rem; }
.poll-form__row { display: flex; gap: 0.5rem; flex-wrap: wrap; }
.poll-form__input, .form__input {
    flex: 1; padding: 0.75rem 1rem; border: 2px solid var(--overlay);
    border-radius: 8px; background: var(--surface); color: var(--text); font-size: 1rem;
}
.poll-form__input:focus, .form__input:focus { outline: none; border-color: var(--pine); }
.poll-form__options { display: flex; flex-direction: column; gap: 0.5rem; padding-left: 1.5rem; }
.poll-form__option { display: flex; gap: 0.5rem; }
.form__error { color: var(--love); font-weight: 600; }
.form__message { color: var(--pine); font-weight: 600; }
.auth { max-width: 420px; margin: 0 auto; }
.auth__divider { text-align: center; color: var(--muted); margin: 1rem 0; }
.auth__links { margin-top: 1rem; color: var(--subtle); }
.google-login-btn { width: 100%; text-align: center; }
.poll { background: var(--surface); border: 2px solid var(--overlay); border-radius: 12px; padding: 1.5rem; margin: 2rem 0; }
.poll__category { color: var(--foam); font-size: 0.85rem; text-transform: uppercase; letter-spacing: 0.05em; }
.poll__title { font-size: 1.6rem; margin: 0.5rem 0 1.25rem; }
.poll__options { list-style: none; display: flex; flex-direction: column; gap: 0.75rem; }
.poll__total { margin-top: 1rem; color: var(--subtle); }
.poll__status { margin-top: 0.5rem; color: var(--love); font-weight: 600; }
.vote-bar__button {
    width: 100%; display: flex; justify-content: space-between; padding: 0.6rem 0.8rem;
    background: none; border: 2px solid var(--overlay); border-radius: 8px; cursor: pointer; color: var(--text); font-size: 1rem;
}
.vote-bar--selected .vote-bar__button { border-color: var(--pine); font-weight: 700; }
.vote-bar__track { height: 6px; background: var(--overlay); border-radius: 3px; margin-top: 0.3rem; overflow: hidden; }
.vote-bar__fill { height: 100%; background: var(--gold); transition: width 0.3s ease; }
.share { display: flex; gap: 0.5rem; flex-wrap: wrap; margin-top: 1.5rem; padding-top: 1rem; border-top: 2px solid var(--overlay); }
.share__url { flex: 1; min-width: 200px; padding: 0.5rem; border: 2px solid var(--overlay); border-radius: 8px; background: var(--base); color: var(--subtle); }
.share--compact { margin-top: 0; padding-top: 0; border-top: none; }
.share--compact .button { padding: 0.3rem 0.6rem; font-size: 0.85rem; }
.suggestions { background: var(--overlay); border-radius: 8px; padding: 1rem; }
.suggestions__header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 0.5rem; }
.suggestions__title { color: var(--subtle); font-weight: 600; }
.suggestions__list { list-style: none; display: flex; flex-wrap: wrap; gap: 0.5rem; }
.chip { display: flex; align-items: center; background: var(--surface); border: 2px solid var(--foam); border-radius: 999px; }
.chip__add, .chip__dismiss { background: none; border: none; padding: 0.3rem 0.7rem; color: var(--text); cursor: pointer; }
.chip__add:disabled { opacity: 0.5; cursor: not-allowed; }
.chip__dismiss { color: var(--muted); }
.refined { color: var(--subtle); font-size: 0.9rem; }
.refined__row { display: flex; gap: 0.5rem; align-items: center; margin-top: 0.3rem; }
.refined__accept { flex: 1; text-align: left; padding: 0.5rem 0.75rem; background: var(--overlay); border: 2px solid var(--overlay); border-radius: 8px; color: var(--text); cursor: pointer; }
.dialog { position: fixed; inset: 0; background: rgba(0, 0, 0, 0.5); display: flex; align-items: center; justify-content: center; padding: 1rem; z-index: 50; }
.dialog__panel { background: var(--surface); border-radius: 12px; padding: 1.5rem; max-width: 380px; width: 100%; }
.dialog__title { font-size: 1.2rem; margin-bottom: 0.5rem; }
.dialog__message { color: var(--subtle); margin-bottom: 1rem; }
.dialog__actions { display: flex; justify-content: flex-end; gap: 0.5rem; }
.category { margin-bottom: 1rem; background: var(--surface); border: 2px solid var(--overlay); border-radius: 8px; }
.category__header { width: 100%; display: flex; justify-content: space-between; padding: 0.9rem 1rem; background: none; border: none; font-size: 1.05rem; font-weight: 700; color: var(--text); cursor: pointer; }
.category__count { color: var(--muted); }
.category__polls { list-style: none; border-top: 1px solid var(--overlay); }
.category__poll { display: flex; align-items: center; flex-wrap: wrap; gap: 1rem; padding: 0.75rem 1rem; }
.category__poll a { flex: 1; }
.category__votes { color: var(--muted); font-size: 0.9rem; }
.prompt { text-align: center; padding: 2rem; background: var(--surface); border: 2px dashed var(--overlay); border-radius: 12px; margin: 2rem 0; }
.prompt__message { margin-bottom: 1rem; color: var(--subtle); }
.about p { margin-bottom: 1rem; line-height: 1.7; }
.loading { display: flex; flex-direction: column; align-items: center; padding: 3rem; }
.loading__spinner {
    width: 50px; height: 50px; border: 4px solid var(--overlay);
    border-top-color: var(--gold); border-radius: 50%; animation: spin 1s linear infinite;
}
@keyframes spin { to { transform: rotate(360deg); } }
.loading__text { margin-top: 1rem; color: var(--subtle); font-style: italic; }
.error { background: #fce8ec; border: 2px solid var(--love); border-radius: 8px; padding: 1.25rem; margin: 1rem 0; }
.error__title { color: var(--love); font-weight: 700; margin-bottom: 0.5rem; }
.error__message { color: #8b3d4d; }
.error__retry { margin-top: 1rem; padding: 0.5rem 1rem; background: var(--love); color: var(--base); border: none; border-radius: 4px; cursor: pointer; }
"#;

/// Keeps `#poll` and `#my-polls` live over SSE and sends votes. Re-attaches
/// after client-side navigation and closes the stream when the element goes away.
const LIVE_SCRIPT: &str = r#"
(function () {
    var current = null;

    function setText(root, selector, text) {
        var el = root.querySelector(selector);
        if (el) el.textContent = text;
    }

    function renderPoll(root, view) {
        view.options.forEach(function (opt) {
            var row = root.querySelector('.vote-bar[data-index="' + opt.index + '"]');
            if (!row) return;
            setText(row, '.vote-bar__votes', String(opt.votes));
            setText(row, '.vote-bar__percent', opt.percent + '%');
            var fill = row.querySelector('.vote-bar__fill');
            if (fill) fill.style.width = opt.percent + '%';
            row.classList.toggle('vote-bar--selected', view.myChoice === opt.index);
        });
        setText(root, '#poll-total', view.total === 1 ? '1 vote' : view.total + ' votes');
    }

    function closePoll(root, message) {
        setText(root, '#poll-status', message);
        root.querySelectorAll('[data-vote]').forEach(function (b) { b.disabled = true; });
    }

    function vote(root, base, option) {
        fetch(base + '/vote', {
            method: 'POST',
            credentials: 'same-origin',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ option: option })
        })
            .then(function (r) {
                return r.json().then(function (body) { return { status: r.status, body: body }; });
            })
            .then(function (res) {
                if (res.status === 401 && res.body.redirect) {
                    window.location.href = res.body.redirect;
                    return;
                }
                if (res.status !== 200) {
                    setText(root, '#poll-status', res.body.error || 'Could not record your vote.');
                    return;
                }
                setText(root, '#poll-status', '');
                renderPoll(root, res.body.poll);
            })
            .catch(function () { setText(root, '#poll-status', 'Could not record your vote.'); });
    }

    function watchPoll(root) {
        var base = '/api/polls/' + encodeURIComponent(root.dataset.pollId);
        var source = new EventSource(base + '/events');
        source.addEventListener('snapshot', function (e) { renderPoll(root, JSON.parse(e.data)); });
        source.addEventListener('deleted', function () {
            closePoll(root, 'This poll was deleted.');
            source.close();
        });
        source.addEventListener('not_found', function () {
            closePoll(root, "The poll you are looking for doesn't exist or was deleted.");
            source.close();
        });

        root.addEventListener('click', function (e) {
            var button = e.target.closest('[data-vote]');
            if (button) vote(root, base, Number(button.dataset.vote));
        });
        return source;
    }

    function watchMyPolls() {
        var source = new EventSource('/api/my-polls/events');
        var first = true;
        source.addEventListener('snapshot', function () {
            if (first) {
                first = false;
                return;
            }
            window.location.reload();
        });
        return source;
    }

    function sync() {
        if (current && !document.body.contains(current.root)) {
            current.source.close();
            current = null;
        }
        if (current) return;
        var poll = document.getElementById('poll');
        if (poll) {
            current = { root: poll, source: watchPoll(poll) };
            return;
        }
        var mine = document.getElementById('my-polls');
        if (mine) {
            current = { root: mine, source: watchMyPolls() };
        }
    }

    document.addEventListener('click', function (e) {
        var copy = e.target.closest('[data-copy-url]');
        if (!copy || !navigator.clipboard) return;
        navigator.clipboard.writeText(copy.dataset.copyUrl).then(function () {
            copy.textContent = 'Copied!';
            setTimeout(function () { copy.textContent = 'Copy link'; }, 2000);
        });
    });

    document.addEventListener('DOMContentLoaded', function () {
        sync();
        new MutationObserver(sync).observe(document.body, { childList: true, subtree: true });
    });
})();
"#;

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <link rel="icon" href="data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='.9em' font-size='90'>🗳️</text></svg>"/>
                <style>{CSS}</style>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
                <script inner_html=LIVE_SCRIPT></script>
            </body>
        </html>
    }
}
