mod routes;
mod shell;

use axum::{routing::post, Router};
use leptos::prelude::*;
use leptos_axum::{generate_route_list, handle_server_fns_with_context, LeptosRoutes};
use quickvote_app::AppContext;
use quickvote_ui::auth::GetCurrentUserFn;
use quickvote_ui::pages::{
    CategorizePollFn, CreatePollFn, DeletePollFn, GenerateOptionsFn, GetMyPollsFn, GetPollPageFn,
    RefineQuestionFn,
};
use quickvote_ui::App;
use shell::shell;
use std::net::SocketAddr;
use tower_http::compression::CompressionLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let conf = get_configuration(Some("Cargo.toml")).expect("Failed to load Leptos config");
    let leptos_options = conf.leptos_options;
    let addr = leptos_options.site_addr;

    let app_context = AppContext::from_env().await;

    let routes = generate_route_list(App);

    server_fn::axum::register_explicit::<GetCurrentUserFn>();
    server_fn::axum::register_explicit::<GetPollPageFn>();
    server_fn::axum::register_explicit::<CreatePollFn>();
    server_fn::axum::register_explicit::<GenerateOptionsFn>();
    server_fn::axum::register_explicit::<RefineQuestionFn>();
    server_fn::axum::register_explicit::<CategorizePollFn>();
    server_fn::axum::register_explicit::<GetMyPollsFn>();
    server_fn::axum::register_explicit::<DeletePollFn>();
    tracing::info!("Registered server functions under /rpc");

    let secure_cookies = app_context.config.public_origin.starts_with("https://");
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(7)));

    let app = Router::new()
        .route("/rpc/{*fn_name}", post({
            let ctx = app_context.clone();
            move |req| {
                let ctx = ctx.clone();
                async move {
                    handle_server_fns_with_context(
                        move || provide_context(ctx.clone()),
                        req
                    ).await
                }
            }
        }))
        .leptos_routes_with_context(
            &leptos_options,
            routes,
            {
                let ctx = app_context.clone();
                move || provide_context(ctx.clone())
            },
            {
                let leptos_options = leptos_options.clone();
                move || shell(leptos_options.clone())
            },
        )
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptos_options)
        .merge(routes::api_router(app_context.clone()))
        .layer(session_layer)
        .layer(CompressionLayer::new());

    tracing::info!("Listening on http://{}", addr);
    tracing::info!(
        "Poll store: {}. AI budget: {} requests/day",
        app_context.poll_queries.backend_name(),
        app_context.cost_tracker.get_remaining_requests()
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
