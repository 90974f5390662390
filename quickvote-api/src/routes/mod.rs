mod ai;
mod auth;
mod events;
mod extract;
mod polls;

use axum::Router;
use quickvote_app::AppContext;

/// JSON, SSE and auth routes. The session layer is added by the caller.
pub fn api_router(ctx: AppContext) -> Router {
    Router::new()
        .merge(ai::router())
        .merge(polls::router())
        .merge(events::router())
        .merge(auth::router())
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body, BodyDataStream};
    use axum::extract::Path;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use axum::routing::post;
    use axum::Json;
    use futures::StreamExt;
    use quickvote_app::domain::{AuthProvider, PollDraft, SessionUser};
    use quickvote_app::infrastructure::auth::IdentityClient;
    use quickvote_app::infrastructure::live::FeedKey;
    use quickvote_app::infrastructure::security::RateLimiter;
    use quickvote_app::Config;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    fn app(ctx: AppContext) -> Router {
        api_router(ctx).layer(SessionManagerLayer::new(MemoryStore::default()).with_secure(false))
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn fake_llm(content: &'static str) -> String {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move || async move { Json(json!({"choices": [{"message": {"content": content}}]})) }),
        );
        format!("{}/v1/chat/completions", spawn(router).await)
    }

    async fn fake_identity() -> String {
        let router = Router::new().route(
            "/v1/{method}",
            post(|Path(method): Path<String>| async move {
                match method.as_str() {
                    "accounts:signInWithPassword" => Json(json!({"idToken": "t", "localId": "voter-1"})),
                    "accounts:lookup" => Json(json!({"users": [{
                        "localId": "voter-1",
                        "email": "voter@example.com",
                        "emailVerified": true
                    }]})),
                    _ => Json(json!({})),
                }
            }),
        );
        format!("{}/v1", spawn(router).await)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn user(uid: &str) -> SessionUser {
        SessionUser {
            uid: uid.to_string(),
            email: format!("{uid}@example.com"),
            name: None,
            avatar_url: None,
            provider: AuthProvider::Password,
        }
    }

    /// Splits an event-stream body into `event:`/`data:` frames.
    struct Frames {
        stream: BodyDataStream,
        buffer: String,
    }

    impl Frames {
        fn new(response: Response) -> Self {
            Self {
                stream: response.into_body().into_data_stream(),
                buffer: String::new(),
            }
        }

        /// The next frame as `(event, data)`, or `None` once the stream ends.
        async fn next(&mut self) -> Option<(String, Value)> {
            loop {
                if let Some(end) = self.buffer.find("\n\n") {
                    let frame: String = self.buffer.drain(..end + 2).collect();
                    let field = |name: &str| {
                        frame
                            .lines()
                            .find_map(|line| line.strip_prefix(name))
                            .map(|rest| rest.trim_start().to_string())
                            .unwrap_or_default()
                    };
                    let data = serde_json::from_str(&field("data:")).unwrap_or(Value::Null);
                    return Some((field("event:"), data));
                }
                let chunk = tokio::time::timeout(Duration::from_secs(5), self.stream.next())
                    .await
                    .expect("no event within 5s")?;
                self.buffer.push_str(std::str::from_utf8(&chunk.unwrap()).unwrap());
            }
        }
    }

    async fn create_lunch_poll(ctx: &AppContext, owner: &SessionUser) -> String {
        ctx.create_poll
            .execute(
                Some(owner),
                PollDraft {
                    title: "Lunch?".to_string(),
                    options: vec!["Pizza".to_string(), "Sushi".to_string()],
                    category: Some("Food".to_string()),
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn open_events(ctx: &AppContext, poll_id: &str) -> Response {
        app(ctx.clone())
            .oneshot(
                Request::get(format!("/api/polls/{poll_id}/events"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_poll_events_follow_votes_until_deleted() {
        let ctx = AppContext::in_memory(Config::default());
        let alice = user("alice");
        let poll_id = create_lunch_poll(&ctx, &alice).await;

        let response = open_events(&ctx, &poll_id).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));
        let mut frames = Frames::new(response);

        let (event, data) = frames.next().await.unwrap();
        assert_eq!(event, "snapshot");
        assert_eq!(data["id"], poll_id.as_str());
        assert_eq!(data["total"], 0);

        ctx.cast_vote.execute(Some(&user("bob")), &poll_id, 1).await.unwrap();
        let (event, data) = frames.next().await.unwrap();
        assert_eq!(event, "snapshot");
        assert_eq!(data["total"], 1);
        assert_eq!(data["options"][1]["votes"], 1);

        ctx.delete_poll.execute(Some(&alice), &poll_id).await.unwrap();
        let (event, data) = frames.next().await.unwrap();
        assert_eq!(event, "deleted");
        assert_eq!(data["pollId"], poll_id.as_str());

        assert!(frames.next().await.is_none());
        assert_eq!(ctx.feed.subscriber_count(&FeedKey::Poll(poll_id)), 0);
    }

    #[tokio::test]
    async fn test_poll_events_for_unknown_poll() {
        let ctx = AppContext::in_memory(Config::default());
        let mut frames = Frames::new(open_events(&ctx, "missing").await);

        let (event, _) = frames.next().await.unwrap();
        assert_eq!(event, "not_found");
        assert!(frames.next().await.is_none());
        assert_eq!(ctx.feed.channel_count(), 0);
    }

    #[tokio::test]
    async fn test_poll_events_release_subscription_on_disconnect() {
        let ctx = AppContext::in_memory(Config::default());
        let poll_id = create_lunch_poll(&ctx, &user("alice")).await;
        let key = FeedKey::Poll(poll_id.clone());

        let mut frames = Frames::new(open_events(&ctx, &poll_id).await);
        assert_eq!(frames.next().await.map(|(event, _)| event).as_deref(), Some("snapshot"));
        assert_eq!(ctx.feed.subscriber_count(&key), 1);

        drop(frames);
        assert_eq!(ctx.feed.subscriber_count(&key), 0);
        assert_eq!(ctx.feed.channel_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_vote_body_is_json_error() {
        let response = app(AppContext::in_memory(Config::default()))
            .oneshot(json_request(Method::POST, "/api/polls/abc123/vote", json!({"option": -1})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_malformed_create_body_is_json_error() {
        let response = app(AppContext::in_memory(Config::default()))
            .oneshot(json_request(Method::POST, "/api/polls", json!({"title": 7})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_anonymous_vote_gets_sign_in_redirect() {
        let response = app(AppContext::in_memory(Config::default()))
            .oneshot(json_request(Method::POST, "/api/polls/abc123/vote", json!({"option": 0})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["redirect"], "/signin?returnTo=%2Fpoll%2Fabc123");
    }

    #[tokio::test]
    async fn test_unknown_poll_is_404() {
        let response = app(AppContext::in_memory(Config::default()))
            .oneshot(Request::get("/api/polls/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ai_endpoint_rejects_empty_question() {
        let response = app(AppContext::in_memory(Config::default()))
            .oneshot(json_request(Method::POST, "/api/ai/generate-options", json!({"question": "  "})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid question input");
    }

    #[tokio::test]
    async fn test_ai_endpoint_without_key() {
        let response = app(AppContext::in_memory(Config::default()))
            .oneshot(json_request(Method::POST, "/api/ai/refine-question", json!({"question": "Cats?"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["message"], "API key not configured");
    }

    #[tokio::test]
    async fn test_categorize_requires_title_and_options() {
        let response = app(AppContext::in_memory(Config::default()))
            .oneshot(json_request(Method::POST, "/api/ai/categorize-poll", json!({"title": "", "options": []})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Title and options are required");
    }

    #[tokio::test]
    async fn test_generate_options_against_fake_model() {
        let config = Config {
            cerebras_api_key: Some("test-key".to_string()),
            cerebras_api_url: fake_llm(r#"["Pizza", "Sushi", "Tacos", "Pizza"]"#).await,
            ..Config::default()
        };
        let response = app(AppContext::in_memory(config))
            .oneshot(json_request(
                Method::POST,
                "/api/ai/generate-options",
                json!({"question": "Lunch?", "usedOptions": ["Tacos"]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["options"], json!(["Pizza", "Sushi"]));
    }

    #[tokio::test]
    async fn test_ai_rate_limit_is_429() {
        let mut ctx = AppContext::in_memory(Config::default());
        ctx.rate_limiter = RateLimiter::with_limits(1, 10);
        let router = app(ctx);

        let first = router
            .clone()
            .oneshot(json_request(Method::POST, "/api/ai/refine-question", json!({"question": "Cats?"})))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let second = router
            .oneshot(json_request(Method::POST, "/api/ai/refine-question", json!({"question": "Cats?"})))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_invalid_ai_input_does_not_use_quota() {
        let mut ctx = AppContext::in_memory(Config::default());
        ctx.rate_limiter = RateLimiter::with_limits(1, 10);
        let router = app(ctx);

        for _ in 0..2 {
            let rejected = router
                .clone()
                .oneshot(json_request(Method::POST, "/api/ai/refine-question", json!({"question": ""})))
                .await
                .unwrap();
            assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
        }

        let valid = router
            .oneshot(json_request(Method::POST, "/api/ai/refine-question", json!({"question": "Cats?"})))
            .await
            .unwrap();
        assert_eq!(valid.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(valid).await["message"], "API key not configured");
    }

    #[tokio::test]
    async fn test_me_without_session() {
        let response = app(AppContext::in_memory(Config::default()))
            .oneshot(Request::get("/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await["authenticated"], false);
    }

    #[tokio::test]
    async fn test_sign_in_then_create_and_vote() {
        let mut ctx = AppContext::in_memory(Config::default());
        ctx.identity = IdentityClient::new(Some("key".to_string())).with_base_url(fake_identity().await);
        let router = app(ctx);

        let sign_in = router
            .clone()
            .oneshot(
                Request::post("/auth/signin")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("email=voter%40example.com&password=secret1&returnTo=%2Fcreate"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(sign_in.status(), StatusCode::SEE_OTHER);
        assert_eq!(sign_in.headers()[header::LOCATION], "/create");
        let cookie = sign_in.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let mut create = json_request(
            Method::POST,
            "/api/polls",
            json!({"title": "Lunch?", "options": ["Pizza", "Sushi"], "category": "Food"}),
        );
        create.headers_mut().insert(header::COOKIE, cookie.parse().unwrap());
        let created = router.clone().oneshot(create).await.unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let poll = body_json(created).await;
        assert_eq!(poll["userId"], "voter-1");

        let mut vote = json_request(
            Method::POST,
            &format!("/api/polls/{}/vote", poll["id"].as_str().unwrap()),
            json!({"option": 1}),
        );
        vote.headers_mut().insert(header::COOKIE, cookie.parse().unwrap());
        let voted = router.oneshot(vote).await.unwrap();
        assert_eq!(voted.status(), StatusCode::OK);

        let body = body_json(voted).await;
        assert_eq!(body["outcome"]["kind"], "recorded");
        assert_eq!(body["poll"]["myChoice"], 1);
        assert_eq!(body["poll"]["options"][1]["percent"], 100);
    }

    #[tokio::test]
    async fn test_sign_up_password_mismatch_redirects_with_error() {
        let response = app(AppContext::in_memory(Config::default()))
            .oneshot(
                Request::post("/auth/signup")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("name=A&email=a%40example.com&password=abcdef&repeatPassword=abcdeg"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/signup?error=Passwords%20do%20not%20match"
        );
    }
}
