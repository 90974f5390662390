use crate::application::{CastVote, CreatePoll, DeletePoll, DraftAssistant, PollQueries};
use crate::config::Config;
use crate::domain::ShareLinks;
use crate::infrastructure::auth::{GoogleOAuth, IdentityClient};
use crate::infrastructure::cerebras::CerebrasClient;
use crate::infrastructure::db::{create_connection, run_migrations, PollRepository};
use crate::infrastructure::live::PollFeed;
use crate::infrastructure::security::{CostTracker, RateLimiter};
use crate::infrastructure::store::PollStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub create_poll: Arc<CreatePoll>,
    pub cast_vote: Arc<CastVote>,
    pub delete_poll: Arc<DeletePoll>,
    pub poll_queries: PollQueries,
    pub draft_assistant: Arc<DraftAssistant>,
    pub identity: IdentityClient,
    pub google_oauth: Option<GoogleOAuth>,
    pub rate_limiter: RateLimiter,
    pub cost_tracker: Arc<CostTracker>,
    pub feed: PollFeed,
}

impl AppContext {
    pub fn new(config: Config, store: PollStore) -> Self {
        let feed = PollFeed::new();
        let cost_tracker = Arc::new(CostTracker::new());

        let cerebras = CerebrasClient::new(config.cerebras_api_key.clone())
            .with_endpoint(&config.cerebras_api_url, &config.cerebras_model);
        let identity = IdentityClient::new(config.identity_api_key.clone())
            .with_base_url(&config.identity_api_url);

        let google_oauth = config.google.as_ref().and_then(|g| {
            GoogleOAuth::new(&g.client_id, &g.client_secret, &g.redirect_uri)
                .map_err(|e| tracing::error!("Google sign-in disabled: {}", e))
                .ok()
        });

        Self {
            create_poll: Arc::new(CreatePoll::new(store.clone(), feed.clone())),
            cast_vote: Arc::new(CastVote::new(store.clone(), feed.clone())),
            delete_poll: Arc::new(DeletePoll::new(store.clone(), feed.clone())),
            poll_queries: PollQueries::new(store, feed.clone()),
            draft_assistant: Arc::new(DraftAssistant::new(cerebras, cost_tracker.clone())),
            identity,
            google_oauth,
            rate_limiter: RateLimiter::new(),
            cost_tracker,
            feed,
            config: Arc::new(config),
        }
    }

    pub fn in_memory(config: Config) -> Self {
        Self::new(config, PollStore::in_memory())
    }

    /// Postgres when `DATABASE_URL` is set and reachable, otherwise the in-process store.
    pub async fn from_env() -> Self {
        let config = Config::from_env();

        let store = match config.database_url.as_deref() {
            Some(url) => match create_connection(url).await {
                Ok(db) => {
                    if let Err(e) = run_migrations(&db).await {
                        tracing::error!("Failed to run migrations: {}", e);
                    }
                    tracing::info!("Using Postgres poll store");
                    PollStore::Postgres(PollRepository::new(db))
                }
                Err(e) => {
                    tracing::error!("Database connection failed, falling back to memory: {}", e);
                    PollStore::in_memory()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set, polls are kept in memory only");
                PollStore::in_memory()
            }
        };

        Self::new(config, store)
    }

    pub fn share_links(&self, poll_id: &str) -> ShareLinks {
        ShareLinks::for_poll(&self.config.public_origin, poll_id)
    }
}
