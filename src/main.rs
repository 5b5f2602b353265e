//! Service entry point: wires adapters to services and serves the
//! WebSocket gateway.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use arena_live::adapters::auth::{JwtConfig, JwtTokenVerifier};
use arena_live::adapters::memory::{
    InMemoryBracketRepository, InMemoryCounterStore, InMemoryDisputeRepository, InMemoryEventBus,
    InMemoryMatchRepository, InMemoryResultRepository, InMemoryRoleResolver,
};
use arena_live::adapters::realtime::{
    gateway_router, EventBroadcaster, GatewayState, HeartbeatMonitor, RoomRegistry,
};
use arena_live::adapters::redis::RedisCounterStore;
use arena_live::application::{
    AdmissionController, BracketProgressionService, DisputeWorkflow, MatchLifecycleController,
    WinnerDeterminationService,
};
use arena_live::config::AppConfig;
use arena_live::domain::foundation::EventKind;
use arena_live::ports::{CounterStore, EventSubscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    // Persistence. Single-node in-memory stores; a durable backend slots
    // in behind the same ports.
    let matches = Arc::new(InMemoryMatchRepository::new());
    let brackets = Arc::new(InMemoryBracketRepository::new());
    let disputes = Arc::new(InMemoryDisputeRepository::new());
    let results = Arc::new(InMemoryResultRepository::new());

    // Admission counters: shared store when Redis is configured, with the
    // process-local store always standing by as the degraded fallback.
    let fallback_store = Arc::new(InMemoryCounterStore::new());
    let primary_store: Arc<dyn CounterStore> = if config.redis.enabled() {
        let client = redis::Client::open(config.redis.url.as_str())?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        tracing::info!("admission counters on shared redis store");
        Arc::new(RedisCounterStore::new(conn))
    } else {
        tracing::info!("admission counters on process-local store");
        fallback_store.clone()
    };
    let admission = Arc::new(AdmissionController::new(
        primary_store,
        fallback_store,
        config.limits.clone(),
    ));

    // Event bus and services.
    let bus = Arc::new(InMemoryEventBus::new());
    let lifecycle = Arc::new(MatchLifecycleController::new(
        matches.clone(),
        bus.clone(),
        config.rules.allow_ties,
    ));
    let determination = Arc::new(WinnerDeterminationService::new(
        brackets.clone(),
        matches.clone(),
        results.clone(),
        bus.clone(),
    ));
    let progression = Arc::new(BracketProgressionService::new(
        brackets.clone(),
        matches.clone(),
        bus.clone(),
        determination,
    ));
    let dispute_workflow = Arc::new(DisputeWorkflow::new(
        disputes,
        matches,
        brackets,
        bus.clone(),
    ));
    bus.subscribe(EventKind::MatchCompleted, progression);

    // Real-time delivery.
    let registry = Arc::new(RoomRegistry::new());
    let broadcaster = Arc::new(EventBroadcaster::new(
        registry.clone(),
        config.realtime.debounce(),
    ));
    broadcaster.register(&*bus);

    let heartbeat = Arc::new(HeartbeatMonitor::new(
        registry.clone(),
        admission.clone(),
        config.realtime.probe_interval(),
        config.realtime.heartbeat_timeout(),
    ));
    tokio::spawn(heartbeat.run());

    let gateway = GatewayState {
        verifier: Arc::new(JwtTokenVerifier::new(&JwtConfig {
            secret: config.auth.jwt_secret.clone(),
            issuer: config.auth.issuer.clone(),
        })),
        resolver: Arc::new(InMemoryRoleResolver::new()),
        admission,
        registry,
        lifecycle,
        disputes: dispute_workflow,
    };

    let cors = if config.server.cors_origins_list().is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = config
            .server
            .cors_origins_list()
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    let app = gateway_router(gateway)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));

    if config.server.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
