//! Service entry point: HTTP surface plus the background workers
//! (outbox drainer, cross-service consumer, relay consumer, expiry
//! scanner), all bound to one shutdown signal.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::{broadcast, watch};
use tracing_subscriber::EnvFilter;

use storefront::adapters::http::{api_router, HttpUserDirectory};
use storefront::adapters::http::{orders::OrderAppState, outbox::OutboxAppState, users::UserAppState};
use storefront::adapters::{
    BusConsumer, DrainerConfig, ExpiryScanner, ExpiryScannerConfig, KafkaBusPublisher,
    OutboxDrainer, PgOrderStore, PgOutboxStore, PgUserStore, RelayBridge, RelayFeed,
};
use storefront::application::handlers::orders::{
    CancelOrdersOnUserInactivated, CreateOrderHandler, UpdateOrderStatusHandler,
};
use storefront::application::handlers::users::{ChangeUserStatusHandler, CreateUserHandler};
use storefront::config::AppConfig;
use storefront::domain::foundation::topics;
use storefront::ports::{EventRouter, OrderStore, OutboxStore, UserStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.log_level))
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Stores. The outbox acquires one extra attempt at the retry cap so the
    // publisher can route exhausted rows to the dead-letter topic.
    let outbox: Arc<dyn OutboxStore> =
        Arc::new(PgOutboxStore::new(pool.clone(), config.outbox.max_retries));
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
    let orders: Arc<dyn OrderStore> = Arc::new(PgOrderStore::new(pool.clone()));

    // Process-wide bus producer.
    let publisher = Arc::new(KafkaBusPublisher::new(&config.bus, &config.outbox)?);

    // Command handlers.
    let directory = Arc::new(HttpUserDirectory::new(&config.orders)?);
    let user_state = UserAppState {
        create: Arc::new(CreateUserHandler::new(users.clone())),
        change_status: Arc::new(ChangeUserStatusHandler::new(users.clone())),
        users: users.clone(),
    };
    let order_state = OrderAppState {
        create: Arc::new(CreateOrderHandler::new(
            orders.clone(),
            directory,
            config.orders.order_expiry_default_minutes,
        )),
        update_status: Arc::new(UpdateOrderStatusHandler::new(orders.clone())),
        orders: orders.clone(),
    };
    let outbox_state = OutboxAppState {
        outbox: outbox.clone(),
    };

    // Cross-service consumer: configured topics routed to their reaction
    // handlers.
    let cascade = Arc::new(CancelOrdersOnUserInactivated::new(orders.clone()));
    let mut router = EventRouter::new();
    for topic in &config.bus.subscribed_topics {
        match topic.as_str() {
            topics::USERS_STATUS_CHANGED => router.subscribe(topic, cascade.clone()),
            other => tracing::warn!(topic = other, "No handler for subscribed topic"),
        }
    }
    let consumer = BusConsumer::new(&config.bus, &config.bus.consumer_group, Arc::new(router))?;

    // Fan-out relay on its own consumer group.
    let (feed, _) = broadcast::channel(256);
    let mut relay_router = EventRouter::new();
    RelayBridge::new(feed.clone()).register(&mut relay_router, &config.bus.dead_letter_topic);
    let relay_consumer = BusConsumer::new(
        &config.bus,
        &config.bus.relay_consumer_group,
        Arc::new(relay_router),
    )?;

    // Workers.
    let drainer = OutboxDrainer::with_config(
        outbox.clone(),
        publisher.clone(),
        DrainerConfig::from(&config.outbox),
    );
    let scanner =
        ExpiryScanner::with_config(orders.clone(), ExpiryScannerConfig::from(&config.orders));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown requested");
                let _ = shutdown_tx.send(true);
            }
        });
    }

    consumer.ensure_topics(15, Duration::from_secs(2)).await;
    consumer.subscribe()?;
    relay_consumer.subscribe()?;

    let mut workers = Vec::new();
    let rx = shutdown_rx.clone();
    workers.push(tokio::spawn(async move { drainer.run(rx).await }));
    let rx = shutdown_rx.clone();
    workers.push(tokio::spawn(async move { consumer.run(rx).await }));
    let rx = shutdown_rx.clone();
    workers.push(tokio::spawn(async move { relay_consumer.run(rx).await }));
    let rx = shutdown_rx.clone();
    workers.push(tokio::spawn(async move { scanner.run(rx).await }));

    let app = api_router(user_state, order_state, outbox_state, RelayFeed { feed });
    let addr = config.server.socket_addr();
    tracing::info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let mut serve_shutdown = shutdown_rx.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = serve_shutdown.changed().await;
        })
        .await?;

    // The signal task already notified the workers; wait for them to wind
    // down (the drainer flushes the producer within its grace window).
    let _ = shutdown_tx.send(true);
    for worker in workers {
        let _ = worker.await;
    }

    Ok(())
}
