//! HTTP API server with observability for the reservation system.
//!
//! Exposes the reservation and payment orchestrators over REST, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{
    InMemoryIdentityService, InMemoryInventoryService, LocalConfirmer, PaymentOrchestrator,
    ReservationOrchestrator, SimulatedGateway, UuidTransactionIds, WebhookVerifier,
};
use store::{PaymentStore, ReservationStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Reservation orchestrator wired with the in-memory collaborators.
pub type Reservations<R> =
    ReservationOrchestrator<R, InMemoryIdentityService, InMemoryInventoryService>;

/// Payment orchestrator wired with the simulated gateway and in-process
/// confirmation callback.
pub type Payments<R, P> = PaymentOrchestrator<
    P,
    SimulatedGateway,
    LocalConfirmer<R, InMemoryIdentityService, InMemoryInventoryService>,
    UuidTransactionIds,
>;

/// Shared application state accessible from all handlers.
pub struct AppState<R: ReservationStore, P: PaymentStore> {
    pub reservations: Arc<Reservations<R>>,
    pub payments: Payments<R, P>,
    pub verifier: Box<dyn WebhookVerifier>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R, P>(state: Arc<AppState<R, P>>, metrics_handle: PrometheusHandle) -> Router
where
    R: ReservationStore + 'static,
    P: PaymentStore + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/reservations", post(routes::reservations::create::<R, P>))
        .route("/reservations", get(routes::reservations::list::<R, P>))
        .route("/reservations/{id}", get(routes::reservations::get::<R, P>))
        .route(
            "/reservations/{id}",
            delete(routes::reservations::cancel::<R, P>),
        )
        .route(
            "/reservations/user/{user_id}",
            get(routes::reservations::list_by_user::<R, P>),
        )
        .route(
            "/reservations/{id}/confirm-payment",
            post(routes::reservations::confirm_payment::<R, P>),
        )
        .route("/payments", post(routes::payments::create::<R, P>))
        .route("/payments/{id}", get(routes::payments::get::<R, P>))
        .route(
            "/payments/reservation/{reservation_id}",
            get(routes::payments::get_by_reservation::<R, P>),
        )
        .route(
            "/payments/{id}/refund",
            post(routes::payments::refund::<R, P>),
        )
        .route("/payments/webhook", post(routes::payments::webhook::<R, P>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state: the given stores plus seeded
/// in-memory collaborators and the simulated gateway.
pub fn create_default_state<R, P>(
    reservation_store: R,
    payment_store: P,
    verifier: Box<dyn WebhookVerifier>,
) -> Arc<AppState<R, P>>
where
    R: ReservationStore + 'static,
    P: PaymentStore + 'static,
{
    let identity = InMemoryIdentityService::new();
    let inventory = InMemoryInventoryService::new();
    seed_demo_data(&identity, &inventory);

    let reservations = Arc::new(ReservationOrchestrator::new(
        reservation_store,
        identity,
        inventory,
    ));
    let payments = PaymentOrchestrator::new(
        payment_store,
        SimulatedGateway::new(),
        LocalConfirmer::new(reservations.clone()),
        UuidTransactionIds,
    );

    Arc::new(AppState {
        reservations,
        payments,
        verifier,
    })
}

/// Seeds the demo users, hotels, and rooms used by local runs.
fn seed_demo_data(identity: &InMemoryIdentityService, inventory: &InMemoryInventoryService) {
    use common::{HotelId, RoomId, UserId};
    use domain::Money;

    identity.add_user_id(UserId::new(1));
    identity.add_user_id(UserId::new(2));

    inventory.add_hotel(HotelId::new(1), "Hotel Royal Casablanca", "Casablanca");
    inventory.add_room(
        HotelId::new(1),
        RoomId::new(101),
        Money::from_cents(15000),
        true,
    );
    inventory.add_room(
        HotelId::new(1),
        RoomId::new(102),
        Money::from_cents(25000),
        true,
    );
    inventory.add_room(
        HotelId::new(1),
        RoomId::new(103),
        Money::from_cents(50000),
        true,
    );

    inventory.add_hotel(HotelId::new(2), "Hotel Riad Marrakech", "Marrakech");
    inventory.add_room(
        HotelId::new(2),
        RoomId::new(201),
        Money::from_cents(20000),
        true,
    );
    inventory.add_room(
        HotelId::new(2),
        RoomId::new(202),
        Money::from_cents(40000),
        false,
    );
}
