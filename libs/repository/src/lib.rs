use std::sync::Arc;

use booking::BookingRepository;
use entity::ValidationError;
use event::EventRepository;
use query::QueryService;

pub mod active_models;
pub mod booking;
pub mod connection;
pub mod event;
pub mod query;

pub use connection::{
    ConnectionManager, ConnectionState, DatabaseSettings, DbState,
};
pub use sea_orm::DbErr;

#[derive(Clone, Debug)]
pub struct Repository {
    pub connection: Arc<ConnectionManager>,
    pub event: EventRepository,
    pub booking: BookingRepository,
    pub query: QueryService,
}

impl Repository {
    /// Wires the repositories around one connection manager. Nothing is
    /// connected until the first query.
    pub fn new(connection: Arc<ConnectionManager>) -> Self {
        let event = EventRepository::new(connection.clone());

        Self {
            booking: BookingRepository::new(connection.clone(), event.clone()),
            query: QueryService::new(connection.clone(), event.clone()),
            event,
            connection,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("An event with slug '{slug}' already exists")]
    Uniqueness { slug: String },

    #[error("Event with ID {event_id} does not exist")]
    Reference { event_id: String },

    #[error("database is unreachable: {0}")]
    Connectivity(sea_orm::DbErr),

    #[error(
        "in sea-orm crate from unsuccessful database operations: {}: {}",
        message,
        source
    )]
    InSeaOrmDbErr {
        message: String,
        source: sea_orm::DbErr,
    },
}

pub type Response<T> = Result<T, RepositoryError>;

pub(crate) trait IntoResponse<T> {
    fn into_response(self, message: &str) -> Response<T>;
}

impl<T> IntoResponse<T> for Result<T, sea_orm::DbErr> {
    fn into_response(self, message: &str) -> Response<T> {
        self.map_err(|e| RepositoryError::InSeaOrmDbErr {
            message: message.to_string(),
            source: e,
        })
    }
}
