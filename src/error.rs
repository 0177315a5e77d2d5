use snafu::{Location, Snafu};

use crate::database::DatabaseError;
use crate::service::DashboardError;
use crate::Located;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ApplicationError {
    /// could not read the configuration from the environment
    ConfigLoad {
        source: envy::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not initialize the logger
    InitializeLogger {
        source: tracing::subscriber::SetGlobalDefaultError,
        #[snafu(implicit)]
        location: Location,
    },

    ConnectDatabase {
        source: DatabaseError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not compute the dashboard figures
    Dashboard {
        source: DashboardError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not print the report
    Output {
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not listen for the shutdown signal
    Signal {
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Located for ApplicationError {
    fn location(&self) -> Location {
        match self {
            ApplicationError::ConfigLoad { location, .. }
            | ApplicationError::InitializeLogger { location, .. }
            | ApplicationError::ConnectDatabase { location, .. }
            | ApplicationError::Dashboard { location, .. }
            | ApplicationError::Output { location, .. }
            | ApplicationError::Signal { location, .. } => *location,
        }
    }
}
