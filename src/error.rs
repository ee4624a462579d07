//! The crate-wide error type.

use std::path::PathBuf;

/// An error raised while configuring or running a simulation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration record is missing a field or holds an invalid value.
    #[error("invalid {component} configuration: {what}")]
    Configuration { component: String, what: String },
    /// A data file (CSV, waypoints, path) is malformed.
    #[error("malformed data in {location}: {what}")]
    DataFormat { location: String, what: String },
    /// A non-positive or non-finite time step.
    #[error("invalid step size {0}")]
    InvalidStep(f64),
    /// A geometric query on a path with no points.
    #[error("the path has no points")]
    EmptyPath,
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// A runtime failure, tagged with the component that raised it.
    #[error("component '{name}' failed")]
    Component {
        name: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn config(component: impl Into<String>, what: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            what: what.into(),
        }
    }

    pub(crate) fn data(location: impl Into<String>, what: impl Into<String>) -> Self {
        Self::DataFormat {
            location: location.into(),
            what: what.into(),
        }
    }

    /// Tags the error with the name of the component that produced it.
    pub fn in_component(self, name: &str) -> Self {
        Self::Component {
            name: name.to_owned(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
