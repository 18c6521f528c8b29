use thiserror::Error;

/// Reasons a device location could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Geolocation is not supported on this device. Please enter a city manually.")]
    Unsupported,
    #[error("Unable to get your location. Please enter a city manually.")]
    Denied,
    #[error("Unable to get your location. Please enter a city manually. ({0})")]
    Unavailable(String),
}

/// Every failure the orchestrator can surface to the presentation layer.
///
/// Errors are `Clone` because the most recent one is kept in view state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error(
        "No API key configured.\n\
         Hint: run `weather-explorer configure` or set OPENWEATHER_API_KEY."
    )]
    MissingCredential,

    #[error("City \"{query}\" not found. Please check the spelling and try again.")]
    NotFound { query: String },

    #[error("An error occurred: {0}")]
    Provider(String),

    #[error("Please enter a city name.")]
    EmptyQuery,

    #[error(transparent)]
    Location(#[from] LocationError),
}

/// Discriminant of [`WeatherError`], for callers that branch on the kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingCredential,
    NotFound,
    ProviderError,
    EmptyQuery,
    Unsupported,
    Denied,
    Unavailable,
}

impl WeatherError {
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::MissingCredential => ErrorKind::MissingCredential,
            WeatherError::NotFound { .. } => ErrorKind::NotFound,
            WeatherError::Provider(_) => ErrorKind::ProviderError,
            WeatherError::EmptyQuery => ErrorKind::EmptyQuery,
            WeatherError::Location(LocationError::Unsupported) => ErrorKind::Unsupported,
            WeatherError::Location(LocationError::Denied) => ErrorKind::Denied,
            WeatherError::Location(LocationError::Unavailable(_)) => ErrorKind::Unavailable,
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Provider(err.to_string())
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
