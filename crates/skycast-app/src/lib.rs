//! Presentation-facing glue for Skycast: observable state cells over the
//! weather services, consumed by the CLI front end.

pub mod model;
pub mod state;

pub use model::WeatherModel;
pub use state::{ErrorKind, WeatherState};
