pub mod geo;
pub mod step;

pub use geo::LatLng;
pub use step::{current_location, Step, StepRecord};
