pub mod air_service;

pub use air_service::{
    request_fetch as request_air_fetch, request_location as request_air_location, AirError,
    AirServiceMessage, AirServices,
};
