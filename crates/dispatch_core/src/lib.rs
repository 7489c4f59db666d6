pub mod clock;
pub mod controller;
pub mod event_log;
pub mod geo;
pub mod hospitals;
pub mod routing;
pub mod runner;
pub mod scenario;
pub mod session;
pub mod statistics;
pub mod systems;
