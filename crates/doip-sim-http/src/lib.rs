//! doip-sim-http - HTTP control surface for DoIP simulation platforms
//!
//! This crate turns a [`doip_sim_core::SimulationManager`] into a small REST
//! surface for inspecting and controlling simulation platforms:
//!
//! ```text
//! GET  /doip-simulation/                          platform overview (?status= filter)
//! GET  /doip-simulation/platform/{name}           platform detail (?action=start|stop)
//! GET  /doip-simulation/platform/{name}/gateway/{gw}   gateway incl. ECU lookup tables
//! POST /doip-simulation/platform/{name}           {"action":"start"|"stop"} or empty
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use doip_sim_http::DoipHttpServerBuilder;
//!
//! let server = DoipHttpServerBuilder::new(manager)
//!     .port(8080)
//!     .build();
//! server.start().await?;
//! ```
//!
//! Requests are dispatched to [`server::ContextHandler`]s by longest
//! registered path prefix; handlers project live domain state into wire
//! resources through the [`connector::SimulationConnector`] and answer with
//! a uniform [`envelope::SimulationResponse`].

pub mod builder;
pub mod connector;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod resources;
pub mod routing;
pub mod server;

pub use builder::DoipHttpServerBuilder;
pub use connector::SimulationConnector;
pub use envelope::SimulationResponse;
pub use error::ServerError;
pub use server::{ContextBinding, ContextHandler, DoipHttpServer, SimRequest};

/// Path prefix of the overview resource.
pub const DOIP_SIMULATION_PATH: &str = "/doip-simulation/";

/// Path prefix of the platform resource family.
pub const PLATFORM_PATH: &str = "/doip-simulation/platform";
