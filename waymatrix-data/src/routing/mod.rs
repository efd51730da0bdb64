//! HTTP matrix client for openrouteservice-compatible routing services.
//!
//! [`OrsMatrixClient`] implements [`waymatrix_core::MatrixClient`] by posting
//! the request body to `{base_url}{endpoint}` and decoding the `durations`
//! and `distances` matrices from the reply.
//!
//! # Architecture
//!
//! The client trait is synchronous so the core stays embeddable in
//! synchronous hosts. The client bridges to `reqwest` by blocking on a Tokio
//! runtime it owns, or on the caller's multi-thread runtime when one is
//! active.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use waymatrix_core::{MatrixClient, Profile, assign_indices, build_request};
//! use waymatrix_core::matrix::matrix_endpoint;
//! use waymatrix_data::routing::{OrsClientConfig, OrsMatrixClient};
//!
//! let config = OrsClientConfig::new("http://localhost:8080/ors")
//!     .with_timeout(Duration::from_secs(10));
//! let client = OrsMatrixClient::with_config(config)?;
//!
//! let locations = vec![geo::coord! { x: 8.68, y: 49.41 }, geo::coord! { x: 8.69, y: 49.42 }];
//! let request = build_request(Profile::DrivingCar, locations, assign_indices(1, 1, false));
//! let response = client.request(
//!     &matrix_endpoint(Profile::DrivingCar),
//!     &[("profile", "driving-car")],
//!     &request,
//! )?;
//! println!("{:?}", response.durations);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod ors;

pub use client::{
    ClientBuildError, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, OrsClientConfig, OrsMatrixClient,
};
