//! Client for the video generation HTTP service.
//!
//! The service renders one price video per request. This crate only knows
//! how to ask for one; rendering happens on the other side.

pub mod client;
pub mod error;

pub use client::{VideoApiClient, VideoApiConfig, VideoGenerator, DEFAULT_API_URL};
pub use error::{ClientError, ClientResult};
