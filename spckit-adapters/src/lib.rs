//! Model adapters and the recommendation client built on them.
//!
//! [`traits`] defines the provider-neutral [`ModelAdapter`](traits::ModelAdapter)
//! interface, [`gemini`] implements it over HTTPS, and [`recommend`] turns raw
//! model output into a validated [`AiResponse`](spckit_primitives::AiResponse).

#![warn(missing_docs, clippy::pedantic)]

pub mod gemini;
pub mod recommend;
pub mod traits;

mod http_client;
