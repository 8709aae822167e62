// src/ingest/providers/mod.rs
pub mod apify;
pub mod fixture;

pub use apify::{ActorFlavor, ApifyActorSource, ApifySettings};
pub use fixture::FixtureSource;
