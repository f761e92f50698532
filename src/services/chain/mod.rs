pub mod client;
pub mod graphene;

pub use client::*;
pub use graphene::GrapheneClient;
