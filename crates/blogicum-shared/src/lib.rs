//! # Blogicum Shared
//!
//! Request and response types exchanged with the Blogicum server.
//! Every page the server renders is one of the view models in [`dto`].

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
