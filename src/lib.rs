//! A stub DNS client: builds queries, sends them over UDP, TCP, DNS over TLS
//! or DNS over HTTPS, and parses the responses.
//!
//! Most users only need the [`Resolver`]:
//!
//! ```rust,no_run
//! use stubdns::{Request, Resolver, Transport, Type};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), stubdns::Error> {
//!     let resolver = Resolver::default();
//!
//!     // Tries UDP, then TCP, then DoT.
//!     let response = resolver.resolve(&Request::new("bramp.net", Type::A)).await?;
//!     println!("{}", response);
//!
//!     // Only DoH.
//!     let request = Request::new("bramp.net", Type::AAAA).with_transport(Transport::Doh);
//!     println!("{}", resolver.resolve(&request).await?);
//!
//!     Ok(())
//! }
//! ```
//!
//! The codec can also be used on its own, see [`Query`] and [`Message::from_frame`].

pub mod clients;
mod config;
mod display;
pub mod dns;
mod errors;
mod io;
pub mod name;
pub mod resource;
pub mod types;

#[macro_use]
extern crate num_derive;

#[macro_use]
extern crate lazy_static;

pub use crate::types::*;

// Pull up the various types that should be on the front page of the docs.
#[doc(inline)]
pub use crate::clients::{Request, Resolver, Response};

#[doc(inline)]
pub use crate::config::Config;

#[doc(inline)]
pub use crate::dns::{HeaderWarning, Query};

#[doc(inline)]
pub use crate::errors::{Error, Result};

#[doc(inline)]
pub use crate::io::decode_name;

#[doc(inline)]
pub use crate::name::QName;
