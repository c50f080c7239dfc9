//! Deck model for dekk: the markdown-to-slides parser, the deck registry,
//! the slide store, the fragment router and the glue that keeps them in step.

pub mod error;
pub mod exporter;
pub mod keyboard;
pub mod parser;
pub mod registry;
pub mod route;
pub mod session;
pub mod source;
pub mod store;
pub mod watch;

pub use error::{Error, Result};
pub use parser::{DeckMetadata, Metadata, ParseResult, SlideData, SlideMetadata, parse};
pub use registry::{DeckEntry, Registry, build_registry};
pub use route::{Location, MemoryLocation, Route, Router, hash_to_route, route_to_hash};
pub use session::Session;
pub use source::{DeckSource, FsDeckSource, MemoryDeckSource};
pub use store::{SlideAction, SlideState, SlideStore, reduce};
