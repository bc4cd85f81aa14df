//! I/O operations for request lifecycle management.
//!
//! Everything that touches the network, the filesystem, the clock or the
//! host channel lives here, behind the [`Transport`] and [`EventSink`]
//! traits so tests can substitute both.

pub mod executor;
pub mod http;
pub mod manager;
pub mod reader;
pub mod registry;
pub mod sink;

pub use executor::{RequestExecutor, RequestOutcome, ShutdownSignal};
pub use http::{BoxStream, OutboundRequest, Transport, TransportResponse, is_content_header};
#[cfg(feature = "reqwest")]
pub use http::{ReqwestError, ReqwestTransport};
pub use manager::{RequestManager, RequestManagerBuilder};
pub use reader::{Chunk, IncrementalReader};
pub use registry::{CancelStatus, CancellationRegistry};
pub use sink::{ChannelSink, EventSink};
