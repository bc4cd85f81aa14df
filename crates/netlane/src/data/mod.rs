//! Immutable data types for request lifecycle management.
//!
//! Nothing here performs I/O. The types are shared between the pure
//! transformations in `core` and the effectful machinery in `effects`.

pub mod config;
pub mod event;
pub mod invocation;
pub mod progress;
pub mod request;
pub mod state;

pub use config::ManagerConfig;
pub use event::{NetworkEvent, RequestFailure, ResponseHeaders};
pub use invocation::{FormPart, RequestData, SendRequest};
pub use progress::ProgressCounter;
pub use request::{
    BodyDescription, FormField, FormValue, Method, RequestId, RequestSpec, ResponseMode,
};
pub use state::{RequestState, Terminal};
