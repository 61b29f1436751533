//! Dispatch bridge for intercepted calls.
//!
//! [`Interception`] bundles the advice registry, the injector cache and the
//! continuation table. A proxy backend obtains a [`Wrapper`] per proxied
//! instance and reports each call as a [`RawCall`]; the wrapper returns a
//! [`CallOutcome`] shaped like the method's declared return.

mod continuation;
mod interception;
mod outcome;
mod wrapper;

pub use continuation::ContinuationTable;
pub use intercede_invocation::Continuation;
pub use intercede_config::InterceptionConfig;
pub use interception::{Interception, ProxyBackend};
pub use outcome::{CallOutcome, RawCall};
pub use wrapper::Wrapper;
