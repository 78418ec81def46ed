//! Page-accessor backends.

pub mod remote;

pub use remote::RemoteApiAccessor;
