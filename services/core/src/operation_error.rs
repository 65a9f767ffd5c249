use std::convert::Infallible;
use std::error::Error;

use tonic::Code;

/// Trait to be implemented by errors returned by the different operations of services.
pub trait OperationError: Error {
    /// gRPC code corresponding to this error.
    fn code(&self) -> Code;
}

impl OperationError for Infallible {
    fn code(&self) -> Code {
        match *self {}
    }
}
