pub mod error;
pub mod http;

pub use error::{CreateError, FetchError};

use crate::core::draft::NewUser;
use crate::core::user::{Snapshot, User, UserId};

/// What the service sent back for a successful create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Created {
    /// The response carried the stored record.
    User(User),
    /// The service only acknowledged the write, e.g. `"ada@example.com was added!"`.
    Acknowledged { message: String },
}

/// A remote collection of users.
///
/// Every call is a single outbound request. Implementations keep no state
/// between calls and never retry.
pub trait UserService {
    /// Read the whole collection, in server order.
    fn fetch_all(&self) -> impl Future<Output = Result<Snapshot, FetchError>> + Send;

    /// Store a new user. Callers validate the input first.
    fn create(&self, user: &NewUser) -> impl Future<Output = Result<Created, CreateError>> + Send;

    /// Read a single user.
    fn fetch_one(&self, id: &UserId) -> impl Future<Output = Result<User, FetchError>> + Send;

    /// Liveness check; returns the service's reply message.
    fn ping(&self) -> impl Future<Output = Result<String, FetchError>> + Send;
}
