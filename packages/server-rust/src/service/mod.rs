//! Request handling for the DomainTools topics.
//!
//! 1. **Table** (`table`): topic suffix -> remote operation and required parameters
//! 2. **Dispatch** (`dispatcher`): payload decoding, validation, invocation, reply shaping
//! 3. **Middleware** (`middleware`): Tower layers around each dispatcher
//! 4. **Registration** (`registry`, `callback`): bus callbacks for every table entry

pub mod callback;
pub mod dispatcher;
pub mod middleware;
pub mod operation;
pub mod registry;
pub mod table;

pub use callback::ServiceCallback;
pub use dispatcher::RequestDispatcher;
pub use operation::{DispatchError, OperationBinding, ResponseBody, ResponseFormat};
pub use registry::{build_registration, topic_for, SERVICE_NAME};
pub use table::{OperationTable, TableError};
