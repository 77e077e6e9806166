// Access module
//
// Identity resolution and permission evaluation are collaborators of the report
// service, consumed through the traits below. `AccessDirectory` is the file-seeded
// implementation used by the binary and by tests.

pub mod directory;
pub mod traits;

pub use directory::{AccessDirectory, DirectoryUser};
pub use traits::{Actor, ActorResolver, PermissionChecker};
