pub mod follow;
pub mod macros;
pub mod post;
pub mod profile;
pub mod user;
pub mod validation;

pub use follow::*;
pub use post::*;
pub use profile::*;
pub use user::*;
pub use validation::FieldErrors;
