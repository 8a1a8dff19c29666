pub mod bearer;
pub mod directory;
pub mod guards;
pub mod magic;

pub use self::bearer::{BearerError, BearerSigner, Claims};
pub use self::directory::AdminDirectory;
pub use self::magic::MagicTokens;
