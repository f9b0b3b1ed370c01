pub mod clean;
pub mod collect;
pub mod compare;
pub mod init;
pub mod list;
pub mod remove;

pub use clean::CleanArgs;
pub use collect::CollectArgs;
pub use compare::CompareArgs;
pub use init::InitArgs;
pub use remove::RemoveArgs;
