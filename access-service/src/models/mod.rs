pub mod capability;
pub mod tier;
pub mod user;

pub use capability::{Capability, FeatureAccess, FeatureSet};
pub use tier::PrivilegeTier;
pub use user::{NewUser, UserRecord, UserSummary};
