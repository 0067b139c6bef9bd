//! Domain layer: session state and the pure engines it owns.

pub mod callback;
pub mod interest;
pub mod object_model;
pub mod region;
pub mod repository;
pub mod session;
pub mod time;

pub use callback::Callback;
pub use interest::{InteractionSubscription, InterestClass, InterestManager, ObjectSubscription};
pub use object_model::{DimensionInfo, InteractionClassInfo, ObjectClassInfo, SpaceInfo};
pub use region::{region_filter_passes, RegionStore};
pub use repository::{ObjectInstance, ObjectRepository};
pub use session::{FederateSession, Lifecycle, Membership};
pub use time::{AdvanceDecision, AdvanceState, TimeReport, TimeStatus, TsoQueue};
