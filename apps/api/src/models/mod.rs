pub mod application;
pub mod feature;
pub mod goal;
pub mod interview;
pub mod resume;
pub mod role;

pub use application::{ApplicationRecord, ApplicationStatus};
pub use feature::{FeatureDefinition, FeatureRollout};
pub use goal::GoalRecord;
pub use interview::InterviewSessionRecord;
pub use resume::ResumeRecord;
pub use role::RoleRecord;
