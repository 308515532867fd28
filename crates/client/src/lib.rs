pub mod feedback;
pub mod gameplay;

pub use feedback::FeedbackDispatchPlugin;
pub use gameplay::{rolling_force, BallSettings, ClientGameplayPlugin};
