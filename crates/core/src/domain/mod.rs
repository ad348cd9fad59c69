pub mod amount;
pub mod appliance;
pub mod feedback;
pub mod user;
