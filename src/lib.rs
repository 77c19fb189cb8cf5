pub mod backup;
pub mod municipality;
