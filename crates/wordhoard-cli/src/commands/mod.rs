pub mod lesson;
pub mod review;
pub mod settings;
pub mod streak;
pub mod sync;
