pub mod character;
pub mod event;
pub mod items;
pub mod leaderboard;
pub mod level;
pub mod motion;
pub mod step;
pub mod world;
