//! Application-level configuration constants.

// UI Behavior
pub const DEBOUNCE_MS: u32 = 300;

// Min/Max limits for the duration inputs (ms)
pub const MIN_DURATION_MS: u32 = 100;
pub const MAX_DURATION_MS: u32 = 600_000;

// Images (copied by trunk from assets/)
pub const BOMB_IMAGE: &str = "assets/csgo-bomb.svg";
pub const EXPLOSION_IMAGE: &str = "assets/explosion.svg";

// UI text
pub const TITLE: &str = "CSGO BOMB";
pub const PLANT_HINT: &str = "Hold to plant";
pub const DEFUSE_HINT: &str = "Hold to defuse";
pub const DEFUSED_MESSAGE: &str = "Bomb has been defused";
pub const EXPLODED_MESSAGE: &str = "Terrorists win";
