mod clock;
mod controller;
mod driver;
mod preset;
mod session;
mod shared;
mod transition;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{SubscriptionId, TimerController};
pub use driver::{TickDriver, DEFAULT_TICK_INTERVAL};
pub use preset::{PresetDurations, PresetMode, Presets};
pub use session::{format_display, Session, SessionSnapshot, DEFAULT_MINUTES};
pub use shared::SharedController;
pub use transition::{next_block, AlertDecision, NextBlock, Phase};
