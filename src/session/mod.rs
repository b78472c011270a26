pub mod controller;
pub mod state;
pub mod tracking_loop;

pub use controller::SessionController;
pub use state::{
    GazeDirection, SessionState, SENSITIVITY_DEFAULT, SENSITIVITY_MAX, SENSITIVITY_MIN,
    SENSITIVITY_STEP, SUGGESTION_SLOTS,
};
pub use tracking_loop::POLL_DELAY;
