pub mod gate;
pub mod guard;
pub mod session;

pub use gate::{access_gate, GateDecision};
pub use guard::GuardState;
pub use session::{load_session, SessionContext};
