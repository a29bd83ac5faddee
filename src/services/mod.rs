pub mod clock;
pub mod debounce;
pub mod detector;
pub mod trigger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use debounce::Debouncer;
pub use detector::TransferDetector;
pub use trigger::{HttpTrigger, TreatDispatcher, Trigger};
