pub mod clock;
pub mod controller;
pub mod edge_detector;
pub mod input_adapter;

pub use clock::{Clock, FpsCounter};
pub use controller::{Button, Controller};
pub use edge_detector::EdgeDetector;
pub use input_adapter::WinitController;
