pub mod capture;
pub mod clock;
pub mod controller;
pub mod gpu_context;
pub mod input_adapter;
pub mod overlay;
pub mod runner;
pub mod sketch;
pub mod surface;
pub mod timer;

pub use capture::{export_file_name, FrameCapture, EXPORT_FORMAT};
pub use clock::{Clock, FrameTime, LoopClock};
pub use controller::{Button, Controller};
pub use gpu_context::GpuContext;
pub use input_adapter::WinitController;
pub use runner::{run_export, run_preview, RunOptions, SketchFactory};
pub use sketch::{RenderTarget, ResizeProps, Sketch, SketchContext};
pub use surface::WindowSurface;
pub use timer::FramePacer;
