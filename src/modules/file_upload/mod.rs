pub mod handle;
pub mod model;
pub mod prober;
pub mod prober_ffprobe;
pub mod route;
pub mod schema;
pub mod service;

pub use prober_ffprobe::FfprobeProber;
pub use service::FileUploadService;
