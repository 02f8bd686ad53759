// Upload surface - drag-and-drop / file-picker selection

pub mod surface;

pub use surface::{UploadEvent, UploadSurface, ACCEPT_HINT};
