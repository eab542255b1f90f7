pub mod error;
pub mod io;
pub mod math;
pub mod mesh;
pub mod projection;
pub mod spatial;

pub use error::{Result, TrisurfError};
pub use mesh::SurfaceMesh;
pub use projection::{ProjectPoint, ProjectPoints, Projection};
