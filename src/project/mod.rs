//! The project file `jig.yaml`.
//!
//! Written at the project root after every `do`, it records which template
//! generated the project and the answers given so far, so later maintenance
//! actions reuse them instead of prompting again. Unknown fields are ignored.

mod model;
mod operations;


pub use model::{PROJECT_FILE_NAME, PROJECT_FILE_VERSION, ProjectFile};
pub use operations::find_project_dir;
