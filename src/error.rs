use quick_error::quick_error;
use std::path::PathBuf;

quick_error! {
    /// Error type for all error variants originated by this crate.
    #[derive(Debug)]
    pub enum RoisliceError {
        /// Caller input violates a precondition, e.g. a negative region weight.
        InvalidInput(msg: String) {
            display("Invalid input: {}", msg)
        }

        /// All region weights are zero, so they cannot be scaled by their maximum.
        DegenerateInput {
            display("All region weights are zero, nothing to scale or draw")
        }

        /// A NIfTI volume could not be loaded.
        ResourceLoad(path: PathBuf, err: nifti::NiftiError) {
            display("Failed to load volume '{}': {}", path.display(), err)
            source(err)
        }

        /// The figure cannot be laid out, e.g. for a volume without voxels.
        Render(msg: String) {
            display("Failed to render figure: {}", msg)
        }

        /// The figure could not be written to disk.
        Save(err: image::ImageError) {
            from()
            display("Failed to save figure: {}", err)
            source(err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, RoisliceError>;
