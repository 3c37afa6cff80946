pub mod result;
pub mod smith_waterman;
pub mod traceback;

pub use result::{AlignmentResult, EditOp};
pub use smith_waterman::{LocalAligner, SmithWaterman};
