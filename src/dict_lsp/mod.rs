pub mod backend;
pub mod util;
