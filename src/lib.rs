#![allow(dead_code)]

pub mod battlefield;
pub mod errors;
pub mod line_protocol;
pub mod utils;

pub mod prelude {
    pub use super::battlefield::prelude::*;
    pub use super::line_protocol::{Server, ServerOptions};
    pub use super::utils::prelude::*;
}
