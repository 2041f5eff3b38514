pub mod prelude {
    pub use anyhow::{anyhow, Context, Error};
    pub type Result<T> = anyhow::Result<T, Error>;

    pub use std::collections::{BTreeSet, HashMap, HashSet};
}
