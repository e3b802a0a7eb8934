pub mod constant;
pub mod error;
pub mod fixtures;
pub mod setup;

pub use error::TestError;
pub use setup::TestSetup;

pub mod prelude {
    pub use crate::{
        constant::{TEST_API_KEY, TEST_API_KEY_2},
        test_setup_with_tables, TestError, TestSetup,
    };
}
