//! CLI command implementations

pub(crate) mod common;
pub(crate) mod dedup;
pub(crate) mod dtypes;
pub(crate) mod init_db;
pub(crate) mod load;
pub(crate) mod read;
pub(crate) mod set_key;
pub(crate) mod sort;
