//! Wire-level types shared by the pet map client: domain records, the API
//! envelope, and the backend error model.

pub mod domain;
pub mod error;
pub mod protocol;
