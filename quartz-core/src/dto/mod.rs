//! Data Transfer Objects
//!
//! DTOs used at the service boundaries: the job manifest shipped inside an
//! uploaded archive, registry insert requests and API responses.

pub mod job;
