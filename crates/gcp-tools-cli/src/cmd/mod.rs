pub mod doctor;
pub mod mcp;
pub mod secrets;
pub mod setup;
