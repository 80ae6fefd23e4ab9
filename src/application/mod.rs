pub mod agent;
pub mod extraction;
pub mod interaction;
pub mod service;
pub mod tooling;
