pub mod a2a;
pub mod model;
