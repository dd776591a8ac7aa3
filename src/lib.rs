#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
pub mod io;
pub mod kernel;
pub mod pipeline;
pub mod reformat;
pub mod types;
