pub mod phases;
pub mod run;
pub mod simulate;
pub mod timeline;
