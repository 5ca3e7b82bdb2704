pub mod hicbc;
