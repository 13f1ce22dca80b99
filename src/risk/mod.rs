pub mod exposure;
