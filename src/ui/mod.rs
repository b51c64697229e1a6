pub mod gallery;
pub mod histogram;
pub mod panels;
