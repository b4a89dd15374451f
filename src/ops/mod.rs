pub mod due;
pub mod progress;
pub mod tree;
pub mod view;
