pub mod demo;
pub mod evaluate;
pub mod letters;
pub mod replay;
