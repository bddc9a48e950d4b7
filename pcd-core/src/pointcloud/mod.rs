pub mod normalization;
pub mod point;
pub mod table;
