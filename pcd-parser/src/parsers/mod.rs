use pcd_core::pointcloud::table::Table;

use crate::error::ParseError;

pub mod text;

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

pub trait Parser {
    fn parse(&self) -> Result<Table, ParseError>;
}
