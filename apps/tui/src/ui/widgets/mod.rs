pub mod popup;
pub mod prayers;
pub mod select;
