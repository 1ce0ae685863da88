//! Core data models: search definitions, display records and raw API payloads.

mod book;
mod google_books;
mod primo;
mod request;

pub use book::BookRecord;
pub use google_books::{ImageLinks, VolumeInfo, VolumeItem, VolumesResponse};
pub use primo::{PrimoControl, PrimoDelivery, PrimoDisplay, PrimoDoc, PrimoPnx, PrimoSearch, PrimoSort};
pub use request::{strip_hyphens, RequestDescriptor};
