pub mod breaking;
pub mod decompose;
pub mod junction;
pub mod query;
pub mod segments;
